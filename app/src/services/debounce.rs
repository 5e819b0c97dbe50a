//! Cancel-and-replace timer for the search box.
//!
//! Each keystroke schedules the re-filter and aborts whatever was pending, so
//! at most one evaluation runs and only after the input has been quiet for the
//! configured delay.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;

pub const ATRASO_PADRAO: Duration = Duration::from_millis(300);

pub struct Debouncer {
    atraso: Duration,
    pendente: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(atraso: Duration) -> Self {
        Self {
            atraso,
            pendente: None,
        }
    }

    /// Schedules `tarefa` to run after the delay, cancelling any previously
    /// scheduled task that has not fired yet.
    pub fn agendar<F>(&mut self, tarefa: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Some(anterior) = self.pendente.take() {
            anterior.abort();
        }

        let atraso = self.atraso;
        self.pendente = Some(tokio::spawn(async move {
            sleep(atraso).await;
            tarefa.await;
        }));
    }

    pub fn cancelar(&mut self) {
        if let Some(pendente) = self.pendente.take() {
            pendente.abort();
        }
    }

    /// Waits for the pending task, if any, to finish or be aborted.
    pub async fn aguardar(&mut self) {
        if let Some(pendente) = self.pendente.take() {
            let _ = pendente.await;
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancelar();
    }
}
