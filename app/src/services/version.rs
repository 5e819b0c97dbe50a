//! Update notification support.
//!
//! The backend exposes its version via `GET /?check_version=1`; the client
//! keeps the last seen value in a small file between runs and reports when
//! they differ. The current version is always persisted, so the notice shows
//! exactly once per update.

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::info;

pub struct VerificadorVersao {
    arquivo: PathBuf,
}

impl VerificadorVersao {
    pub fn new(arquivo: PathBuf) -> Self {
        Self { arquivo }
    }

    pub fn versao_armazenada(&self) -> Option<String> {
        let conteudo = fs::read_to_string(&self.arquivo).ok()?;
        let versao = conteudo.trim();
        if versao.is_empty() {
            None
        } else {
            Some(versao.to_string())
        }
    }

    /// Persists `atual` and returns whether it differs from the stored value.
    /// A first run (no stored version) is not an update.
    pub fn registrar(&self, atual: &str) -> io::Result<bool> {
        let armazenada = self.versao_armazenada();
        let atualizou = ha_atualizacao(armazenada.as_deref(), atual);
        if atualizou {
            info!(de = ?armazenada, para = atual, "Nova versão do aplicativo detectada");
        }

        if let Some(diretorio) = self.arquivo.parent() {
            if !diretorio.as_os_str().is_empty() {
                fs::create_dir_all(diretorio)?;
            }
        }
        fs::write(&self.arquivo, atual)?;
        Ok(atualizou)
    }
}

pub fn ha_atualizacao(armazenada: Option<&str>, atual: &str) -> bool {
    matches!(armazenada, Some(v) if v != atual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn primeira_execucao_nao_e_atualizacao() {
        let dir = tempdir().unwrap();
        let verificador = VerificadorVersao::new(dir.path().join("versao"));

        assert_eq!(verificador.versao_armazenada(), None);
        assert!(!verificador.registrar("1.0.0").unwrap());
        assert_eq!(verificador.versao_armazenada().unwrap(), "1.0.0");
    }

    #[test]
    fn mudanca_de_versao_e_reportada_uma_unica_vez() {
        let dir = tempdir().unwrap();
        let verificador = VerificadorVersao::new(dir.path().join("versao"));

        verificador.registrar("1.0.0").unwrap();
        assert!(verificador.registrar("1.1.0").unwrap());
        // Já persistida: a mesma versão não dispara de novo.
        assert!(!verificador.registrar("1.1.0").unwrap());
    }

    #[test]
    fn comparacao_pura() {
        assert!(!ha_atualizacao(None, "1.0.0"));
        assert!(!ha_atualizacao(Some("1.0.0"), "1.0.0"));
        assert!(ha_atualizacao(Some("1.0.0"), "2.0.0"));
    }

    #[test]
    fn cria_diretorio_do_arquivo_quando_necessario() {
        let dir = tempdir().unwrap();
        let verificador = VerificadorVersao::new(dir.path().join("estado").join("versao"));
        verificador.registrar("1.0.0").unwrap();
        assert_eq!(verificador.versao_armazenada().unwrap(), "1.0.0");
    }
}
