//! Runtime configuration, resolved from defaults and environment variables.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

pub const VAR_API_URL: &str = "ESTOQUE_API_URL";
pub const VAR_TIMEOUT: &str = "ESTOQUE_TIMEOUT_SECS";
pub const VAR_ARQUIVO_VERSAO: &str = "ESTOQUE_ARQUIVO_VERSAO";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Base URL of the backend, without trailing slash.
    pub base_url: String,
    pub timeout_secs: u64,
    /// Where the last seen application version is persisted between runs.
    pub arquivo_versao: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001".to_string(),
            timeout_secs: 30,
            arquivo_versao: PathBuf::from(".controle-estoque-versao"),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by the `ESTOQUE_*` environment variables. An
    /// unparseable timeout falls back to the default instead of aborting.
    pub fn from_env() -> Self {
        Self::com_overrides(
            std::env::var(VAR_API_URL).ok(),
            std::env::var(VAR_TIMEOUT).ok(),
            std::env::var(VAR_ARQUIVO_VERSAO).ok(),
        )
    }

    fn com_overrides(
        url: Option<String>,
        timeout: Option<String>,
        arquivo: Option<String>,
    ) -> Self {
        let mut config = Self::default();

        if let Some(url) = url {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(bruto) = timeout {
            match bruto.trim().parse::<u64>() {
                Ok(segundos) if segundos > 0 => config.timeout_secs = segundos,
                _ => debug!(valor = %bruto, "Timeout inválido no ambiente; usando o padrão"),
            }
        }
        if let Some(arquivo) = arquivo {
            config.arquivo_versao = PathBuf::from(arquivo);
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padrao_aponta_para_o_backend_local() {
        let config = AppConfig::default();
        assert_eq!(config.base_url, "http://localhost:5001");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn overrides_do_ambiente() {
        let config = AppConfig::com_overrides(
            Some("https://estoque.exemplo.com/".to_string()),
            Some("10".to_string()),
            Some("/tmp/versao.txt".to_string()),
        );
        assert_eq!(config.base_url, "https://estoque.exemplo.com");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.arquivo_versao, PathBuf::from("/tmp/versao.txt"));
    }

    #[test]
    fn timeout_invalido_mantem_o_padrao() {
        let config = AppConfig::com_overrides(None, Some("logo".to_string()), None);
        assert_eq!(config.timeout_secs, 30);

        let zero = AppConfig::com_overrides(None, Some("0".to_string()), None);
        assert_eq!(zero.timeout_secs, 30);
    }
}
