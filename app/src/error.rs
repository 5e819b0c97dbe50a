use thiserror::Error;

/// Failure classes surfaced by the client. Transport problems, structured
/// errors returned by the backend and malformed responses are kept apart so
/// the interface can phrase each one differently.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Falha de rede: {0}")]
    Rede(#[from] reqwest::Error),

    /// The backend answered with a `{"erro": ...}` payload.
    #[error("{mensagem}")]
    Api { status: u16, mensagem: String },

    /// 2xx status but a body that does not parse as the expected JSON.
    #[error("Resposta inválida do servidor: {0}")]
    RespostaInvalida(String),

    /// Client-side validation, raised before any request goes out.
    #[error("{0}")]
    Validacao(String),

    #[error("Erro de E/S: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Message shown to the user, prefixed per class the same way the old
    /// interface colored its notices.
    pub fn mensagem_usuario(&self) -> String {
        match self {
            ClientError::Rede(_) => {
                "Erro de conexão com o servidor. Verifique se o backend está no ar.".to_string()
            }
            ClientError::Api { mensagem, .. } => mensagem.clone(),
            ClientError::RespostaInvalida(_) => {
                "O servidor retornou uma resposta inesperada.".to_string()
            }
            ClientError::Validacao(mensagem) => mensagem.clone(),
            ClientError::Io(e) => format!("Erro de E/S: {}", e),
        }
    }
}
