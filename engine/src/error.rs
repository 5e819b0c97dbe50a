use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Erro de leitura do CSV: {source}")]
    CsvSistema {
        #[from]
        source: csv::Error,
    },

    #[error("Erro de E/S: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Formato de dados inválido na linha {linha}: {mensagem}")]
    CsvFormato { linha: usize, mensagem: String },
}
