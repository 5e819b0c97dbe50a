//! HTTP client for the inventory backend.
//!
//! Every call is a single attempt, no retry: after a mutation the caller
//! reloads the full list, so a failed request leaves no partial state behind.
//! Response interpretation is factored into [`interpretar`] so the error
//! taxonomy can be tested without a server.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shared::models::{Produto, ProdutoPayload, Venda, VendaPayload};
use tracing::debug;

use crate::config::AppConfig;
use crate::error::ClientError;

/// `{mensagem}` acknowledgement, optionally carrying the id of a created row.
#[derive(Debug, Deserialize)]
pub struct Confirmacao {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub mensagem: String,
}

/// `POST /api/upload` response: the stored filename or URL.
#[derive(Debug, Deserialize)]
pub struct RespostaUpload {
    pub imagem: String,
    #[serde(default)]
    pub mensagem: String,
}

#[derive(Debug, Deserialize)]
pub struct VersaoApp {
    pub app_version: String,
}

pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, caminho: &str) -> String {
        format!("{}{}", self.base_url, caminho)
    }

    async fn obter<T: DeserializeOwned>(&self, caminho: &str) -> Result<T, ClientError> {
        let url = self.url(caminho);
        debug!(%url, "GET");
        let resposta = self.http.get(&url).send().await?;
        let status = resposta.status();
        let corpo = resposta.text().await?;
        interpretar(status, &corpo)
    }

    pub async fn listar_produtos(&self) -> Result<Vec<Produto>, ClientError> {
        self.obter("/api/produtos").await
    }

    pub async fn obter_produto(&self, id: i64) -> Result<Produto, ClientError> {
        self.obter(&format!("/api/produtos/{}", id)).await
    }

    pub async fn criar_produto(&self, payload: &ProdutoPayload) -> Result<Confirmacao, ClientError> {
        let url = self.url("/api/produtos");
        debug!(%url, titulo = %payload.titulo, "POST produto");
        let resposta = self.http.post(&url).json(payload).send().await?;
        let status = resposta.status();
        let corpo = resposta.text().await?;
        interpretar(status, &corpo)
    }

    pub async fn atualizar_produto(
        &self,
        id: i64,
        payload: &ProdutoPayload,
    ) -> Result<Confirmacao, ClientError> {
        let url = self.url(&format!("/api/produtos/{}", id));
        debug!(%url, "PUT produto");
        let resposta = self.http.put(&url).json(payload).send().await?;
        let status = resposta.status();
        let corpo = resposta.text().await?;
        interpretar(status, &corpo)
    }

    pub async fn deletar_produto(&self, id: i64) -> Result<Confirmacao, ClientError> {
        let url = self.url(&format!("/api/produtos/{}", id));
        debug!(%url, "DELETE produto");
        let resposta = self.http.delete(&url).send().await?;
        let status = resposta.status();
        let corpo = resposta.text().await?;
        interpretar(status, &corpo)
    }

    pub async fn listar_vendas(&self) -> Result<Vec<Venda>, ClientError> {
        self.obter("/api/vendas").await
    }

    /// Registers a sale. Stock decrement happens server-side; the caller is
    /// expected to reload both lists afterwards.
    pub async fn registrar_venda(&self, payload: &VendaPayload) -> Result<Confirmacao, ClientError> {
        let url = self.url("/api/vendas");
        debug!(%url, produto_id = payload.produto_id, "POST venda");
        let resposta = self.http.post(&url).json(payload).send().await?;
        let status = resposta.status();
        let corpo = resposta.text().await?;
        interpretar(status, &corpo)
    }

    pub async fn atualizar_venda(
        &self,
        id: i64,
        payload: &VendaPayload,
    ) -> Result<Confirmacao, ClientError> {
        let url = self.url(&format!("/api/vendas/{}", id));
        debug!(%url, "PUT venda");
        let resposta = self.http.put(&url).json(payload).send().await?;
        let status = resposta.status();
        let corpo = resposta.text().await?;
        interpretar(status, &corpo)
    }

    pub async fn deletar_venda(&self, id: i64) -> Result<Confirmacao, ClientError> {
        let url = self.url(&format!("/api/vendas/{}", id));
        debug!(%url, "DELETE venda");
        let resposta = self.http.delete(&url).send().await?;
        let status = resposta.status();
        let corpo = resposta.text().await?;
        interpretar(status, &corpo)
    }

    /// Uploads a product image as a multipart form (`imagem` field).
    pub async fn upload_imagem(&self, caminho: &Path) -> Result<RespostaUpload, ClientError> {
        let nome = caminho
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "imagem".to_string());
        let bytes = tokio::fs::read(caminho).await?;
        let parte = Part::bytes(bytes).file_name(nome);
        let form = Form::new().part("imagem", parte);

        let url = self.url("/api/upload");
        debug!(%url, "POST upload");
        let resposta = self.http.post(&url).multipart(form).send().await?;
        let status = resposta.status();
        let corpo = resposta.text().await?;
        interpretar(status, &corpo)
    }

    /// Downloads the catalog export as raw CSV bytes. Errors still arrive as
    /// JSON, so a non-2xx body goes through the usual interpretation.
    pub async fn exportar_csv(&self) -> Result<Vec<u8>, ClientError> {
        let url = self.url("/api/produtos/exportar-csv");
        debug!(%url, "GET exportação CSV");
        let resposta = self.http.get(&url).send().await?;
        let status = resposta.status();
        if status.is_success() {
            Ok(resposta.bytes().await?.to_vec())
        } else {
            let corpo = resposta.text().await?;
            Err(erro_da_resposta(status, &corpo))
        }
    }

    /// Uploads an import file as a multipart form (`arquivo` field). The file
    /// is validated locally first; see `engine::data::csv`.
    pub async fn importar_csv(&self, caminho: &Path) -> Result<Confirmacao, ClientError> {
        let nome = caminho
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "produtos.csv".to_string());
        let bytes = tokio::fs::read(caminho).await?;
        let parte = Part::bytes(bytes).file_name(nome);
        let form = Form::new().part("arquivo", parte);

        let url = self.url("/api/produtos/importar-csv");
        debug!(%url, "POST importação CSV");
        let resposta = self.http.post(&url).multipart(form).send().await?;
        let status = resposta.status();
        let corpo = resposta.text().await?;
        interpretar(status, &corpo)
    }

    pub async fn verificar_versao(&self) -> Result<VersaoApp, ClientError> {
        self.obter("/?check_version=1").await
    }
}

/// Interprets a `(status, body)` pair. 2xx bodies must parse as the expected
/// type; anything else is a server error whose `{erro}` message is surfaced
/// verbatim, with a generic fallback when the payload carries none.
pub fn interpretar<T: DeserializeOwned>(status: StatusCode, corpo: &str) -> Result<T, ClientError> {
    if status.is_success() {
        serde_json::from_str(corpo).map_err(|_| ClientError::RespostaInvalida(resumo(corpo)))
    } else {
        Err(erro_da_resposta(status, corpo))
    }
}

fn erro_da_resposta(status: StatusCode, corpo: &str) -> ClientError {
    #[derive(Deserialize)]
    struct Erro {
        #[serde(default)]
        erro: Option<String>,
    }

    let mensagem = serde_json::from_str::<Erro>(corpo)
        .ok()
        .and_then(|e| e.erro)
        .unwrap_or_else(|| format!("Erro do servidor (HTTP {})", status.as_u16()));

    ClientError::Api {
        status: status.as_u16(),
        mensagem,
    }
}

fn resumo(corpo: &str) -> String {
    const LIMITE: usize = 120;
    let corpo = corpo.trim();
    if corpo.len() <= LIMITE {
        corpo.to_string()
    } else {
        let mut corte = LIMITE;
        while !corpo.is_char_boundary(corte) {
            corte -= 1;
        }
        format!("{}...", &corpo[..corte])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sucesso_com_json_valido() {
        let confirmacao: Confirmacao =
            interpretar(StatusCode::OK, r#"{"mensagem": "Produto criado", "id": 7}"#).unwrap();
        assert_eq!(confirmacao.mensagem, "Produto criado");
        assert_eq!(confirmacao.id, Some(7));
    }

    #[test]
    fn sucesso_com_corpo_nao_json_e_resposta_invalida() {
        let resultado: Result<Confirmacao, _> =
            interpretar(StatusCode::OK, "<html>proxy error</html>");
        match resultado.unwrap_err() {
            ClientError::RespostaInvalida(corpo) => assert!(corpo.contains("proxy")),
            outro => panic!("erro inesperado: {:?}", outro),
        }
    }

    #[test]
    fn erro_do_servidor_usa_a_mensagem_do_payload() {
        let resultado: Result<Confirmacao, _> = interpretar(
            StatusCode::BAD_REQUEST,
            r#"{"erro": "Título é obrigatório"}"#,
        );
        match resultado.unwrap_err() {
            ClientError::Api { status, mensagem } => {
                assert_eq!(status, 400);
                assert_eq!(mensagem, "Título é obrigatório");
            }
            outro => panic!("erro inesperado: {:?}", outro),
        }
    }

    #[test]
    fn erro_sem_payload_usa_mensagem_generica() {
        let resultado: Result<Confirmacao, _> =
            interpretar(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        match resultado.unwrap_err() {
            ClientError::Api { status, mensagem } => {
                assert_eq!(status, 500);
                assert!(mensagem.contains("500"));
            }
            outro => panic!("erro inesperado: {:?}", outro),
        }
    }

    #[test]
    fn lista_vazia_desserializa() {
        let produtos: Vec<Produto> = interpretar(StatusCode::OK, "[]").unwrap();
        assert!(produtos.is_empty());
    }
}
