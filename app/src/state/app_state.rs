//! Client-side state: the authoritative lists plus their filtered views.
//!
//! `AppState` is pure and synchronous; everything derived (filtered views,
//! month groups) is recomputed from the full lists, which are replaced
//! wholesale on every reload. `Store` couples the state to the HTTP client
//! with the reload-after-mutation discipline.

use engine::produtos::{filtrar_produtos, normalizar_quantidades, ordenar_produtos, Ordenacao};
use engine::vendas::{agrupar_por_mes, filtrar_vendas, GrupoMensal};
use shared::models::{Produto, ProdutoPayload, Venda, VendaPayload};
use tracing::info;

use crate::error::ClientError;
use crate::services::api_client::{ApiClient, Confirmacao};

#[derive(Default)]
pub struct AppState {
    pub produtos: Vec<Produto>,
    pub produtos_filtrados: Vec<Produto>,
    pub vendas: Vec<Venda>,
    pub vendas_filtradas: Vec<Venda>,
    pub ordenacao: Ordenacao,
    pub busca_produtos: String,
    pub busca_vendas: String,
}

impl AppState {
    /// Replaces the product list, normalizing quantities on the way in, and
    /// reapplies the current filter and sort.
    pub fn definir_produtos(&mut self, mut produtos: Vec<Produto>) {
        for produto in &mut produtos {
            normalizar_quantidades(produto);
        }
        self.produtos = produtos;
        self.aplicar_filtro_produtos();
    }

    pub fn definir_vendas(&mut self, vendas: Vec<Venda>) {
        self.vendas = vendas;
        self.aplicar_filtro_vendas();
    }

    pub fn definir_ordenacao(&mut self, ordenacao: Ordenacao) {
        self.ordenacao = ordenacao;
        ordenar_produtos(&mut self.produtos_filtrados, self.ordenacao);
    }

    pub fn definir_busca_produtos(&mut self, termo: &str) {
        self.busca_produtos = termo.to_string();
        self.aplicar_filtro_produtos();
    }

    pub fn definir_busca_vendas(&mut self, termo: &str) {
        self.busca_vendas = termo.to_string();
        self.aplicar_filtro_vendas();
    }

    pub fn produto(&self, id: i64) -> Option<&Produto> {
        self.produtos.iter().find(|p| p.id == id)
    }

    pub fn venda(&self, id: i64) -> Option<&Venda> {
        self.vendas.iter().find(|v| v.id == id)
    }

    /// Month groups over the filtered ledger, newest month first.
    pub fn grupos_mensais(&self) -> Vec<GrupoMensal> {
        agrupar_por_mes(&self.vendas_filtradas)
    }

    fn aplicar_filtro_produtos(&mut self) {
        self.produtos_filtrados = filtrar_produtos(&self.produtos, &self.busca_produtos);
        ordenar_produtos(&mut self.produtos_filtrados, self.ordenacao);
    }

    fn aplicar_filtro_vendas(&mut self) {
        self.vendas_filtradas = filtrar_vendas(&self.vendas, &self.busca_vendas);
    }
}

/// State plus the client, with every mutation followed by an authoritative
/// reload of the affected lists.
pub struct Store {
    pub estado: AppState,
    api: ApiClient,
}

impl Store {
    pub fn new(api: ApiClient) -> Self {
        Self {
            estado: AppState::default(),
            api,
        }
    }

    pub async fn recarregar_produtos(&mut self) -> Result<(), ClientError> {
        let produtos = self.api.listar_produtos().await?;
        info!(total = produtos.len(), "Produtos recarregados");
        self.estado.definir_produtos(produtos);
        Ok(())
    }

    pub async fn recarregar_vendas(&mut self) -> Result<(), ClientError> {
        let vendas = self.api.listar_vendas().await?;
        info!(total = vendas.len(), "Vendas recarregadas");
        self.estado.definir_vendas(vendas);
        Ok(())
    }

    pub async fn criar_produto(
        &mut self,
        payload: &ProdutoPayload,
    ) -> Result<Confirmacao, ClientError> {
        let confirmacao = self.api.criar_produto(payload).await?;
        self.recarregar_produtos().await?;
        Ok(confirmacao)
    }

    pub async fn atualizar_produto(
        &mut self,
        id: i64,
        payload: &ProdutoPayload,
    ) -> Result<Confirmacao, ClientError> {
        let confirmacao = self.api.atualizar_produto(id, payload).await?;
        self.recarregar_produtos().await?;
        Ok(confirmacao)
    }

    pub async fn deletar_produto(&mut self, id: i64) -> Result<Confirmacao, ClientError> {
        let confirmacao = self.api.deletar_produto(id).await?;
        // Vendas guardam o título como snapshot; a lista muda junto.
        self.recarregar_produtos().await?;
        self.recarregar_vendas().await?;
        Ok(confirmacao)
    }

    /// Registers a sale after the pre-flight guards: the sale value must be
    /// positive and the product must be known and have stock. The server
    /// decrements the quantity; both lists are reloaded so the client never
    /// computes stock locally.
    pub async fn registrar_venda(
        &mut self,
        payload: &VendaPayload,
    ) -> Result<Confirmacao, ClientError> {
        validar_valor_venda(payload)?;
        match self.estado.produto(payload.produto_id) {
            None => {
                return Err(ClientError::Validacao(format!(
                    "Produto {} não encontrado",
                    payload.produto_id
                )))
            }
            Some(produto) if !produto.em_estoque() => {
                return Err(ClientError::Validacao(format!(
                    "Produto '{}' sem estoque disponível",
                    produto.titulo
                )))
            }
            Some(_) => {}
        }

        let confirmacao = self.api.registrar_venda(payload).await?;
        self.recarregar_produtos().await?;
        self.recarregar_vendas().await?;
        Ok(confirmacao)
    }

    /// Edits an existing sale. The sale value guard still applies; there is
    /// no stock guard here because the product reference is unchanged and the
    /// server reconciles any quantity adjustment.
    pub async fn atualizar_venda(
        &mut self,
        id: i64,
        payload: &VendaPayload,
    ) -> Result<Confirmacao, ClientError> {
        validar_valor_venda(payload)?;
        let confirmacao = self.api.atualizar_venda(id, payload).await?;
        self.recarregar_produtos().await?;
        self.recarregar_vendas().await?;
        Ok(confirmacao)
    }

    /// Deletes a sale; the server restores the product's stock.
    pub async fn deletar_venda(&mut self, id: i64) -> Result<Confirmacao, ClientError> {
        let confirmacao = self.api.deletar_venda(id).await?;
        self.recarregar_produtos().await?;
        self.recarregar_vendas().await?;
        Ok(confirmacao)
    }
}

/// A sale with a zero or negative value never leaves the client. The
/// comparison is written so a non-finite value is rejected too.
fn validar_valor_venda(payload: &VendaPayload) -> Result<(), ClientError> {
    if !(payload.valor_venda > 0.0) {
        return Err(ClientError::Validacao(
            "O valor de venda deve ser maior que zero".to_string(),
        ));
    }
    Ok(())
}
