//! Product list operations: search, sort and stock normalization.

use std::str::FromStr;

use chrono::NaiveDateTime;
use shared::format::parse_datetime_flex;
use shared::models::Produto;
use tracing::warn;

/// Catalog sort modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ordenacao {
    /// `data_atualizacao` descending (default).
    #[default]
    Recente,
    Nome,
    NomeDesc,
    Quantidade,
    QuantidadeAsc,
}

impl FromStr for Ordenacao {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recente" => Ok(Ordenacao::Recente),
            "nome" => Ok(Ordenacao::Nome),
            "nome-desc" => Ok(Ordenacao::NomeDesc),
            "quantidade" => Ok(Ordenacao::Quantidade),
            "quantidade-asc" => Ok(Ordenacao::QuantidadeAsc),
            outro => Err(anyhow::anyhow!(
                "Ordenação desconhecida: '{}' (esperado recente, nome, nome-desc, quantidade ou quantidade-asc)",
                outro
            )),
        }
    }
}

/// Case-insensitive substring filter over title and description. An empty or
/// whitespace-only query is the identity.
pub fn filtrar_produtos(produtos: &[Produto], termo: &str) -> Vec<Produto> {
    let termo = termo.trim().to_lowercase();
    if termo.is_empty() {
        return produtos.to_vec();
    }

    produtos
        .iter()
        .filter(|p| {
            p.titulo.to_lowercase().contains(&termo)
                || p.descricao
                    .as_deref()
                    .map(|d| d.to_lowercase().contains(&termo))
                    .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Stable in-place sort by the selected mode.
pub fn ordenar_produtos(produtos: &mut [Produto], ordenacao: Ordenacao) {
    match ordenacao {
        Ordenacao::Nome => produtos.sort_by_key(|p| p.titulo.to_lowercase()),
        Ordenacao::NomeDesc => {
            produtos.sort_by(|a, b| b.titulo.to_lowercase().cmp(&a.titulo.to_lowercase()))
        }
        Ordenacao::Quantidade => produtos.sort_by(|a, b| b.quantidade.cmp(&a.quantidade)),
        Ordenacao::QuantidadeAsc => produtos.sort_by(|a, b| a.quantidade.cmp(&b.quantidade)),
        Ordenacao::Recente => {
            // None (unparseable timestamp) ordena depois de qualquer data.
            produtos.sort_by(|a, b| data_atualizacao(b).cmp(&data_atualizacao(a)))
        }
    }
}

fn data_atualizacao(produto: &Produto) -> Option<NaiveDateTime> {
    parse_datetime_flex(&produto.data_atualizacao)
}

/// Clamps negative marketplace quantities to zero with a warning (the input
/// is never rejected) and recomputes the total stock as the sum of the
/// per-marketplace quantities whenever those are tracked. Products from the
/// single-quantity schema (both per-marketplace fields at zero) keep their
/// total untouched apart from the same negative clamp.
pub fn normalizar_quantidades(produto: &mut Produto) {
    if produto.quantidade_mercado_livre < 0 {
        warn!(
            produto_id = produto.id,
            quantidade = produto.quantidade_mercado_livre,
            "Quantidade negativa no Mercado Livre; ajustando para zero"
        );
        produto.quantidade_mercado_livre = 0;
    }
    if produto.quantidade_shopee < 0 {
        warn!(
            produto_id = produto.id,
            quantidade = produto.quantidade_shopee,
            "Quantidade negativa na Shopee; ajustando para zero"
        );
        produto.quantidade_shopee = 0;
    }

    let soma = produto.quantidade_mercado_livre + produto.quantidade_shopee;
    if soma > 0 {
        produto.quantidade = soma;
    } else if produto.quantidade < 0 {
        warn!(
            produto_id = produto.id,
            quantidade = produto.quantidade,
            "Quantidade total negativa; ajustando para zero"
        );
        produto.quantidade = 0;
    }
}
