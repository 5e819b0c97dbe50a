use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Separator used by the backend to store multiple observations in a single
/// text column. Kept as a constant so joining and splitting never drift apart.
pub const SEPARADOR_OBSERVACOES: &str = " | ";

/// Sales channel supported by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marketplace {
    MercadoLivre,
    Shopee,
}

impl Marketplace {
    /// Lowercase label used by the free-text search ("mercado livre", "shopee").
    pub fn rotulo_busca(&self) -> &'static str {
        match self {
            Marketplace::MercadoLivre => "mercado livre",
            Marketplace::Shopee => "shopee",
        }
    }

    /// Human-facing label.
    pub fn nome_exibicao(&self) -> &'static str {
        match self {
            Marketplace::MercadoLivre => "Mercado Livre",
            Marketplace::Shopee => "Shopee",
        }
    }

    /// Wire value as stored by the backend.
    pub fn valor_api(&self) -> &'static str {
        match self {
            Marketplace::MercadoLivre => "mercado_livre",
            Marketplace::Shopee => "shopee",
        }
    }
}

impl fmt::Display for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.valor_api())
    }
}

impl FromStr for Marketplace {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(' ', "_").as_str() {
            "mercado_livre" | "ml" => Ok(Marketplace::MercadoLivre),
            "shopee" => Ok(Marketplace::Shopee),
            outro => Err(anyhow::anyhow!(
                "Marketplace desconhecido: '{}' (esperado 'mercado_livre' ou 'shopee')",
                outro
            )),
        }
    }
}

/// Product as delivered by `GET /api/produtos`.
///
/// The schema accumulated fields over time: the earliest version carried
/// `valor_compra`, later ones added per-marketplace quantities and `categoria`.
/// Everything beyond `id` and `titulo` is therefore optional on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Produto {
    pub id: i64,
    pub titulo: String,
    #[serde(default)]
    pub descricao: Option<String>,
    /// Total stock; equals the sum of the per-marketplace quantities whenever
    /// those are tracked. Recomputed client-side, never trusted blindly.
    #[serde(default)]
    pub quantidade: i64,
    #[serde(default)]
    pub quantidade_mercado_livre: i64,
    #[serde(default)]
    pub quantidade_shopee: i64,
    #[serde(default)]
    pub valor_compra: Option<f64>,
    #[serde(default)]
    pub categoria: Option<String>,
    /// Either an absolute URL (cloud storage) or a bare filename (local
    /// uploads). Never both; the renderer decides how to resolve it.
    #[serde(default)]
    pub imagem: Option<String>,
    #[serde(default, deserialize_with = "de_especificacoes")]
    pub especificacoes: BTreeMap<String, String>,
    #[serde(default)]
    pub data_criacao: String,
    #[serde(default)]
    pub data_atualizacao: String,
}

impl Produto {
    pub fn em_estoque(&self) -> bool {
        self.quantidade > 0
    }

    /// True when `imagem` points at an absolute URL rather than a local upload.
    pub fn imagem_eh_url(&self) -> bool {
        self.imagem
            .as_deref()
            .map(|i| i.starts_with("http://") || i.starts_with("https://"))
            .unwrap_or(false)
    }
}

/// The backend historically persisted `especificacoes` as a JSON-encoded
/// string; newer deployments return a proper object. Accept both, and fall
/// back to an empty map on anything malformed instead of failing the whole
/// product list.
fn de_especificacoes<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Especificacoes {
        Mapa(BTreeMap<String, String>),
        Texto(String),
        Nulo(()),
    }

    match Especificacoes::deserialize(deserializer)? {
        Especificacoes::Mapa(mapa) => Ok(mapa),
        Especificacoes::Texto(texto) => Ok(serde_json::from_str(&texto).unwrap_or_default()),
        Especificacoes::Nulo(()) => Ok(BTreeMap::new()),
    }
}

/// Body for `POST /api/produtos` and `PUT /api/produtos/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProdutoPayload {
    pub titulo: String,
    pub descricao: String,
    pub quantidade_mercado_livre: i64,
    pub quantidade_shopee: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valor_compra: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
    pub imagem: String,
    pub especificacoes: BTreeMap<String, String>,
}

/// Sale as delivered by `GET /api/vendas`.
///
/// `lucro` and `porcentagem_lucro` also come over the wire, but derived values
/// are always recomputed from `valor_compra`/`valor_venda` (see
/// `engine::vendas::lucro`), so they are deliberately not modeled here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venda {
    pub id: i64,
    /// Null once the originating product has been deleted; the title snapshot
    /// below keeps the ledger readable.
    #[serde(default)]
    pub produto_id: Option<i64>,
    #[serde(default = "titulo_produto_deletado")]
    pub produto_titulo: String,
    #[serde(default)]
    pub valor_compra: f64,
    #[serde(default)]
    pub valor_venda: f64,
    /// Calendar date, `YYYY-MM-DD`; some backends append a time component
    /// which must be stripped before parsing.
    #[serde(default)]
    pub data_venda: String,
    pub onde_vendeu: Marketplace,
    #[serde(default)]
    pub observacoes: String,
    #[serde(default)]
    pub data_criacao: String,
}

fn titulo_produto_deletado() -> String {
    "Produto Deletado".to_string()
}

impl Venda {
    /// Splits the stored observation text back into its list form.
    pub fn observacoes_lista(&self) -> Vec<String> {
        self.observacoes
            .split(SEPARADOR_OBSERVACOES)
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect()
    }
}

/// Joins individual observations into the single stored string, skipping
/// blank entries.
pub fn juntar_observacoes<I, S>(itens: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    itens
        .into_iter()
        .map(|o| o.as_ref().trim().to_string())
        .filter(|o| !o.is_empty())
        .collect::<Vec<_>>()
        .join(SEPARADOR_OBSERVACOES)
}

/// Body for `POST /api/vendas` and `PUT /api/vendas/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct VendaPayload {
    pub produto_id: i64,
    pub valor_venda: f64,
    pub data_venda: String,
    pub onde_vendeu: Marketplace,
    pub observacoes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marketplace_rotulos() {
        assert_eq!(Marketplace::MercadoLivre.rotulo_busca(), "mercado livre");
        assert_eq!(Marketplace::Shopee.nome_exibicao(), "Shopee");
        assert_eq!(Marketplace::MercadoLivre.valor_api(), "mercado_livre");
    }

    #[test]
    fn marketplace_from_str_aceita_variantes() {
        assert_eq!(
            "mercado livre".parse::<Marketplace>().unwrap(),
            Marketplace::MercadoLivre
        );
        assert_eq!("Shopee".parse::<Marketplace>().unwrap(), Marketplace::Shopee);
        assert!("amazon".parse::<Marketplace>().is_err());
    }

    #[test]
    fn produto_desserializa_especificacoes_como_objeto() {
        let json = r#"{
            "id": 1,
            "titulo": "Fone Bluetooth",
            "quantidade": 3,
            "especificacoes": {"Cor": "Preto", "Marca": "JBL"}
        }"#;
        let produto: Produto = serde_json::from_str(json).unwrap();
        assert_eq!(produto.especificacoes.get("Cor").unwrap(), "Preto");
        assert_eq!(produto.especificacoes.len(), 2);
    }

    #[test]
    fn produto_desserializa_especificacoes_como_string_json() {
        let json = r#"{
            "id": 2,
            "titulo": "Carregador",
            "especificacoes": "{\"Voltagem\": \"Bivolt\"}"
        }"#;
        let produto: Produto = serde_json::from_str(json).unwrap();
        assert_eq!(produto.especificacoes.get("Voltagem").unwrap(), "Bivolt");
    }

    #[test]
    fn produto_especificacoes_malformadas_viram_mapa_vazio() {
        let json = r#"{"id": 3, "titulo": "Cabo", "especificacoes": "nao-e-json"}"#;
        let produto: Produto = serde_json::from_str(json).unwrap();
        assert!(produto.especificacoes.is_empty());
    }

    #[test]
    fn venda_sem_titulo_usa_fallback_de_produto_deletado() {
        let json = r#"{
            "id": 10,
            "valor_compra": 10.0,
            "valor_venda": 15.0,
            "data_venda": "2024-01-15",
            "onde_vendeu": "shopee"
        }"#;
        let venda: Venda = serde_json::from_str(json).unwrap();
        assert_eq!(venda.produto_titulo, "Produto Deletado");
        assert_eq!(venda.produto_id, None);
    }

    #[test]
    fn observacoes_sao_divididas_e_juntadas_pelo_mesmo_separador() {
        let venda = Venda {
            id: 1,
            produto_id: Some(1),
            produto_titulo: "Fone".to_string(),
            valor_compra: 10.0,
            valor_venda: 15.0,
            data_venda: "2024-01-15".to_string(),
            onde_vendeu: Marketplace::Shopee,
            observacoes: "Frete pago | Cliente recorrente".to_string(),
            data_criacao: String::new(),
        };
        let lista = venda.observacoes_lista();
        assert_eq!(lista, vec!["Frete pago", "Cliente recorrente"]);
        assert_eq!(juntar_observacoes(&lista), venda.observacoes);
    }

    #[test]
    fn juntar_observacoes_ignora_entradas_vazias() {
        assert_eq!(juntar_observacoes(["a", " ", "b"]), "a | b");
        assert_eq!(juntar_observacoes(Vec::<String>::new()), "");
    }
}
