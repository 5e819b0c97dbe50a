//! Month-bucket aggregation of the sales ledger.

use std::collections::BTreeMap;

use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;
use shared::format::rotulo_mes_ano;
use shared::models::Venda;

use super::lucro::lucro_da_venda;

/// One aggregation bucket: all sales of a calendar month plus the summed
/// profit of the group.
#[derive(Debug, Clone, Serialize)]
pub struct GrupoMensal {
    /// Sort key, "YYYY-MM" zero-padded so lexicographic order is
    /// chronological order.
    pub chave: String,
    /// pt-BR label, e.g. "Janeiro de 2024".
    pub rotulo: String,
    pub vendas: Vec<Venda>,
    pub lucro_total: f64,
}

/// Groups sales by calendar month, most recent month first. Within a group
/// the input order is preserved (callers sort by their own criterion before
/// grouping). A sale whose date is missing or unparseable is grouped under
/// the current month instead of being dropped.
pub fn agrupar_por_mes(vendas: &[Venda]) -> Vec<GrupoMensal> {
    let mut grupos: BTreeMap<String, GrupoMensal> = BTreeMap::new();

    for venda in vendas {
        let data = data_da_venda(venda);
        let chave = format!("{:04}-{:02}", data.year(), data.month());

        let grupo = grupos.entry(chave.clone()).or_insert_with(|| GrupoMensal {
            chave,
            rotulo: rotulo_mes_ano(data),
            vendas: Vec::new(),
            lucro_total: 0.0,
        });
        grupo.lucro_total += lucro_da_venda(venda).lucro;
        grupo.vendas.push(venda.clone());
    }

    // BTreeMap iterates ascending by key; the ledger shows newest first.
    grupos.into_values().rev().collect()
}

fn data_da_venda(venda: &Venda) -> NaiveDate {
    shared::format::parse_data_local(&venda.data_venda).unwrap_or_else(|| {
        tracing::warn!(
            venda_id = venda.id,
            data = %venda.data_venda,
            "Data de venda ausente ou inválida; agrupando no mês atual"
        );
        Local::now().date_naive()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Marketplace;

    fn venda(id: i64, data: &str, compra: f64, venda: f64) -> Venda {
        Venda {
            id,
            produto_id: Some(1),
            produto_titulo: format!("Produto {}", id),
            valor_compra: compra,
            valor_venda: venda,
            data_venda: data.to_string(),
            onde_vendeu: Marketplace::Shopee,
            observacoes: String::new(),
            data_criacao: String::new(),
        }
    }

    #[test]
    fn agrupa_por_mes_com_mais_recente_primeiro() {
        let vendas = vec![
            venda(1, "2024-01-15", 10.0, 15.0),
            venda(2, "2024-02-01", 20.0, 30.0),
            venda(3, "2024-01-20", 5.0, 8.0),
        ];
        let grupos = agrupar_por_mes(&vendas);

        assert_eq!(grupos.len(), 2);
        assert_eq!(grupos[0].chave, "2024-02");
        assert_eq!(grupos[0].rotulo, "Fevereiro de 2024");
        assert_eq!(grupos[1].chave, "2024-01");
        assert_eq!(grupos[1].rotulo, "Janeiro de 2024");
    }

    #[test]
    fn ordem_de_entrada_e_preservada_dentro_do_grupo() {
        let vendas = vec![
            venda(3, "2024-01-20", 5.0, 8.0),
            venda(1, "2024-01-15", 10.0, 15.0),
        ];
        let grupos = agrupar_por_mes(&vendas);
        let ids: Vec<i64> = grupos[0].vendas.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn lucro_total_soma_o_lucro_de_cada_venda() {
        let vendas = vec![
            venda(1, "2024-01-15", 10.0, 15.0), // +5
            venda(2, "2024-01-20", 30.0, 25.0), // -5
            venda(3, "2024-01-25", 10.0, 12.0), // +2
        ];
        let grupos = agrupar_por_mes(&vendas);
        assert_eq!(grupos.len(), 1);
        assert!((grupos[0].lucro_total - 2.0).abs() < 1e-9);
    }

    #[test]
    fn soma_dos_grupos_preserva_o_lucro_global() {
        let vendas = vec![
            venda(1, "2023-12-31", 10.0, 15.0),
            venda(2, "2024-01-01", 20.0, 18.0),
            venda(3, "2024-03-10", 7.0, 21.0),
        ];
        let total_vendas: f64 = vendas.iter().map(|v| lucro_da_venda(v).lucro).sum();
        let grupos = agrupar_por_mes(&vendas);
        let total_grupos: f64 = grupos.iter().map(|g| g.lucro_total).sum();
        let total_itens: usize = grupos.iter().map(|g| g.vendas.len()).sum();

        assert!((total_grupos - total_vendas).abs() < 1e-9);
        assert_eq!(total_itens, vendas.len());
    }

    #[test]
    fn data_invalida_cai_no_mes_atual() {
        let vendas = vec![venda(1, "", 10.0, 15.0)];
        let grupos = agrupar_por_mes(&vendas);
        let hoje = Local::now().date_naive();
        let chave_atual = format!("{:04}-{:02}", hoje.year(), hoje.month());

        assert_eq!(grupos.len(), 1);
        assert_eq!(grupos[0].chave, chave_atual);
        assert_eq!(grupos[0].vendas.len(), 1);
    }

    #[test]
    fn componente_de_hora_nao_desloca_o_mes() {
        // "2024-01-31T23:00:00" deve permanecer em janeiro mesmo em fusos a
        // oeste de UTC.
        let vendas = vec![venda(1, "2024-01-31T23:00:00", 10.0, 15.0)];
        let grupos = agrupar_por_mes(&vendas);
        assert_eq!(grupos[0].chave, "2024-01");
    }
}
