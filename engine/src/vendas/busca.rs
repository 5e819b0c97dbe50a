//! Free-text search over the sales ledger.
//!
//! Matching is case-insensitive substring search across the product title,
//! the Brazilian-formatted date, the marketplace label, the observations and
//! the four numeric fields. Numeric matching is deliberately tolerant of both
//! decimal conventions: a user typing "12,50" or "12.50" (or just "1250")
//! must find a sale whose margin formats as "12,50".

use shared::format::{formatar_data_br, formatar_porcentagem, parse_data_local};
use shared::models::Venda;

use super::lucro::lucro_da_venda;

/// Filters the sales list against a free-text query. An empty or
/// whitespace-only query returns the full input unchanged.
pub fn filtrar_vendas(vendas: &[Venda], termo: &str) -> Vec<Venda> {
    let termo = termo.trim().to_lowercase();
    if termo.is_empty() {
        return vendas.to_vec();
    }

    vendas
        .iter()
        .filter(|venda| venda_combina(venda, &termo))
        .cloned()
        .collect()
}

fn venda_combina(venda: &Venda, termo: &str) -> bool {
    if venda.produto_titulo.to_lowercase().contains(termo) {
        return true;
    }

    // Date match uses the local calendar date, never UTC, so the formatted
    // day is the one the user registered.
    if let Some(data) = parse_data_local(&venda.data_venda) {
        if formatar_data_br(data).contains(termo) {
            return true;
        }
    }

    if venda.onde_vendeu.rotulo_busca().contains(termo) {
        return true;
    }

    if venda.observacoes.to_lowercase().contains(termo) {
        return true;
    }

    let derivado = lucro_da_venda(venda);

    // Purchase and sale values only participate when non-zero; profit and
    // margin always participate (zero included).
    (venda.valor_venda != 0.0 && valor_combina(venda.valor_venda, termo))
        || (venda.valor_compra != 0.0 && valor_combina(venda.valor_compra, termo))
        || valor_combina(derivado.lucro, termo)
        || porcentagem_combina(derivado.porcentagem, termo)
}

/// Locale-tolerant numeric match. From the query three forms are built (raw,
/// comma normalized to dot, all separators stripped); from the field's
/// 2-decimal formatting the dot, comma and digits-only variants. The field
/// matches when any corresponding pair is in a substring relation.
fn valor_combina(valor: f64, termo: &str) -> bool {
    let termo_normalizado = termo.replace(',', ".");
    let termo_sem_separador: String = termo.chars().filter(|c| *c != ',' && *c != '.').collect();

    let ponto = format!("{:.2}", valor);
    let virgula = ponto.replace('.', ",");
    let digitos = ponto.replace('.', "");

    digitos.contains(&termo_sem_separador)
        || ponto.contains(&termo_normalizado)
        || virgula.contains(termo)
}

fn porcentagem_combina(porcentagem: f64, termo: &str) -> bool {
    // Also matches the signed, percent-suffixed rendering ("+12,50%").
    valor_combina(porcentagem, termo)
        || formatar_porcentagem(porcentagem).to_lowercase().contains(termo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Marketplace;

    fn venda(titulo: &str, data: &str, compra: f64, valor: f64, onde: Marketplace) -> Venda {
        Venda {
            id: 1,
            produto_id: Some(1),
            produto_titulo: titulo.to_string(),
            valor_compra: compra,
            valor_venda: valor,
            data_venda: data.to_string(),
            onde_vendeu: onde,
            observacoes: String::new(),
            data_criacao: String::new(),
        }
    }

    fn lista() -> Vec<Venda> {
        vec![
            venda("Fone Bluetooth", "2024-01-15", 10.0, 15.0, Marketplace::MercadoLivre),
            venda("Carregador Turbo", "2024-02-01", 20.0, 22.5, Marketplace::Shopee),
        ]
    }

    #[test]
    fn busca_vazia_retorna_a_lista_completa() {
        let vendas = lista();
        assert_eq!(filtrar_vendas(&vendas, "").len(), 2);
        assert_eq!(filtrar_vendas(&vendas, "   ").len(), 2);
    }

    #[test]
    fn filtro_e_idempotente() {
        let vendas = lista();
        let uma_vez = filtrar_vendas(&vendas, "fone");
        let duas_vezes = filtrar_vendas(&uma_vez, "fone");
        assert_eq!(uma_vez.len(), duas_vezes.len());
        assert_eq!(uma_vez[0].id, duas_vezes[0].id);
    }

    #[test]
    fn busca_por_titulo_ignora_caixa() {
        let resultado = filtrar_vendas(&lista(), "FONE");
        assert_eq!(resultado.len(), 1);
        assert_eq!(resultado[0].produto_titulo, "Fone Bluetooth");
    }

    #[test]
    fn busca_por_data_no_formato_brasileiro() {
        let resultado = filtrar_vendas(&lista(), "15/01/2024");
        assert_eq!(resultado.len(), 1);
        assert_eq!(resultado[0].data_venda, "2024-01-15");
    }

    #[test]
    fn busca_por_marketplace_usa_o_rotulo_com_espaco() {
        let resultado = filtrar_vendas(&lista(), "mercado livre");
        assert_eq!(resultado.len(), 1);
        assert_eq!(resultado[0].onde_vendeu, Marketplace::MercadoLivre);
    }

    #[test]
    fn busca_por_observacoes() {
        let mut vendas = lista();
        vendas[1].observacoes = "Frete pago | Cliente recorrente".to_string();
        let resultado = filtrar_vendas(&vendas, "frete");
        assert_eq!(resultado.len(), 1);
        assert_eq!(resultado[0].produto_titulo, "Carregador Turbo");
    }

    #[test]
    fn busca_numerica_aceita_virgula_como_separador_decimal() {
        // Margem da segunda venda: (22.5 - 20) / 20 * 100 = 12.5 → "12,50".
        let resultado = filtrar_vendas(&lista(), "12,50");
        assert_eq!(resultado.len(), 1);
        assert_eq!(resultado[0].produto_titulo, "Carregador Turbo");
    }

    #[test]
    fn busca_numerica_aceita_ponto_como_separador_decimal() {
        let resultado = filtrar_vendas(&lista(), "22.50");
        assert_eq!(resultado.len(), 1);
        assert_eq!(resultado[0].valor_venda, 22.5);
    }

    #[test]
    fn busca_numerica_sem_separadores() {
        // "1250" casa com os dígitos de "12,50".
        let resultado = filtrar_vendas(&lista(), "1250");
        assert_eq!(resultado.len(), 1);
        assert_eq!(resultado[0].produto_titulo, "Carregador Turbo");
    }

    #[test]
    fn busca_pela_porcentagem_com_sinal_e_simbolo() {
        let resultado = filtrar_vendas(&lista(), "+12,50%");
        assert_eq!(resultado.len(), 1);
        assert_eq!(resultado[0].produto_titulo, "Carregador Turbo");
    }

    #[test]
    fn lucro_negativo_e_encontrado_pelo_valor() {
        let vendas = vec![venda("Capinha", "2024-03-01", 20.0, 15.0, Marketplace::Shopee)];
        let resultado = filtrar_vendas(&vendas, "-5,00");
        assert_eq!(resultado.len(), 1);
    }

    #[test]
    fn valor_de_compra_zerado_nao_participa_da_busca() {
        // valor_compra == 0 fica fora da comparação numérica; "0,00" ainda
        // pode casar com o lucro/porcentagem de outra venda, então usamos um
        // termo que só casaria com a compra.
        let vendas = vec![venda("Brinde", "2024-03-01", 0.0, 7.0, Marketplace::Shopee)];
        let resultado = filtrar_vendas(&vendas, "0,0");
        // lucro 7,00 e porcentagem +0,00%: "0,0" casa com a porcentagem.
        assert_eq!(resultado.len(), 1);
        // Mas um termo com os dígitos exatos da compra não casa via compra.
        let nada = filtrar_vendas(&vendas, "grátis");
        assert!(nada.is_empty());
    }

    #[test]
    fn termo_sem_correspondencia_retorna_vazio() {
        assert!(filtrar_vendas(&lista(), "notebook").is_empty());
    }
}
