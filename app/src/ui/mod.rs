//! Plain-text rendering of the catalog and the sales ledger.
//!
//! Pure string builders over already-filtered data; all derived numbers come
//! from the engine, nothing is computed here.

use engine::vendas::{lucro_da_venda, GrupoMensal};
use shared::format::{formatar_data_br, formatar_moeda, formatar_porcentagem, parse_data_local};
use shared::models::{Produto, Venda};

pub fn render_produtos(produtos: &[Produto]) -> String {
    if produtos.is_empty() {
        return "Nenhum produto cadastrado ainda.\n".to_string();
    }

    let mut saida = String::new();
    for produto in produtos {
        saida.push_str(&render_produto(produto));
        saida.push('\n');
    }
    saida
}

pub fn render_produto(produto: &Produto) -> String {
    let mut saida = format!("#{}  {}\n", produto.id, produto.titulo);

    if let Some(descricao) = produto.descricao.as_deref().filter(|d| !d.is_empty()) {
        saida.push_str(&format!("    {}\n", descricao));
    }

    saida.push_str(&format!(
        "    Estoque: {} (Mercado Livre: {}, Shopee: {}){}\n",
        produto.quantidade,
        produto.quantidade_mercado_livre,
        produto.quantidade_shopee,
        if produto.em_estoque() { "" } else { "  [ESGOTADO]" },
    ));

    if let Some(valor) = produto.valor_compra {
        saida.push_str(&format!("    Compra: {}\n", formatar_moeda(valor)));
    }
    if let Some(categoria) = produto.categoria.as_deref().filter(|c| !c.is_empty()) {
        saida.push_str(&format!("    Categoria: {}\n", categoria));
    }
    if let Some(imagem) = produto.imagem.as_deref().filter(|i| !i.is_empty()) {
        let origem = if produto.imagem_eh_url() { "URL" } else { "arquivo" };
        saida.push_str(&format!("    Imagem ({}): {}\n", origem, imagem));
    }
    for (chave, valor) in &produto.especificacoes {
        saida.push_str(&format!("    {}: {}\n", chave, valor));
    }

    saida
}

/// Renders the ledger grouped by month, newest first, each group headed by
/// its label and sign-prefixed total.
pub fn render_vendas(grupos: &[GrupoMensal]) -> String {
    if grupos.is_empty() {
        return "Nenhuma venda registrada ainda.\n".to_string();
    }

    let mut saida = String::new();
    for grupo in grupos {
        saida.push_str(&format!(
            "== {} | Lucro Total: {} ==\n",
            grupo.rotulo,
            moeda_com_sinal(grupo.lucro_total)
        ));
        for venda in &grupo.vendas {
            saida.push_str(&render_venda(venda));
        }
        saida.push('\n');
    }
    saida
}

fn render_venda(venda: &Venda) -> String {
    let data = parse_data_local(&venda.data_venda)
        .map(formatar_data_br)
        .unwrap_or_else(|| venda.data_venda.clone());
    let derivado = lucro_da_venda(venda);

    let mut saida = format!(
        "  #{}  {}  {}  [{}]\n",
        venda.id,
        data,
        venda.produto_titulo,
        venda.onde_vendeu.nome_exibicao()
    );
    saida.push_str(&format!(
        "      Venda: {}  Compra: {}  Lucro: {} ({})\n",
        formatar_moeda(venda.valor_venda),
        formatar_moeda(venda.valor_compra),
        formatar_moeda(derivado.lucro),
        formatar_porcentagem(derivado.porcentagem)
    ));

    let observacoes = venda.observacoes_lista();
    if !observacoes.is_empty() {
        saida.push_str(&format!("      Obs: {}\n", observacoes.join("; ")));
    }

    saida
}

fn moeda_com_sinal(valor: f64) -> String {
    let sinal = if valor >= 0.0 { "+" } else { "" };
    format!("{}{}", sinal, formatar_moeda(valor))
}
