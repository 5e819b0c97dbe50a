//! Product CSV reading and writing.
//!
//! The catalog travels as a semicolon-delimited CSV (the Brazilian Excel
//! convention) with Brazilian decimals for `valor_compra`. Specifications are
//! flattened into a single cell as `chave=valor` pairs joined by `|`. The
//! client validates an import file locally before uploading it, so structural
//! problems are reported with the offending line number instead of a server
//! round trip.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use shared::format::{formatar_decimal, parse_decimal};
use shared::models::Produto;
use tracing::warn;

use crate::error::EngineError;

pub const DELIMITADOR: u8 = b';';
pub const CABECALHO: [&str; 6] = [
    "titulo",
    "descricao",
    "quantidade_mercado_livre",
    "quantidade_shopee",
    "valor_compra",
    "especificacoes",
];

/// One validated row of an import file.
#[derive(Debug, Clone, PartialEq)]
pub struct LinhaProduto {
    pub titulo: String,
    pub descricao: String,
    pub quantidade_mercado_livre: i64,
    pub quantidade_shopee: i64,
    pub valor_compra: Option<f64>,
    pub especificacoes: BTreeMap<String, String>,
}

/// Parses and validates a product CSV. Negative quantities are clamped to
/// zero with a warning, matching the permissive normalization applied to API
/// data; anything structurally wrong (missing column, empty title, bad
/// number) is an error carrying the line number.
pub fn ler_produtos_csv<R: Read>(reader: R) -> Result<Vec<LinhaProduto>, EngineError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(DELIMITADOR)
        .has_headers(true)
        .from_reader(reader);

    let cabecalho = rdr.headers()?.clone();
    for esperado in CABECALHO {
        if !cabecalho.iter().any(|c| c == esperado) {
            return Err(EngineError::CsvFormato {
                linha: 1,
                mensagem: format!("coluna obrigatória '{}' ausente no cabeçalho", esperado),
            });
        }
    }

    let mut linhas = Vec::new();
    for (idx, resultado) in rdr.records().enumerate() {
        let registro = resultado?;
        let linha = idx + 2; // 1-based, pulando o cabeçalho

        let titulo = campo(&registro, &cabecalho, "titulo").trim().to_string();
        if titulo.is_empty() {
            return Err(EngineError::CsvFormato {
                linha,
                mensagem: "título é obrigatório".to_string(),
            });
        }

        let descricao = campo(&registro, &cabecalho, "descricao").trim().to_string();
        let quantidade_ml = quantidade(&registro, &cabecalho, "quantidade_mercado_livre", linha)?;
        let quantidade_shopee = quantidade(&registro, &cabecalho, "quantidade_shopee", linha)?;

        let valor_bruto = campo(&registro, &cabecalho, "valor_compra").trim().to_string();
        let valor_compra = if valor_bruto.is_empty() {
            None
        } else {
            Some(parse_decimal(&valor_bruto).map_err(|e| EngineError::CsvFormato {
                linha,
                mensagem: format!("valor_compra inválido: {}", e),
            })?)
        };

        let especificacoes = ler_especificacoes(campo(&registro, &cabecalho, "especificacoes"));

        linhas.push(LinhaProduto {
            titulo,
            descricao,
            quantidade_mercado_livre: quantidade_ml,
            quantidade_shopee,
            valor_compra,
            especificacoes,
        });
    }

    Ok(linhas)
}

pub fn ler_produtos_csv_de_arquivo<P: AsRef<Path>>(
    caminho: P,
) -> Result<Vec<LinhaProduto>, EngineError> {
    let arquivo = File::open(caminho)?;
    ler_produtos_csv(BufReader::new(arquivo))
}

/// Writes the product list in the import layout, so an export can be edited
/// and re-imported as is.
pub fn escrever_produtos_csv<W: Write>(writer: W, produtos: &[Produto]) -> Result<(), EngineError> {
    let mut wtr = WriterBuilder::new().delimiter(DELIMITADOR).from_writer(writer);
    wtr.write_record(CABECALHO)?;

    for produto in produtos {
        let valor = produto
            .valor_compra
            .map(|v| formatar_decimal(v, 2))
            .unwrap_or_default();
        let especificacoes = produto
            .especificacoes
            .iter()
            .map(|(chave, valor)| format!("{}={}", chave, valor))
            .collect::<Vec<_>>()
            .join("|");

        wtr.write_record([
            produto.titulo.as_str(),
            produto.descricao.as_deref().unwrap_or(""),
            &produto.quantidade_mercado_livre.to_string(),
            &produto.quantidade_shopee.to_string(),
            &valor,
            &especificacoes,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

fn campo<'a>(registro: &'a StringRecord, cabecalho: &StringRecord, nome: &str) -> &'a str {
    cabecalho
        .iter()
        .position(|c| c == nome)
        .and_then(|pos| registro.get(pos))
        .unwrap_or("")
}

fn quantidade(
    registro: &StringRecord,
    cabecalho: &StringRecord,
    nome: &str,
    linha: usize,
) -> Result<i64, EngineError> {
    let bruto = campo(registro, cabecalho, nome).trim();
    if bruto.is_empty() {
        return Ok(0);
    }

    let valor: i64 = bruto.parse().map_err(|_| EngineError::CsvFormato {
        linha,
        mensagem: format!("{} inválida: '{}'", nome, bruto),
    })?;

    if valor < 0 {
        warn!(linha, campo = nome, valor, "Quantidade negativa no CSV; ajustando para zero");
        return Ok(0);
    }
    Ok(valor)
}

fn ler_especificacoes(celula: &str) -> BTreeMap<String, String> {
    celula
        .split('|')
        .filter_map(|par| {
            let (chave, valor) = par.split_once('=')?;
            let chave = chave.trim();
            let valor = valor.trim();
            if chave.is_empty() || valor.is_empty() {
                None
            } else {
                Some((chave.to_string(), valor.to_string()))
            }
        })
        .collect()
}
