//! Brazilian number and date formatting shared by the engine and the client.

use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::str::FromStr;

/// Parses decimals like "1.234,56" or "123,45" into f64. A plain "123.45"
/// with no comma is also accepted, since users type both conventions.
pub fn parse_decimal(s: &str) -> Result<f64> {
    let bruto = s.trim();
    let normalizado = if bruto.contains(',') {
        // Comma is the decimal separator, dots are thousand separators.
        bruto.replace('.', "").replace(',', ".")
    } else {
        bruto.to_string()
    };

    f64::from_str(&normalizado).map_err(|e| anyhow!("Valor decimal inválido '{}': {}", s, e))
}

/// Formats a value with a fixed number of decimal places using the comma
/// separator ("12,50"). No thousand grouping, matching the original display.
pub fn formatar_decimal(valor: f64, casas: usize) -> String {
    format!("{:.casas$}", valor, casas = casas).replace('.', ",")
}

/// Currency rendering: "R$ 12,50" (negative values keep the minus sign).
pub fn formatar_moeda(valor: f64) -> String {
    format!("R$ {}", formatar_decimal(valor, 2))
}

/// Signed percentage rendering: "+12,50%" / "-3,00%".
pub fn formatar_porcentagem(valor: f64) -> String {
    let sinal = if valor >= 0.0 { "+" } else { "" };
    format!("{}{}%", sinal, formatar_decimal(valor, 2))
}

/// Parses the date-only portion of a backend date string as a local calendar
/// date. The string may carry a trailing time component ("2024-01-15T10:30:00"
/// or "2024-01-15 10:30:00"); only year/month/day are used, never UTC
/// conversion, so the day cannot shift across time zones.
pub fn parse_data_local(s: &str) -> Option<NaiveDate> {
    let somente_data = s.split(['T', ' ']).next()?.trim();
    NaiveDate::parse_from_str(somente_data, "%Y-%m-%d").ok()
}

/// Parses ISO datetimes in the loose formats the backend emits
/// ("2024-01-15T10:30:00", with or without fractional seconds, or date only).
pub fn parse_datetime_flex(s: &str) -> Option<NaiveDateTime> {
    let bruto = s.trim();
    NaiveDateTime::parse_from_str(bruto, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(bruto, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| parse_data_local(bruto).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

/// Formats a date the Brazilian way: DD/MM/YYYY.
pub fn formatar_data_br(data: NaiveDate) -> String {
    data.format("%d/%m/%Y").to_string()
}

const MESES: [&str; 12] = [
    "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto", "setembro",
    "outubro", "novembro", "dezembro",
];

/// pt-BR month/year label with the first letter capitalized: "Janeiro de 2024".
pub fn rotulo_mes_ano(data: NaiveDate) -> String {
    let mes = MESES[(data.month0()) as usize];
    let mut capitalizado = String::with_capacity(mes.len());
    let mut chars = mes.chars();
    if let Some(primeira) = chars.next() {
        capitalizado.extend(primeira.to_uppercase());
        capitalizado.push_str(chars.as_str());
    }
    format!("{} de {}", capitalizado, data.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_decimal_com_virgula() {
        assert_eq!(parse_decimal("123,45").unwrap(), 123.45);
    }

    #[test]
    fn parse_decimal_com_milhares() {
        assert_eq!(parse_decimal("1.234,56").unwrap(), 1234.56);
        assert_eq!(parse_decimal("600.822.115,84").unwrap(), 600822115.84);
    }

    #[test]
    fn parse_decimal_com_ponto_simples() {
        // Sem vírgula o ponto é tratado como separador decimal.
        assert_eq!(parse_decimal("123.45").unwrap(), 123.45);
    }

    #[test]
    fn parse_decimal_invalido() {
        assert!(parse_decimal("abc").is_err());
        assert!(parse_decimal("").is_err());
    }

    #[test]
    fn formatar_decimal_usa_virgula() {
        assert_eq!(formatar_decimal(12.5, 2), "12,50");
        assert_eq!(formatar_decimal(-5.0, 2), "-5,00");
    }

    #[test]
    fn formatar_moeda_e_porcentagem() {
        assert_eq!(formatar_moeda(1234.5), "R$ 1234,50");
        assert_eq!(formatar_porcentagem(12.5), "+12,50%");
        assert_eq!(formatar_porcentagem(-3.0), "-3,00%");
    }

    #[test]
    fn parse_data_local_ignora_componente_de_hora() {
        let d = parse_data_local("2024-01-15T22:00:00").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2024, 1, 15));
        assert_eq!(parse_data_local("2024-02-01").unwrap().day(), 1);
        assert!(parse_data_local("15/01/2024").is_none());
        assert!(parse_data_local("").is_none());
    }

    #[test]
    fn parse_datetime_flex_formatos() {
        assert!(parse_datetime_flex("2024-01-15T10:30:00").is_some());
        assert!(parse_datetime_flex("2024-01-15T10:30:00.123456").is_some());
        assert!(parse_datetime_flex("2024-01-15 10:30:00").is_some());
        assert!(parse_datetime_flex("2024-01-15").is_some());
        assert!(parse_datetime_flex("ontem").is_none());
    }

    #[test]
    fn formatar_data_brasileira() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(formatar_data_br(d), "15/01/2024");
    }

    #[test]
    fn rotulo_do_mes_capitalizado() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(rotulo_mes_ano(jan), "Janeiro de 2024");
        let mar = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        assert_eq!(rotulo_mes_ano(mar), "Março de 2023");
    }
}
