//! Profit and profit-margin arithmetic.

use serde::Serialize;
use shared::models::Venda;

/// Derived metrics of a single sale. No rounding is applied here; the
/// presentation layer rounds currency and percentage to two decimal places
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Lucro {
    pub lucro: f64,
    pub porcentagem: f64,
}

/// Computes profit (sale minus purchase) and margin relative to the purchase
/// value. A purchase value of zero yields a margin of zero rather than a
/// division error; non-finite inputs are coerced to zero.
pub fn calcular_lucro(valor_compra: f64, valor_venda: f64) -> Lucro {
    let compra = if valor_compra.is_finite() { valor_compra } else { 0.0 };
    let venda = if valor_venda.is_finite() { valor_venda } else { 0.0 };

    let lucro = venda - compra;
    let porcentagem = if compra > 0.0 { lucro / compra * 100.0 } else { 0.0 };

    Lucro { lucro, porcentagem }
}

/// Recomputes the derived metrics from the sale's current values. Wire-level
/// `lucro`/`porcentagem_lucro` fields are never trusted.
pub fn lucro_da_venda(venda: &Venda) -> Lucro {
    calcular_lucro(venda.valor_compra, venda.valor_venda)
}
