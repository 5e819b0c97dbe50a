// Sales ledger computations: profit arithmetic, month grouping and the
// locale-tolerant free-text search.

pub mod agrupamento;
pub mod busca;
pub mod lucro;

pub use agrupamento::{agrupar_por_mes, GrupoMensal};
pub use busca::filtrar_vendas;
pub use lucro::{calcular_lucro, lucro_da_venda, Lucro};
