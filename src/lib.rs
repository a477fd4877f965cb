//! # Vendas ETL
//!
//! ## Visão Geral
//! Pipeline em estrela para a base de vendas de produtos pet:
//! CSV bruto -> partes Parquet -> dimensões com ids substitutos -> fato
//! enriquecido com os ids de cada dimensão -> KPIs.
//!
//! ## Princípios de Engenharia
//! - **Configuração explícita**: nenhum caminho fixo; cada etapa recebe a `Config`.
//! - **Fail-Fast**: erros estruturais abortam; divergências de dados viram relatórios.
//! - **Ids estáveis**: reexecuções preservam os ids já publicados.

pub mod analysis;
pub mod categorizer;
pub mod dimension;
pub mod enricher;
pub mod errors;
mod impl_errors;
pub mod logging;
pub mod models;
pub mod normalizer;
pub mod processor;
pub mod storage;

pub use errors::EtlError;
pub use models::{Config, DimensionConfig, MetodoChave};
