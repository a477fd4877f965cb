//! Implementações de traits para o enum de erro do pipeline
//!
//! Este módulo existe exclusivamente para desacoplar:
//! - definição de erros (enum)
//! - implementação de traits (`Display`, `Error`, `From`)

use std::error::Error as StdError;
use std::fmt;

use polars::prelude::PolarsError;

use crate::errors::EtlError;

/* ========================================================================== */
/* Display                                                                    */
/* ========================================================================== */

impl fmt::Display for EtlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtlError::Io(err) => write!(f, "[I/O] {}", err),

            EtlError::Polars(err) => write!(f, "[Polars] {}", err),

            EtlError::Csv(err) => write!(f, "[CSV] {}", err),

            EtlError::Config(msg) => write!(f, "[Config] {}", msg),

            EtlError::ColunaNaoEncontrada { coluna, contexto } => {
                write!(f, "[Lookup] Coluna '{}' não encontrada em {}", coluna, contexto)
            }

            EtlError::FormatoNaoSuportado(path) => {
                write!(f, "[Formato] Formato não suportado: {}", path.display())
            }

            EtlError::ContagemDivergente {
                dimensao,
                antes,
                depois,
            } => write!(
                f,
                "[Join] Join com '{}' alterou o número de linhas ({} -> {}): verifique chaves duplicadas",
                dimensao, antes, depois
            ),

            EtlError::ColisaoChave { id, chaves } => write!(
                f,
                "[Chave] Id '{}' gerado para chaves distintas: '{}' e '{}'",
                id, chaves.0, chaves.1
            ),
        }
    }
}

/* ========================================================================== */
/* std::error::Error                                                          */
/* ========================================================================== */

impl StdError for EtlError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            EtlError::Io(err) => Some(err),
            EtlError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

/* ========================================================================== */
/* Conversions                                                                */
/* ========================================================================== */

impl From<std::io::Error> for EtlError {
    fn from(err: std::io::Error) -> Self {
        EtlError::Io(err)
    }
}

impl From<PolarsError> for EtlError {
    fn from(err: PolarsError) -> Self {
        EtlError::Polars(err.to_string())
    }
}

impl From<csv::Error> for EtlError {
    fn from(err: csv::Error) -> Self {
        EtlError::Csv(err)
    }
}

impl From<toml::de::Error> for EtlError {
    fn from(err: toml::de::Error) -> Self {
        EtlError::Config(format!("Erro no TOML: {}", err))
    }
}
