//! Tipos de erro para banker-core

use crate::matrix::Units;
use thiserror::Error;

/// Resultado customizado para operações sobre o ledger
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Erros de validação, inicialização e persistência do ledger.
///
/// Negações de política (need, disponibilidade, estado inseguro) não são
/// erros: chegam como [`RequestOutcome`](crate::RequestOutcome).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Invalid consumer P{consumer}: expected P0..P{}", .consumers.saturating_sub(1))]
    InvalidConsumer { consumer: usize, consumers: usize },

    #[error("Dimension mismatch: expected {expected} values, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Negative quantity {value} for R{resource}")]
    NegativeQuantity { resource: usize, value: Units },

    #[error("Invalid release for P{consumer} R{resource}: releasing {requested}, holding {held}")]
    ReleaseExceedsAllocation {
        consumer: usize,
        resource: usize,
        requested: Units,
        held: Units,
    },

    #[error("Invalid initial state: {0}")]
    InvalidInitialState(String),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LedgerError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Erro de validação (rejeitado antes de qualquer mutação)?
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidConsumer { .. }
                | Self::DimensionMismatch { .. }
                | Self::NegativeQuantity { .. }
                | Self::ReleaseExceedsAllocation { .. }
        )
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
