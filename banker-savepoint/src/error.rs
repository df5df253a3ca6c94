//! Tipos de erro para banker-savepoint

use banker_core::LedgerError;
use thiserror::Error;

/// Resultado customizado para operações de savepoint
pub type SavepointResult<T> = Result<T, SavepointError>;

/// Erros operacionais do store de savepoints. Nenhum deles altera o ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SavepointError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("No savepoint named \"{0}\" exists")]
    NotFound(String),

    #[error("No manual snapshot to restore")]
    NoUndoCheckpoint,

    #[error("Invalid savepoint label: {0:?}")]
    InvalidLabel(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
