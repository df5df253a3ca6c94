//! Traits fundamentais do ledger

use std::fmt::Debug;

use crate::error::LedgerResult;

/// Estado que pode ser copiado por inteiro e restaurado depois.
///
/// O store de savepoints e o slot transitório de `request` se apoiam
/// apenas nesta interface.
pub trait Checkpointable {
    /// Cópia profunda e imutável do estado mutável
    type Snapshot: Clone + Debug + PartialEq;

    /// Captura o estado atual
    fn snapshot(&self) -> Self::Snapshot;

    /// Substitui o estado atual pela cópia. Falha sem mutar se a cópia
    /// não tiver as dimensões deste estado.
    fn restore(&mut self, snapshot: &Self::Snapshot) -> LedgerResult<()>;
}
