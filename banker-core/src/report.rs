//! Relatório agregado de recursos

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::matrix::Units;

/// Somatórios por tipo de recurso
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReport {
    /// Unidades livres
    pub available: Vec<Units>,
    /// `Σᵢ Allocation[i][j]`
    pub allocated_total: Vec<Units>,
    /// `Σᵢ Need[i][j]`
    pub remaining_need: Vec<Units>,
}

impl ResourceReport {
    /// Oferta total (`allocated_total + available`)
    pub fn total_supply(&self) -> Vec<Units> {
        self.available
            .iter()
            .zip(&self.allocated_total)
            .map(|(a, b)| a + b)
            .collect()
    }

    /// Exporta como JSON
    pub fn to_json(&self) -> LedgerResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LedgerError::Serialization(format!("Failed to serialize report: {}", e)))
    }
}
