//! Estado do ledger: Available, Maximum, Allocation e Need
//!
//! Invariante mantido após toda operação concluída, para todo consumidor `i`
//! e tipo de recurso `j`:
//!
//! ```text
//! 0 ≤ Allocation[i][j] ≤ Maximum[i][j]
//! Need[i][j] = Maximum[i][j] − Allocation[i][j]
//! Available[j] ≥ 0
//! Σᵢ Allocation[i][j] + Available[j] = oferta total de j
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::matrix::{Matrix, Units};
use crate::report::ResourceReport;
use crate::traits::Checkpointable;

/// Texto devolvido quando nenhuma requisição foi negada ainda
pub const NO_DENIAL_YET: &str = "No request has been denied yet.";

/// Cópia profunda de `(Available, Allocation, Need)`.
///
/// `Maximum` fica de fora: é imutável durante a sessão.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub available: Vec<Units>,
    pub allocation: Matrix,
    pub need: Matrix,
}

impl LedgerSnapshot {
    /// Número de consumidores
    pub fn consumers(&self) -> usize {
        self.allocation.rows()
    }

    /// Número de tipos de recurso
    pub fn resources(&self) -> usize {
        self.available.len()
    }
}

/// Estado completo do ledger de alocação
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerState {
    available: Vec<Units>,
    maximum: Matrix,
    allocation: Matrix,
    need: Matrix,
    last_denial_reason: Option<String>,
    last_active_consumer: Option<usize>,
}

impl LedgerState {
    /// Cria ledger com alocação zerada e `Need = Maximum`
    pub fn new(maximum: Matrix, available: Vec<Units>) -> LedgerResult<Self> {
        let allocation = Matrix::zeros(maximum.rows(), maximum.cols());
        Self::from_parts(available, maximum, allocation)
    }

    /// Reconstrói um ledger a partir de suas partes persistidas.
    ///
    /// `Need` é sempre derivado, nunca recebido.
    pub fn from_parts(
        available: Vec<Units>,
        maximum: Matrix,
        allocation: Matrix,
    ) -> LedgerResult<Self> {
        if maximum.rows() == 0 || maximum.cols() == 0 {
            return Err(LedgerError::InvalidInitialState(
                "ledger needs at least one consumer and one resource type".into(),
            ));
        }
        if available.len() != maximum.cols() {
            return Err(LedgerError::DimensionMismatch {
                expected: maximum.cols(),
                found: available.len(),
            });
        }
        if !allocation.same_shape(&maximum) {
            return Err(LedgerError::DimensionMismatch {
                expected: maximum.cells().len(),
                found: allocation.cells().len(),
            });
        }

        let need = Matrix::zeros(maximum.rows(), maximum.cols());
        let mut state = Self {
            available,
            maximum,
            allocation,
            need,
            last_denial_reason: None,
            last_active_consumer: None,
        };
        state
            .check_bounds()
            .and_then(|()| state.check_supply())
            .map_err(|e| LedgerError::InvalidInitialState(e.to_string()))?;
        state.derive_need();

        Ok(state)
    }

    /// Número de consumidores (C)
    pub fn consumers(&self) -> usize {
        self.maximum.rows()
    }

    /// Número de tipos de recurso (R)
    pub fn resources(&self) -> usize {
        self.maximum.cols()
    }

    pub fn available(&self) -> &[Units] {
        &self.available
    }

    pub fn maximum(&self) -> &Matrix {
        &self.maximum
    }

    pub fn allocation(&self) -> &Matrix {
        &self.allocation
    }

    pub fn need(&self) -> &Matrix {
        &self.need
    }

    /// Recalcula `Need` a partir de `Maximum` e `Allocation`
    pub fn derive_need(&mut self) {
        for i in 0..self.consumers() {
            for j in 0..self.resources() {
                self.need[(i, j)] = self.maximum[(i, j)] - self.allocation[(i, j)];
            }
        }
    }

    /// Motivo da última negação, ou [`NO_DENIAL_YET`]
    pub fn last_denial_reason(&self) -> &str {
        self.last_denial_reason.as_deref().unwrap_or(NO_DENIAL_YET)
    }

    /// Motivo da última negação, se houver
    pub fn denial_reason(&self) -> Option<&str> {
        self.last_denial_reason.as_deref()
    }

    /// Último consumidor que teve uma requisição concedida
    pub fn last_active_consumer(&self) -> Option<usize> {
        self.last_active_consumer
    }

    /// Esquece consumidor ativo e motivo de negação
    pub fn clear_activity(&mut self) {
        self.last_active_consumer = None;
        self.last_denial_reason = None;
    }

    pub(crate) fn record_denial(&mut self, reason: &str) {
        self.last_denial_reason = Some(reason.to_string());
    }

    pub(crate) fn record_grant(&mut self, consumer: usize) {
        self.last_active_consumer = Some(consumer);
        self.last_denial_reason = None;
    }

    pub(crate) fn available_mut(&mut self) -> &mut [Units] {
        &mut self.available
    }

    pub(crate) fn allocation_mut(&mut self) -> &mut Matrix {
        &mut self.allocation
    }

    pub(crate) fn need_mut(&mut self) -> &mut Matrix {
        &mut self.need
    }

    /// Oferta total por tipo de recurso (`Σ Allocation + Available`)
    pub fn total_supply(&self) -> Vec<Units> {
        (0..self.resources())
            .map(|j| self.allocation.column_sum(j) + self.available[j])
            .collect()
    }

    /// Somatórios por tipo de recurso para relatórios
    pub fn report(&self) -> ResourceReport {
        ResourceReport {
            available: self.available.clone(),
            allocated_total: (0..self.resources())
                .map(|j| self.allocation.column_sum(j))
                .collect(),
            remaining_need: (0..self.resources())
                .map(|j| self.need.column_sum(j))
                .collect(),
        }
    }

    /// Verifica limites de alocação, need derivado e disponibilidade
    pub fn check_invariants(&self) -> LedgerResult<()> {
        self.check_bounds()?;
        for i in 0..self.consumers() {
            for j in 0..self.resources() {
                if self.need[(i, j)] != self.maximum[(i, j)] - self.allocation[(i, j)] {
                    return Err(LedgerError::InvalidInitialState(format!(
                        "need P{i} R{j} out of sync with maximum and allocation"
                    )));
                }
            }
        }
        Ok(())
    }

    /// `Available ≥ 0` e `0 ≤ Allocation ≤ Maximum`
    fn check_bounds(&self) -> LedgerResult<()> {
        for (j, &units) in self.available.iter().enumerate() {
            if units < 0 {
                return Err(LedgerError::NegativeQuantity { resource: j, value: units });
            }
        }

        for i in 0..self.consumers() {
            for j in 0..self.resources() {
                let max = self.maximum[(i, j)];
                let held = self.allocation[(i, j)];
                if max < 0 {
                    return Err(LedgerError::NegativeQuantity { resource: j, value: max });
                }
                if held < 0 || held > max {
                    return Err(LedgerError::InvalidInitialState(format!(
                        "allocation P{i} R{j} = {held} outside 0..={max}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// A oferta total e a soma dos claims de cada recurso cabem em `Units`
    fn check_supply(&self) -> LedgerResult<()> {
        for (j, &units) in self.available.iter().enumerate() {
            if self.allocation.checked_column_sum(j, units).is_none() {
                return Err(LedgerError::InvalidInitialState(format!(
                    "total supply of R{j} overflows"
                )));
            }
            if self.maximum.checked_column_sum(j, 0).is_none() {
                return Err(LedgerError::InvalidInitialState(format!(
                    "maximum claims of R{j} overflow"
                )));
            }
        }
        Ok(())
    }

    /// Rejeita índices de consumidor fora de `0..C`
    pub fn validate_consumer(&self, consumer: usize) -> LedgerResult<()> {
        if consumer < self.consumers() {
            Ok(())
        } else {
            Err(LedgerError::InvalidConsumer {
                consumer,
                consumers: self.consumers(),
            })
        }
    }

    /// Rejeita vetores com tamanho ≠ R ou com quantidades negativas
    pub fn validate_quantities(&self, quantities: &[Units]) -> LedgerResult<()> {
        if quantities.len() != self.resources() {
            return Err(LedgerError::DimensionMismatch {
                expected: self.resources(),
                found: quantities.len(),
            });
        }
        match quantities.iter().position(|&q| q < 0) {
            Some(resource) => Err(LedgerError::NegativeQuantity {
                resource,
                value: quantities[resource],
            }),
            None => Ok(()),
        }
    }
}

impl Checkpointable for LedgerState {
    type Snapshot = LedgerSnapshot;

    fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            available: self.available.clone(),
            allocation: self.allocation.clone(),
            need: self.need.clone(),
        }
    }

    fn restore(&mut self, snapshot: &LedgerSnapshot) -> LedgerResult<()> {
        if snapshot.available.len() != self.resources() {
            return Err(LedgerError::DimensionMismatch {
                expected: self.resources(),
                found: snapshot.available.len(),
            });
        }
        if !snapshot.allocation.same_shape(&self.maximum) || !snapshot.need.same_shape(&self.maximum) {
            return Err(LedgerError::DimensionMismatch {
                expected: self.maximum.cells().len(),
                found: snapshot.allocation.cells().len(),
            });
        }

        let mut scratch = self.clone();
        scratch.available.clone_from(&snapshot.available);
        scratch.allocation.clone_from(&snapshot.allocation);
        scratch.need.clone_from(&snapshot.need);
        scratch.check_invariants()?;

        *self = scratch;
        Ok(())
    }
}
