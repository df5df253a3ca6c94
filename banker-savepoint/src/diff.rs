//! Comparação célula a célula entre o estado atual e um savepoint

use banker_core::{LedgerSnapshot, Matrix, Units};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SavepointError, SavepointResult};

/// Estrutura do ledger onde a diferença ocorreu
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerSection {
    Allocation,
    Need,
    Available,
}

impl fmt::Display for LedgerSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Allocation => "Allocation",
            Self::Need => "Need",
            Self::Available => "Available",
        };
        write!(f, "{name}")
    }
}

/// Uma célula divergente
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellDiff {
    pub section: LedgerSection,
    /// `None` para `Available`
    pub consumer: Option<usize>,
    pub resource: usize,
    pub current: Units,
    pub stored: Units,
}

impl fmt::Display for CellDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.consumer {
            Some(i) => write!(
                f,
                "{} P{} R{}: now {}, was {}",
                self.section, i, self.resource, self.current, self.stored
            ),
            None => write!(
                f,
                "{} R{}: now {}, was {}",
                self.section, self.resource, self.current, self.stored
            ),
        }
    }
}

/// Todas as diferenças contra um savepoint.
///
/// Ordem: Allocation, depois Need, depois Available; linha-maior dentro de
/// cada matriz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDiff {
    pub label: String,
    pub cells: Vec<CellDiff>,
}

impl StateDiff {
    /// Compara `current` com `stored`
    pub fn between(label: &str, current: &LedgerSnapshot, stored: &LedgerSnapshot) -> Self {
        let mut cells = Vec::new();
        diff_matrix(&mut cells, LedgerSection::Allocation, &current.allocation, &stored.allocation);
        diff_matrix(&mut cells, LedgerSection::Need, &current.need, &stored.need);

        for (resource, (&now, &was)) in current.available.iter().zip(&stored.available).enumerate() {
            if now != was {
                cells.push(CellDiff {
                    section: LedgerSection::Available,
                    consumer: None,
                    resource,
                    current: now,
                    stored: was,
                });
            }
        }

        Self {
            label: label.to_string(),
            cells,
        }
    }

    /// Nenhuma diferença?
    pub fn is_clean(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Diferenças de uma única seção
    pub fn section(&self, section: LedgerSection) -> impl Iterator<Item = &CellDiff> {
        self.cells.iter().filter(move |c| c.section == section)
    }

    /// Exporta como JSON
    pub fn to_json(&self) -> SavepointResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SavepointError::Serialization(e.to_string()))
    }
}

fn diff_matrix(out: &mut Vec<CellDiff>, section: LedgerSection, current: &Matrix, stored: &Matrix) {
    for (consumer, (now_row, was_row)) in current.iter_rows().zip(stored.iter_rows()).enumerate() {
        for (resource, (&now, &was)) in now_row.iter().zip(was_row).enumerate() {
            if now != was {
                out.push(CellDiff {
                    section,
                    consumer: Some(consumer),
                    resource,
                    current: now,
                    stored: was,
                });
            }
        }
    }
}

/// Resultado de `compare`: sem mudanças é um desfecho próprio, distinto
/// de "savepoint inexistente" (que é erro)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    Unchanged,
    Changed(StateDiff),
}

impl From<StateDiff> for Comparison {
    fn from(diff: StateDiff) -> Self {
        if diff.is_clean() {
            Self::Unchanged
        } else {
            Self::Changed(diff)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(available: Vec<Units>, allocation: &[Vec<Units>], need: &[Vec<Units>]) -> LedgerSnapshot {
        LedgerSnapshot {
            available,
            allocation: Matrix::from_rows(allocation, 2).unwrap(),
            need: Matrix::from_rows(need, 2).unwrap(),
        }
    }

    #[test]
    fn test_identical_is_clean() {
        let a = snapshot(vec![1, 1], &[vec![0, 1]], &[vec![2, 0]]);
        let diff = StateDiff::between("x", &a, &a.clone());
        assert!(diff.is_clean());
        assert_eq!(Comparison::from(diff), Comparison::Unchanged);
    }

    #[test]
    fn test_reports_every_cell_in_order() {
        let stored = snapshot(vec![3, 2], &[vec![0, 0]], &[vec![2, 2]]);
        let current = snapshot(vec![2, 2], &[vec![1, 0]], &[vec![1, 2]]);

        let diff = StateDiff::between("before", &current, &stored);
        assert_eq!(diff.len(), 3);
        assert_eq!(
            diff.cells[0],
            CellDiff {
                section: LedgerSection::Allocation,
                consumer: Some(0),
                resource: 0,
                current: 1,
                stored: 0,
            }
        );
        assert_eq!(diff.cells[1].section, LedgerSection::Need);
        assert_eq!(diff.cells[2].consumer, None);
        assert_eq!(diff.section(LedgerSection::Need).count(), 1);
        assert_eq!(diff.cells[0].to_string(), "Allocation P0 R0: now 1, was 0");
        assert_eq!(diff.cells[2].to_string(), "Available R0: now 2, was 3");
    }

    #[test]
    fn test_to_json() {
        let stored = snapshot(vec![3, 2], &[vec![0, 0]], &[vec![2, 2]]);
        let current = snapshot(vec![2, 2], &[vec![1, 0]], &[vec![1, 2]]);
        let json = StateDiff::between("before", &current, &stored).to_json().unwrap();
        assert!(json.contains("\"label\": \"before\""));
    }
}
