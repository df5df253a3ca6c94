//! Verificação de segurança (algoritmo do banqueiro)
//!
//! ## Algoritmo
//!
//! ```text
//! work     := Available
//! finished := [false; C]
//! loop:
//!     i := primeiro consumidor não terminado com Need[i] ≤ work
//!     se não existe: pare
//!     finished[i] := true; sequence.push(i); work += Allocation[i]
//! ```
//!
//! A busca recomeça do índice 0 após cada sucesso, o que torna a
//! sequência determinística (menor índice primeiro). Custo O(C² · R).
//! Nenhuma função deste módulo altera o ledger.

use serde::{Deserialize, Serialize};

use crate::matrix::{Matrix, Units};
use crate::state::LedgerState;

/// Resultado do teste de segurança
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SafetyVerdict {
    /// Todos os consumidores podem terminar nesta ordem
    Safe { sequence: Vec<usize> },
    /// Nenhum progresso possível para estes consumidores
    Unsafe { blocked: Vec<usize> },
}

impl SafetyVerdict {
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Safe { .. })
    }

    /// Sequência segura, se o estado for seguro
    pub fn sequence(&self) -> Option<&[usize]> {
        match self {
            Self::Safe { sequence } => Some(sequence),
            Self::Unsafe { .. } => None,
        }
    }

    /// Consumidores bloqueados (vazio se seguro)
    pub fn blocked(&self) -> &[usize] {
        match self {
            Self::Safe { .. } => &[],
            Self::Unsafe { blocked } => blocked,
        }
    }
}

/// Testa segurança sobre as estruturas fornecidas
pub fn check_safety(available: &[Units], allocation: &Matrix, need: &Matrix) -> SafetyVerdict {
    let consumers = need.rows();
    let mut work = available.to_vec();
    let mut finished = vec![false; consumers];
    let mut sequence = Vec::with_capacity(consumers);

    while let Some(i) =
        (0..consumers).find(|&i| !finished[i] && fits_within(need.row(i), &work))
    {
        finished[i] = true;
        sequence.push(i);
        for (w, held) in work.iter_mut().zip(allocation.row(i)) {
            *w = w.saturating_add(*held);
        }
    }

    if sequence.len() == consumers {
        SafetyVerdict::Safe { sequence }
    } else {
        let blocked = (0..consumers).filter(|&i| !finished[i]).collect();
        SafetyVerdict::Unsafe { blocked }
    }
}

/// Testa segurança do estado atual do ledger
pub fn is_safe(state: &LedgerState) -> SafetyVerdict {
    check_safety(state.available(), state.allocation(), state.need())
}

fn fits_within(need: &[Units], work: &[Units]) -> bool {
    need.iter().zip(work).all(|(n, w)| n <= w)
}

/// Recurso que um consumidor bloqueado não consegue obter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shortage {
    pub consumer: usize,
    /// `(recurso, need)` para cada `Need[i][j] > Available[j]`
    pub lacking: Vec<(usize, Units)>,
}

/// Detentores de um tipo de recurso esgotado
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceHolders {
    pub resource: usize,
    /// `(consumidor, unidades)` para cada `Allocation[i][j] > 0`
    pub holders: Vec<(usize, Units)>,
}

/// Diagnóstico de um estado inseguro. Só para relatório; não participa
/// da decisão de segurança.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeadlockDiagnosis {
    pub blocked: Vec<usize>,
    pub shortages: Vec<Shortage>,
    pub holders: Vec<ResourceHolders>,
}

/// Monta o diagnóstico para os consumidores bloqueados
pub fn diagnose(state: &LedgerState, blocked: &[usize]) -> DeadlockDiagnosis {
    let available = state.available();
    let need = state.need();
    let allocation = state.allocation();

    let shortages = blocked
        .iter()
        .map(|&consumer| Shortage {
            consumer,
            lacking: need
                .row(consumer)
                .iter()
                .zip(available)
                .enumerate()
                .filter(|(_, (n, a))| n > a)
                .map(|(j, (&n, _))| (j, n))
                .collect(),
        })
        .collect();

    let holders = available
        .iter()
        .enumerate()
        .filter(|(_, units)| **units == 0)
        .map(|(resource, _)| ResourceHolders {
            resource,
            holders: (0..state.consumers())
                .filter_map(|i| {
                    let held = allocation[(i, resource)];
                    (held > 0).then_some((i, held))
                })
                .collect(),
        })
        .collect();

    DeadlockDiagnosis {
        blocked: blocked.to_vec(),
        shortages,
        holders,
    }
}
