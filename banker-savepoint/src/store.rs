//! Storage de savepoints e gerenciamento

use banker_core::LedgerSnapshot;
use serde::{Deserialize, Serialize};

/// Savepoint rotulado
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Savepoint {
    /// Rótulo escolhido pelo usuário
    pub label: String,
    /// Estado salvo
    pub snapshot: LedgerSnapshot,
    /// Timestamp de criação
    pub timestamp: u64,
}

impl Savepoint {
    /// Cria novo savepoint
    pub fn new(label: impl Into<String>, snapshot: LedgerSnapshot) -> Self {
        Self {
            label: label.into(),
            snapshot,
            timestamp: now_secs(),
        }
    }

    /// Idade do savepoint em segundos
    pub fn age(&self) -> u64 {
        now_secs().saturating_sub(self.timestamp)
    }
}

fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Os três mecanismos de checkpoint acessíveis ao usuário.
///
/// - baseline de reset: capturado uma vez, nunca sobrescrito
/// - slot de undo: um só, sobrescrito a cada `checkpoint`
/// - savepoints nomeados: sem limite, sem remoção automática, em ordem de
///   inserção; reusar um rótulo substitui o estado na mesma posição
#[derive(Debug, Clone)]
pub struct SavepointStore {
    baseline: LedgerSnapshot,
    undo: Option<Savepoint>,
    named: Vec<Savepoint>,
}

impl SavepointStore {
    /// Cria store com o baseline de reset
    pub fn new(baseline: LedgerSnapshot) -> Self {
        Self {
            baseline,
            undo: None,
            named: Vec::new(),
        }
    }

    /// Estado capturado logo após a carga dos claims máximos
    pub fn baseline(&self) -> &LedgerSnapshot {
        &self.baseline
    }

    /// Sobrescreve o slot de undo
    pub fn set_undo(&mut self, snapshot: LedgerSnapshot) {
        self.undo = Some(Savepoint::new("undo", snapshot));
    }

    /// Conteúdo do slot de undo
    pub fn undo(&self) -> Option<&LedgerSnapshot> {
        self.undo.as_ref().map(|s| &s.snapshot)
    }

    pub fn has_undo(&self) -> bool {
        self.undo.is_some()
    }

    /// Insere ou substitui um savepoint. Retorna `true` se substituiu.
    pub fn upsert(&mut self, label: &str, snapshot: LedgerSnapshot) -> bool {
        match self.named.iter_mut().find(|s| s.label == label) {
            Some(existing) => {
                *existing = Savepoint::new(label, snapshot);
                true
            }
            None => {
                self.named.push(Savepoint::new(label, snapshot));
                false
            }
        }
    }

    /// Obtém savepoint
    pub fn get(&self, label: &str) -> Option<&Savepoint> {
        self.named.iter().find(|s| s.label == label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    /// Rótulos em ordem de inserção
    pub fn labels(&self) -> Vec<&str> {
        self.named.iter().map(|s| s.label.as_str()).collect()
    }

    /// Número de savepoints nomeados
    pub fn count(&self) -> usize {
        self.named.len()
    }

    /// Itera em ordem de inserção
    pub fn iter(&self) -> impl Iterator<Item = &Savepoint> {
        self.named.iter()
    }
}
