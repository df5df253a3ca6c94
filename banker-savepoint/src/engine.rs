//! Engine do banqueiro: ledger + store de savepoints

use std::path::Path;

use banker_core::prelude::*;
use banker_core::{ResourceReport, persist, safety};
use tracing::{debug, info, warn};

use crate::diff::{Comparison, StateDiff};
use crate::error::{SavepointError, SavepointResult};
use crate::store::SavepointStore;

/// Sessão do algoritmo do banqueiro.
///
/// Dona exclusiva do ledger e do store. Colaboradores leem resultados e
/// acessores; nunca recebem as matrizes mutáveis.
#[derive(Debug, Clone)]
pub struct Banker {
    ledger: LedgerState,
    store: SavepointStore,
    config: LedgerConfig,
}

impl Banker {
    /// Cria engine com configuração derivada das dimensões de `maximum`
    pub fn new(maximum: Matrix, available: Vec<Units>) -> SavepointResult<Self> {
        let config = LedgerConfig::default().with_dimensions(maximum.rows(), maximum.cols());
        Self::with_config(maximum, available, config)
    }

    /// Cria com configuração customizada. As dimensões precisam bater.
    pub fn with_config(
        maximum: Matrix,
        available: Vec<Units>,
        config: LedgerConfig,
    ) -> SavepointResult<Self> {
        config.validate()?;
        if maximum.rows() != config.consumers {
            return Err(LedgerError::DimensionMismatch {
                expected: config.consumers,
                found: maximum.rows(),
            }
            .into());
        }
        if maximum.cols() != config.resources {
            return Err(LedgerError::DimensionMismatch {
                expected: config.resources,
                found: maximum.cols(),
            }
            .into());
        }

        let ledger = LedgerState::new(maximum, available)?;
        let store = SavepointStore::new(ledger.snapshot());
        info!(
            consumers = ledger.consumers(),
            resources = ledger.resources(),
            "ledger initialized"
        );

        Ok(Self { ledger, store, config })
    }

    /// Carrega claims máximos de arquivo CSV com as dimensões da configuração
    pub fn from_claims_file(
        path: impl AsRef<Path>,
        available: Vec<Units>,
        config: LedgerConfig,
    ) -> SavepointResult<Self> {
        let maximum = persist::load_maximum_claims(path, config.consumers, config.resources)?;
        Self::with_config(maximum, available, config)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Leitura
    // ═══════════════════════════════════════════════════════════════════

    /// Ledger somente leitura
    pub fn ledger(&self) -> &LedgerState {
        &self.ledger
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn available(&self) -> &[Units] {
        self.ledger.available()
    }

    pub fn maximum(&self) -> &Matrix {
        self.ledger.maximum()
    }

    pub fn allocation(&self) -> &Matrix {
        self.ledger.allocation()
    }

    pub fn need(&self) -> &Matrix {
        self.ledger.need()
    }

    pub fn last_denial_reason(&self) -> &str {
        self.ledger.last_denial_reason()
    }

    pub fn last_active_consumer(&self) -> Option<usize> {
        self.ledger.last_active_consumer()
    }

    /// Teste de segurança do estado atual
    pub fn is_safe(&self) -> SafetyVerdict {
        is_safe(&self.ledger)
    }

    /// Sequência segura do estado atual, se houver
    pub fn safe_sequence(&self) -> Option<Vec<usize>> {
        match self.is_safe() {
            SafetyVerdict::Safe { sequence } => Some(sequence),
            SafetyVerdict::Unsafe { .. } => None,
        }
    }

    /// Diagnóstico do estado atual, se inseguro
    pub fn diagnose(&self) -> Option<safety::DeadlockDiagnosis> {
        match self.is_safe() {
            SafetyVerdict::Safe { .. } => None,
            SafetyVerdict::Unsafe { blocked } => Some(safety::diagnose(&self.ledger, &blocked)),
        }
    }

    pub fn report(&self) -> ResourceReport {
        self.ledger.report()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Transições
    // ═══════════════════════════════════════════════════════════════════

    /// Requisita unidades. Um `DeniedUnsafe` não grava nada no store; o
    /// chamador decide se salva o estado com `config().deadlock_savepoint_label`.
    pub fn request(&mut self, consumer: usize, request: &[Units]) -> SavepointResult<RequestDecision> {
        let decision = self.ledger.request(consumer, request)?;
        if self.config.show_safe_sequence {
            if let Some(sequence) = &decision.safe_sequence {
                info!(consumer, ?sequence, "safe sequence");
            }
        }
        Ok(decision)
    }

    /// Libera unidades
    pub fn release(&mut self, consumer: usize, release: &[Units]) -> SavepointResult<()> {
        self.ledger.release(consumer, release)?;
        Ok(())
    }

    pub fn would_grant_request(&self, consumer: usize, request: &[Units]) -> SavepointResult<bool> {
        Ok(self.ledger.would_grant_request(consumer, request)?)
    }

    pub fn simulate_sequence(&self, consumer: usize, request: &[Units]) -> SavepointResult<Vec<usize>> {
        Ok(self.ledger.simulate_sequence(consumer, request)?)
    }

    pub fn preview(&self, consumer: usize, request: &[Units]) -> SavepointResult<PreviewOutcome> {
        Ok(self.ledger.preview(consumer, request)?)
    }

    /// Alterna a exibição da sequência segura. Retorna o novo valor.
    pub fn toggle_safe_sequence(&mut self) -> bool {
        self.config.show_safe_sequence = !self.config.show_safe_sequence;
        self.config.show_safe_sequence
    }

    pub fn is_safe_sequence_enabled(&self) -> bool {
        self.config.show_safe_sequence
    }

    // ═══════════════════════════════════════════════════════════════════
    // Checkpoints
    // ═══════════════════════════════════════════════════════════════════

    /// Volta ao baseline capturado na inicialização
    pub fn reset(&mut self) -> SavepointResult<()> {
        self.ledger.restore(self.store.baseline())?;
        self.ledger.clear_activity();
        info!("ledger reset to baseline");
        Ok(())
    }

    /// Sobrescreve o slot de undo com o estado atual
    pub fn checkpoint(&mut self) {
        self.store.set_undo(self.ledger.snapshot());
        info!("manual snapshot saved");
    }

    /// Restaura o slot de undo. Falha sem mutar se nunca houve checkpoint.
    pub fn undo(&mut self) -> SavepointResult<()> {
        let Some(snapshot) = self.store.undo() else {
            warn!("undo failed: no snapshot to restore");
            return Err(SavepointError::NoUndoCheckpoint);
        };
        self.ledger.restore(snapshot)?;
        self.ledger.clear_activity();
        info!("manual snapshot restored");
        Ok(())
    }

    /// Salva (ou substitui) um savepoint nomeado
    pub fn save(&mut self, label: &str) -> SavepointResult<()> {
        let label = normalize_label(label);
        if label.is_empty() || label.chars().any(char::is_whitespace) {
            return Err(SavepointError::InvalidLabel(label.to_string()));
        }

        let replaced = self.store.upsert(label, self.ledger.snapshot());
        info!(label, replaced, "savepoint created");
        Ok(())
    }

    /// Restaura um savepoint nomeado. Falha sem mutar se não existir.
    pub fn rollback_to(&mut self, label: &str) -> SavepointResult<()> {
        let label = normalize_label(label);
        let Some(savepoint) = self.store.get(label) else {
            warn!(label, "rollback failed: no such savepoint");
            return Err(SavepointError::NotFound(label.to_string()));
        };
        self.ledger.restore(&savepoint.snapshot)?;
        self.ledger.clear_activity();
        info!(label, "reverted to savepoint");
        Ok(())
    }

    /// Todas as células que diferem do savepoint
    pub fn diff(&self, label: &str) -> SavepointResult<StateDiff> {
        let label = normalize_label(label);
        let savepoint = self
            .store
            .get(label)
            .ok_or_else(|| SavepointError::NotFound(label.to_string()))?;
        let diff = StateDiff::between(label, &self.ledger.snapshot(), &savepoint.snapshot);
        debug!(label, differences = diff.len(), "diff computed");
        Ok(diff)
    }

    /// Como `diff`, mas distingue "sem mudanças" explicitamente
    pub fn compare(&self, label: &str) -> SavepointResult<Comparison> {
        self.diff(label).map(Comparison::from)
    }

    /// Rótulos em ordem de inserção
    pub fn labels(&self) -> Vec<&str> {
        self.store.labels()
    }

    pub fn has_savepoint(&self, label: &str) -> bool {
        self.store.contains(normalize_label(label))
    }

    pub fn savepoint_count(&self) -> usize {
        self.store.count()
    }

    pub fn has_undo_checkpoint(&self) -> bool {
        self.store.has_undo()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Persistência
    // ═══════════════════════════════════════════════════════════════════

    /// Grava Available, Maximum e Allocation
    pub fn save_state(&self, path: impl AsRef<Path>) -> SavepointResult<()> {
        persist::save_state(&self.ledger, path)?;
        Ok(())
    }

    /// Substitui Available e Allocation pelo conteúdo do arquivo. O
    /// `Maximum` gravado precisa ser idêntico ao da sessão; baseline e
    /// savepoints não mudam.
    pub fn load_state(&mut self, path: impl AsRef<Path>) -> SavepointResult<()> {
        let loaded = persist::load_state(path)?;
        if loaded.consumers() != self.ledger.consumers() {
            return Err(LedgerError::DimensionMismatch {
                expected: self.ledger.consumers(),
                found: loaded.consumers(),
            }
            .into());
        }
        if loaded.resources() != self.ledger.resources() {
            return Err(LedgerError::DimensionMismatch {
                expected: self.ledger.resources(),
                found: loaded.resources(),
            }
            .into());
        }
        if loaded.maximum() != self.ledger.maximum() {
            warn!("load failed: maximum claims differ from the session's");
            return Err(LedgerError::InvalidInitialState(
                "maximum claims differ from the session's".into(),
            )
            .into());
        }

        self.ledger = loaded;
        info!("ledger state loaded");
        Ok(())
    }
}

/// Rótulos são comparados sem espaços nas pontas
fn normalize_label(label: &str) -> &str {
    label.trim()
}
