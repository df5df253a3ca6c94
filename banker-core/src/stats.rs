//! Estatísticas de sessão
//!
//! Pertencem ao chamador (CLI, relatórios). O ledger nunca as toca; quem
//! chama registra cada resultado depois de recebê-lo.

use serde::{Deserialize, Serialize};

use crate::transition::{PreviewOutcome, RequestDecision, RequestOutcome};

/// Contadores de uma sessão interativa
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_requests: u64,
    pub total_releases: u64,
    pub granted: u64,
    pub denied_need: u64,
    pub denied_avail: u64,
    pub denied_unsafe: u64,
    /// Estados inseguros detectados (requisições e prévias)
    pub deadlocks_detected: u64,
    pub previews: u64,
    pub previews_denied: u64,
    pub previews_unsafe: u64,
    pub previews_safe: u64,
    /// Requisições por consumidor
    pub requests_by_consumer: Vec<u64>,
    /// Liberações por consumidor
    pub releases_by_consumer: Vec<u64>,
}

impl SessionStats {
    /// Cria contadores para `consumers` consumidores
    pub fn new(consumers: usize) -> Self {
        Self {
            requests_by_consumer: vec![0; consumers],
            releases_by_consumer: vec![0; consumers],
            ..Self::default()
        }
    }

    /// Registra o resultado de uma requisição
    pub fn record_request(&mut self, consumer: usize, decision: &RequestDecision) {
        self.total_requests += 1;
        bump(&mut self.requests_by_consumer, consumer);

        match decision.outcome {
            RequestOutcome::Granted => self.granted += 1,
            RequestOutcome::DeniedNeed => self.denied_need += 1,
            RequestOutcome::DeniedAvail => self.denied_avail += 1,
            RequestOutcome::DeniedUnsafe => {
                self.denied_unsafe += 1;
                self.deadlocks_detected += 1;
            }
        }
    }

    /// Registra uma liberação bem-sucedida
    pub fn record_release(&mut self, consumer: usize) {
        self.total_releases += 1;
        bump(&mut self.releases_by_consumer, consumer);
    }

    /// Registra o resultado de uma prévia
    pub fn record_preview(&mut self, outcome: &PreviewOutcome) {
        self.previews += 1;
        match outcome {
            PreviewOutcome::Denied(_) => self.previews_denied += 1,
            PreviewOutcome::Unsafe => {
                self.previews_unsafe += 1;
                self.deadlocks_detected += 1;
            }
            PreviewOutcome::Safe { .. } => self.previews_safe += 1,
        }
    }

    /// Total de requisições negadas
    pub fn total_denied(&self) -> u64 {
        self.denied_need + self.denied_avail + self.denied_unsafe
    }
}

fn bump(counts: &mut Vec<u64>, consumer: usize) {
    if consumer >= counts.len() {
        counts.resize(consumer + 1, 0);
    }
    counts[consumer] += 1;
}
