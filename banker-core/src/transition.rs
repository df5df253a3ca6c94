//! Transições de requisição e liberação
//!
//! ## Máquina de estados de uma requisição
//!
//! ```text
//! request ──► need excedido? ──sim──► DeniedNeed   (sem mutação)
//!                │não
//!                ▼
//!         disponível excedido? ──sim──► DeniedAvail (sem mutação)
//!                │não
//!                ▼
//!    snapshot transitório + alocação tentativa
//!                │
//!                ▼
//!         estado seguro? ──sim──► Granted      (alocação permanece)
//!                │não
//!                ▼
//!         restaura snapshot ──► DeniedUnsafe   (no-op observável)
//! ```
//!
//! A liberação não refaz a verificação: devolver unidades só aumenta
//! `Available` e o `Need` de quem liberou, o que nunca reduz o conjunto de
//! consumidores capazes de terminar.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::matrix::Units;
use crate::safety::{self, DeadlockDiagnosis, SafetyVerdict};
use crate::state::LedgerState;
use crate::traits::Checkpointable;

/// Código de resultado de uma requisição
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i8)]
pub enum RequestOutcome {
    Granted = 0,
    /// Excede o need declarado restante
    DeniedNeed = -1,
    /// Excede as unidades livres agora
    DeniedAvail = -2,
    /// Levaria a um estado inseguro
    DeniedUnsafe = -3,
}

impl RequestOutcome {
    /// Código numérico
    pub fn code(self) -> i8 {
        self as i8
    }

    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Granted => "GRANTED",
            Self::DeniedNeed => "DENIED_NEED",
            Self::DeniedAvail => "DENIED_AVAIL",
            Self::DeniedUnsafe => "DENIED_UNSAFE",
        }
    }

    /// Motivo legível registrado no ledger quando negado
    pub fn denial_reason(self) -> Option<&'static str> {
        match self {
            Self::Granted => None,
            Self::DeniedNeed => Some("Request denied: exceeds declared need."),
            Self::DeniedAvail => Some("Request denied: exceeds available resources."),
            Self::DeniedUnsafe => Some("Request denied: would lead to unsafe state."),
        }
    }
}

impl fmt::Display for RequestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Decisão completa de uma requisição
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDecision {
    pub outcome: RequestOutcome,
    /// Sequência segura do estado resultante (apenas `Granted`)
    pub safe_sequence: Option<Vec<usize>>,
    /// Diagnóstico do estado tentativo (apenas `DeniedUnsafe`)
    pub diagnosis: Option<DeadlockDiagnosis>,
}

impl RequestDecision {
    fn denied(outcome: RequestOutcome) -> Self {
        Self {
            outcome,
            safe_sequence: None,
            diagnosis: None,
        }
    }

    pub fn is_granted(&self) -> bool {
        self.outcome.is_granted()
    }
}

/// Resultado de uma prévia especulativa
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PreviewOutcome {
    /// Falharia antes da verificação de segurança
    Denied(RequestOutcome),
    /// Passaria nas validações mas não há sequência segura
    Unsafe,
    /// Seria concedida; sequência do estado resultante
    Safe { sequence: Vec<usize> },
}

impl LedgerState {
    /// Aplica validações de need e disponibilidade sem mutar.
    ///
    /// Retorna `Granted` se ambas passam (a segurança não é testada).
    pub fn precheck(&self, consumer: usize, request: &[Units]) -> LedgerResult<RequestOutcome> {
        self.validate_consumer(consumer)?;
        self.validate_quantities(request)?;

        let need = self.need().row(consumer);
        if request.iter().zip(need).any(|(r, n)| r > n) {
            return Ok(RequestOutcome::DeniedNeed);
        }
        if request.iter().zip(self.available()).any(|(r, a)| r > a) {
            return Ok(RequestOutcome::DeniedAvail);
        }

        Ok(RequestOutcome::Granted)
    }

    /// A requisição passaria nas duas primeiras validações?
    pub fn would_grant_request(&self, consumer: usize, request: &[Units]) -> LedgerResult<bool> {
        Ok(self.precheck(consumer, request)?.is_granted())
    }

    /// Requisita unidades para um consumidor.
    ///
    /// Erros de validação retornam `Err` sem mutação. Negações de política
    /// retornam `Ok` com o motivo registrado e o ledger intacto.
    pub fn request(&mut self, consumer: usize, request: &[Units]) -> LedgerResult<RequestDecision> {
        let outcome = self.precheck(consumer, request)?;
        if !outcome.is_granted() {
            return Ok(self.deny(consumer, RequestDecision::denied(outcome)));
        }

        let transient = self.snapshot();
        self.apply_allocation(consumer, request);

        match safety::is_safe(self) {
            SafetyVerdict::Safe { sequence } => {
                self.record_grant(consumer);
                debug!(consumer, ?request, ?sequence, "request granted");
                Ok(RequestDecision {
                    outcome: RequestOutcome::Granted,
                    safe_sequence: Some(sequence),
                    diagnosis: None,
                })
            }
            SafetyVerdict::Unsafe { blocked } => {
                let diagnosis = safety::diagnose(self, &blocked);
                self.restore(&transient)?;
                warn!(consumer, ?blocked, "tentative allocation rolled back");
                Ok(self.deny(
                    consumer,
                    RequestDecision {
                        outcome: RequestOutcome::DeniedUnsafe,
                        safe_sequence: None,
                        diagnosis: Some(diagnosis),
                    },
                ))
            }
        }
    }

    /// Devolve unidades ao pool. Sem verificação de segurança.
    pub fn release(&mut self, consumer: usize, release: &[Units]) -> LedgerResult<()> {
        self.validate_consumer(consumer)?;
        self.validate_quantities(release)?;

        let held = self.allocation().row(consumer);
        if let Some((resource, (&requested, &held))) = release
            .iter()
            .zip(held)
            .enumerate()
            .find(|(_, (r, h))| r > h)
        {
            return Err(LedgerError::ReleaseExceedsAllocation {
                consumer,
                resource,
                requested,
                held,
            });
        }

        for (j, &units) in release.iter().enumerate() {
            self.allocation_mut()[(consumer, j)] -= units;
            self.need_mut()[(consumer, j)] += units;
            self.available_mut()[j] += units;
        }
        debug!(consumer, ?release, "resources released");
        Ok(())
    }

    /// Sequência segura que resultaria da requisição, aplicada numa cópia
    /// descartável. Vazia se a requisição seria negada ou insegura.
    pub fn simulate_sequence(&self, consumer: usize, request: &[Units]) -> LedgerResult<Vec<usize>> {
        if !self.would_grant_request(consumer, request)? {
            return Ok(Vec::new());
        }

        let mut scratch = self.clone();
        scratch.apply_allocation(consumer, request);
        Ok(match safety::is_safe(&scratch) {
            SafetyVerdict::Safe { sequence } => sequence,
            SafetyVerdict::Unsafe { .. } => Vec::new(),
        })
    }

    /// Prévia de uma requisição: combina `precheck` e `simulate_sequence`
    pub fn preview(&self, consumer: usize, request: &[Units]) -> LedgerResult<PreviewOutcome> {
        let outcome = self.precheck(consumer, request)?;
        if !outcome.is_granted() {
            return Ok(PreviewOutcome::Denied(outcome));
        }

        let sequence = self.simulate_sequence(consumer, request)?;
        Ok(if sequence.is_empty() {
            PreviewOutcome::Unsafe
        } else {
            PreviewOutcome::Safe { sequence }
        })
    }

    fn apply_allocation(&mut self, consumer: usize, request: &[Units]) {
        for (j, &units) in request.iter().enumerate() {
            self.available_mut()[j] -= units;
            self.allocation_mut()[(consumer, j)] += units;
            self.need_mut()[(consumer, j)] -= units;
        }
    }

    fn deny(&mut self, consumer: usize, decision: RequestDecision) -> RequestDecision {
        if let Some(reason) = decision.outcome.denial_reason() {
            self.record_denial(reason);
            warn!(consumer, outcome = %decision.outcome, "{reason}");
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;

    /// Dois consumidores, um recurso: seguro, mas a um passo do inseguro
    fn tight() -> LedgerState {
        let maximum = Matrix::from_rows(&[vec![8], vec![6]], 1).unwrap();
        let allocation = Matrix::from_rows(&[vec![4], vec![4]], 1).unwrap();
        LedgerState::from_parts(vec![2], maximum, allocation).unwrap()
    }

    #[test]
    fn test_outcome_codes() {
        assert_eq!(RequestOutcome::Granted.code(), 0);
        assert_eq!(RequestOutcome::DeniedNeed.code(), -1);
        assert_eq!(RequestOutcome::DeniedAvail.code(), -2);
        assert_eq!(RequestOutcome::DeniedUnsafe.code(), -3);
        assert_eq!(RequestOutcome::DeniedUnsafe.to_string(), "DENIED_UNSAFE");
    }

    #[test]
    fn test_grant_mutates() {
        let mut state = tight();
        let decision = state.request(1, &[2]).unwrap();

        assert!(decision.is_granted());
        assert_eq!(decision.safe_sequence, Some(vec![1, 0]));
        assert_eq!(state.available(), &[0]);
        assert_eq!(state.allocation()[(1, 0)], 6);
        assert_eq!(state.need()[(1, 0)], 0);
        assert_eq!(state.last_active_consumer(), Some(1));
        assert_eq!(state.denial_reason(), None);
    }

    #[test]
    fn test_unsafe_rolls_back() {
        let mut state = tight();
        let before = state.snapshot();

        let decision = state.request(0, &[1]).unwrap();

        assert_eq!(decision.outcome, RequestOutcome::DeniedUnsafe);
        let diagnosis = decision.diagnosis.unwrap();
        assert_eq!(diagnosis.blocked, vec![0, 1]);
        assert_eq!(state.snapshot(), before);
        assert_eq!(
            state.last_denial_reason(),
            "Request denied: would lead to unsafe state."
        );
    }

    #[test]
    fn test_need_checked_before_available() {
        let mut state = tight();
        // excede need (6 > 4) e disponível (6 > 2)
        let decision = state.request(0, &[6]).unwrap();
        assert_eq!(decision.outcome, RequestOutcome::DeniedNeed);

        let decision = state.request(0, &[3]).unwrap();
        assert_eq!(decision.outcome, RequestOutcome::DeniedAvail);
        assert_eq!(
            state.last_denial_reason(),
            "Request denied: exceeds available resources."
        );
    }

    #[test]
    fn test_validation_errors() {
        let mut state = tight();
        let before = state.clone();

        assert!(matches!(
            state.request(2, &[1]),
            Err(LedgerError::InvalidConsumer { consumer: 2, consumers: 2 })
        ));
        assert!(matches!(
            state.request(0, &[-1]),
            Err(LedgerError::NegativeQuantity { resource: 0, value: -1 })
        ));
        assert!(matches!(
            state.request(0, &[1, 1]),
            Err(LedgerError::DimensionMismatch { expected: 1, found: 2 })
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn test_release() {
        let mut state = tight();
        state.release(0, &[3]).unwrap();

        assert_eq!(state.available(), &[5]);
        assert_eq!(state.allocation()[(0, 0)], 1);
        assert_eq!(state.need()[(0, 0)], 7);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_release_exceeding_allocation() {
        let mut state = tight();
        let before = state.clone();

        let err = state.release(1, &[5]).unwrap_err();
        assert_eq!(
            err,
            LedgerError::ReleaseExceedsAllocation {
                consumer: 1,
                resource: 0,
                requested: 5,
                held: 4,
            }
        );
        assert!(state.release(1, &[-1]).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_simulate_and_preview_do_not_mutate() {
        let state = tight();
        let before = state.clone();

        assert_eq!(state.simulate_sequence(1, &[2]).unwrap(), vec![1, 0]);
        assert!(state.simulate_sequence(0, &[1]).unwrap().is_empty());
        assert!(state.simulate_sequence(0, &[3]).unwrap().is_empty());

        assert_eq!(
            state.preview(1, &[1]).unwrap(),
            PreviewOutcome::Safe { sequence: vec![1, 0] }
        );
        assert_eq!(state.preview(0, &[1]).unwrap(), PreviewOutcome::Unsafe);
        assert_eq!(
            state.preview(0, &[5]).unwrap(),
            PreviewOutcome::Denied(RequestOutcome::DeniedNeed)
        );
        assert!(state.would_grant_request(0, &[2]).unwrap());
        assert!(!state.would_grant_request(0, &[3]).unwrap());

        assert_eq!(state, before);
    }
}
