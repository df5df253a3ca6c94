//! # 🏦 banker-core — Ledger de Alocação Livre de Deadlock
//!
//! Implementa o estado do ledger do algoritmo do banqueiro, o teste de
//! segurança e as transições de requisição/liberação. Cada consumidor
//! declara sua demanda máxima; cada requisição só é concedida se o estado
//! resultante for comprovadamente seguro.
//!
//! ## Computational Complexity
//!
//! **Safety check — O(C² · R):**
//! - Até C rodadas, cada uma varrendo até C consumidores × R recursos
//!
//! **Request — O(C² · R):**
//! - Validação O(R), snapshot transitório O(C · R), safety check
//!
//! **Release — O(R):**
//! - Sem nova verificação de segurança
//!
//! ## Arquitetura
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │         LedgerState                             │
//! │  ┌───────────────────────────────────────────┐  │
//! │  │  Available | Maximum | Allocation | Need  │  │
//! │  └───────────────────────────────────────────┘  │
//! │  ┌───────────────────────────────────────────┐  │
//! │  │  Request / Release Transitions            │  │
//! │  │  (snapshot → mutate → verify → commit)    │  │
//! │  └───────────────────────────────────────────┘  │
//! │  ┌───────────────────────────────────────────┐  │
//! │  │  Safety Checker (pure)                    │  │
//! │  └───────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! ## Exemplo
//!
//! ```
//! use banker_core::prelude::*;
//!
//! let maximum = Matrix::from_rows(&[vec![8], vec![6]], 1)?;
//! let mut ledger = LedgerState::new(maximum, vec![10])?;
//!
//! let decision = ledger.request(0, &[4])?;
//! assert_eq!(decision.outcome, RequestOutcome::Granted);
//! assert!(is_safe(&ledger).is_safe());
//! # Ok::<(), banker_core::LedgerError>(())
//! ```

pub mod config;
pub mod error;
pub mod matrix;
pub mod persist;
pub mod report;
pub mod safety;
pub mod state;
pub mod stats;
pub mod traits;
pub mod transition;

pub use config::LedgerConfig;
pub use error::{LedgerError, LedgerResult};
pub use matrix::{Matrix, Units};
pub use persist::{
    decode_state, encode_state, load_maximum_claims, load_state, parse_maximum_claims, save_state,
};
pub use report::ResourceReport;
pub use safety::{
    DeadlockDiagnosis, ResourceHolders, SafetyVerdict, Shortage, check_safety, diagnose, is_safe,
};
pub use state::{LedgerSnapshot, LedgerState, NO_DENIAL_YET};
pub use stats::SessionStats;
pub use traits::Checkpointable;
pub use transition::{PreviewOutcome, RequestDecision, RequestOutcome};

/// Prelude com os tipos mais usados
pub mod prelude {
    pub use crate::{
        Checkpointable, LedgerConfig, LedgerError, LedgerResult, LedgerSnapshot, LedgerState,
        Matrix, PreviewOutcome, RequestDecision, RequestOutcome, SafetyVerdict, Units, is_safe,
    };
}
