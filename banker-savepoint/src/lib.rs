//! # 💾 banker-savepoint — Snapshots e Savepoints do Ledger
//!
//! Implementa os mecanismos de checkpoint do ledger do banqueiro e a
//! engine [`Banker`], dona de um ledger e de seu store.
//!
//! ## Computational Complexity
//!
//! **Snapshot — O(C · R):**
//! - Cópia profunda de Available, Allocation e Need
//!
//! **Savepoint lookup — O(s):**
//! - Busca linear por rótulo em ordem de inserção
//!
//! **Diff — O(C · R):**
//! - Uma passada sobre cada matriz e sobre Available
//!
//! ## Arquitetura
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │         Banker                                  │
//! │  ┌───────────────────────────────────────────┐  │
//! │  │  LedgerState (banker-core)                │  │
//! │  └───────────────────────────────────────────┘  │
//! │  ┌───────────────────────────────────────────┐  │
//! │  │  SavepointStore                           │  │
//! │  │  baseline | undo slot | named savepoints  │  │
//! │  └───────────────────────────────────────────┘  │
//! │  ┌───────────────────────────────────────────┐  │
//! │  │  Diff / Compare                           │  │
//! │  └───────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! ## Exemplo
//!
//! ```
//! use banker_core::Matrix;
//! use banker_savepoint::{Banker, Comparison};
//!
//! let maximum = Matrix::from_rows(&[vec![8], vec![6]], 1)?;
//! let mut banker = Banker::new(maximum, vec![10])?;
//!
//! banker.save("start")?;
//! banker.request(0, &[4])?;
//! assert!(matches!(banker.compare("start")?, Comparison::Changed(_)));
//!
//! banker.rollback_to("start")?;
//! assert_eq!(banker.compare("start")?, Comparison::Unchanged);
//! # Ok::<(), banker_savepoint::SavepointError>(())
//! ```

pub mod diff;
pub mod engine;
pub mod error;
pub mod store;

pub use diff::{CellDiff, Comparison, LedgerSection, StateDiff};
pub use engine::Banker;
pub use error::{SavepointError, SavepointResult};
pub use store::{Savepoint, SavepointStore};
