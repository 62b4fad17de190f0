//! # Commander Pods
//!
//! A multi-round pod-tournament engine for tabletop games played at
//! tables of 3-4 seats.
//!
//! A fixed pool of participants is repeatedly re-partitioned into tables
//! across successive rounds. Given the pool and the full history of past
//! tables, each generation:
//!
//! - minimizes repeated pairings (exponentially decaying weighted draws)
//! - optionally re-seats the previous round's winners together
//! - compensates participants previously stuck at undersized tables
//! - honors host/player-curated custom tables, auto-filling open seats
//!
//! The balancer is a heuristic: it minimizes repeats statistically rather
//! than guaranteeing a round-robin schedule.
//!
//! ## Core Modules
//!
//! - [`session`]: session registry, data model, round lifecycle commands
//! - [`pairing`]: the group-generation engine (planner, history, selector)
//! - [`store`]: persistence collaborator seam
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use commander_pods::{RoundCommand, SessionManager};
//! use commander_pods::store::NullStore;
//!
//! # async fn run() -> Result<(), commander_pods::SessionError> {
//! let manager = SessionManager::new(Arc::new(NullStore));
//! let session = manager
//!     .create_session("host".into(), 4, chrono::Duration::hours(6))
//!     .await?;
//! for i in 1..=8 {
//!     manager
//!         .join(&session.code, format!("p{i}"), format!("Player {i}"))
//!         .await?;
//! }
//! let tables = manager
//!     .generate_round(&session.code, RoundCommand::First)
//!     .await?;
//! assert_eq!(tables.len(), 2);
//! # Ok(())
//! # }
//! ```

/// Pairing/group-generation engine.
pub mod pairing;
pub use pairing::{GroupPlan, PairingHistory, SeatSelector, SelectorVariant};

/// Session registry, data model, and round lifecycle.
pub mod session;
pub use session::{
    BYE_TABLE_NUMBER, MIN_PARTICIPANTS, Outcome, Participant, ParticipantId, PointsSchema,
    ReportOutcome, RoundCommand, Session, SessionError, SessionEvent, SessionManager,
    SessionRegistry, SessionResult, SessionSettings, Table, TableResult,
};

/// Persistence collaborator seam.
pub mod store;
pub use store::{NullStore, SessionStore};
