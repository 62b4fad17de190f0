//! Session state: data model, registry, lifecycle controller, events.

pub mod errors;
pub mod events;
pub mod manager;
pub mod models;
pub mod registry;

pub use errors::{SessionError, SessionResult};
pub use events::{EventBus, SessionEvent};
pub use manager::{RoundCommand, SessionManager};
pub use models::{
    ArchivedRound, BYE_TABLE_NUMBER, MIN_PARTICIPANTS, Outcome, Participant, ParticipantId,
    PointsSchema,
    ReportOutcome, Session, SessionSettings, Table, TableResult,
};
pub use registry::SessionRegistry;
