//! Session data models: participants, tables, rounds, settings.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Participant ID type (unique within a session)
pub type ParticipantId = String;

/// Table number assigned when the bye table is emitted.
///
/// The bye table holds participants left unseated when the pool cannot be
/// partitioned into regular tables. It keeps this sentinel number across the
/// final shuffle/renumber pass so clients can always recognize it.
pub const BYE_TABLE_NUMBER: u32 = 99;

/// Minimum active participants required to generate a round.
pub const MIN_PARTICIPANTS: usize = 6;

/// Default number of seats at a full table.
pub const DEFAULT_MAX_TABLE_SIZE: usize = 4;

/// One person in the session pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Unique within the session
    pub id: ParticipantId,
    /// Display name
    pub name: String,
    /// Character/role label (mutable via outcome reports)
    pub commander: String,
    /// Accumulated points across rounds
    pub points: u32,
    /// Join timestamp
    pub joined_at: DateTime<Utc>,
    /// Set when the participant drops out
    pub dropped: bool,
    /// Per-round seat-order tie-break value, re-rolled on generation
    pub seat_order: u32,
    /// Custom-group identifier (None = general pool)
    pub custom_group: Option<String>,
    /// Whether the participant's custom group accepts auto-filled seats
    pub auto_fill: bool,
}

impl Participant {
    pub fn new(id: ParticipantId, name: String) -> Self {
        Self {
            id,
            name,
            commander: String::new(),
            points: 0,
            joined_at: Utc::now(),
            dropped: false,
            seat_order: 0,
            custom_group: None,
            auto_fill: false,
        }
    }
}

/// Result recorded against a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableResult {
    /// No outcome reported yet
    Undecided,
    /// Win by a single participant
    Win(ParticipantId),
    /// Table agreed to a draw
    Draw,
}

impl TableResult {
    /// Whether a win or draw has already been recorded.
    pub fn is_decided(&self) -> bool {
        !matches!(self, Self::Undecided)
    }
}

/// One seating of 3-4 participants for one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Ordinal number, reassigned each round
    pub number: u32,
    /// Round this table belongs to
    pub round: u32,
    /// Seated participants, in seat order
    pub seats: Vec<ParticipantId>,
    /// Recorded outcome
    pub result: TableResult,
    /// Set when the table starts playing
    pub started_at: Option<DateTime<Utc>>,
    /// Set when an outcome is recorded (or on archival)
    pub completed_at: Option<DateTime<Utc>>,
    /// Whether the round containing this table has started
    pub round_started: bool,
    /// Free-form statistics reported by participants
    pub statistics: HashMap<String, serde_json::Value>,
    /// Carved out from a custom group
    pub custom: bool,
    /// Custom table whose remaining seats were auto-filled
    pub auto_filled: bool,
}

impl Table {
    pub fn new(number: u32, round: u32, seats: Vec<ParticipantId>) -> Self {
        Self {
            number,
            round,
            seats,
            result: TableResult::Undecided,
            started_at: None,
            completed_at: None,
            round_started: false,
            statistics: HashMap::new(),
            custom: false,
            auto_filled: false,
        }
    }

    /// Whether this is the sentinel bye table.
    pub fn is_bye(&self) -> bool {
        self.number == BYE_TABLE_NUMBER
    }

    /// Return the table to the forming state, clearing timestamps,
    /// the started flag, and any recorded result.
    pub fn reset(&mut self) {
        self.started_at = None;
        self.completed_at = None;
        self.round_started = false;
        self.result = TableResult::Undecided;
    }
}

/// An archived round: immutable snapshot of every table plus value-copies
/// of the participants seated in them at archival time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedRound {
    /// Round number
    pub number: u32,
    /// Frozen tables
    pub tables: Vec<Table>,
    /// Value-copies of seated participants, keyed by id
    pub participants: HashMap<ParticipantId, Participant>,
}

/// Points awarded per outcome kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsSchema {
    pub win: u32,
    pub draw: u32,
}

impl Default for PointsSchema {
    fn default() -> Self {
        Self { win: 3, draw: 1 }
    }
}

/// Per-session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Permit 3-seat tables when the pool is not divisible by 4
    pub allow_three_player_tables: bool,
    /// Add +3 extra fairness weight per past undersized placement
    pub extra_three_player_penalty: bool,
    /// Re-seat the previous round's winners together
    pub prioritize_winners: bool,
    /// Permit joining after the first round generated
    pub allow_join_after_start: bool,
    /// Permit host/player-curated custom groups
    pub allow_custom_groups: bool,
    /// Advisory round duration in seconds
    pub round_duration_secs: u32,
    /// Points awarded per outcome
    pub points: PointsSchema,
    /// Maximum number of rounds (0 = unlimited)
    pub max_rounds: u32,
    /// Seats at a full table
    pub max_table_size: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            allow_three_player_tables: true,
            extra_three_player_penalty: false,
            prioritize_winners: true,
            allow_join_after_start: true,
            allow_custom_groups: true,
            round_duration_secs: 90 * 60,
            points: PointsSchema::default(),
            max_rounds: 0,
            max_table_size: DEFAULT_MAX_TABLE_SIZE,
        }
    }
}

/// One running pod session, keyed by room code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Room code (registry key)
    pub code: String,
    /// Participant id of the host
    pub host_id: ParticipantId,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Expiry timestamp; the sweeper evicts past this point
    pub expires_at: DateTime<Utc>,
    /// Configuration
    pub settings: SessionSettings,
    /// Current round number; 0 until the first round generates
    pub round: u32,
    /// Live participant pool
    pub participants: HashMap<ParticipantId, Participant>,
    /// Tables of the current round (None until first generation)
    pub tables: Option<Vec<Table>>,
    /// Archived rounds, oldest first
    pub archive: Vec<ArchivedRound>,
    /// First round has generated
    pub started: bool,
    /// Game ended (explicitly or by expiry)
    pub ended: bool,
    /// Session swept out of the registry
    pub archived: bool,
}

impl Session {
    pub fn new(code: String, host_id: ParticipantId, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            code,
            host_id,
            created_at: now,
            expires_at: now + ttl,
            settings: SessionSettings::default(),
            round: 0,
            participants: HashMap::new(),
            tables: None,
            archive: Vec::new(),
            started: false,
            ended: false,
            archived: false,
        }
    }

    /// Participants still in the pool (not dropped), unordered.
    pub fn active_participants(&self) -> Vec<&Participant> {
        self.participants.values().filter(|p| !p.dropped).collect()
    }

    /// Whether any table of the current round has started.
    pub fn round_started(&self) -> bool {
        self.tables
            .as_ref()
            .is_some_and(|tables| tables.iter().any(|t| t.started_at.is_some()))
    }

    /// Find the current-round table seating the given participant.
    pub fn table_of(&self, participant_id: &str) -> Option<&Table> {
        self.tables
            .as_ref()?
            .iter()
            .find(|t| t.seats.iter().any(|id| id == participant_id))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Outcome kinds accepted by report-outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Draw,
    DropOut,
    /// Statistics/commander update only; never conflicts with a result
    DataOnly,
}

/// What a successful report-outcome changed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportOutcome {
    /// Winner id when a win was recorded
    pub winner: Option<ParticipantId>,
    /// Participant removed by a drop-out
    pub removed: Option<ParticipantId>,
    /// Table the report applied to
    pub table_number: Option<u32>,
}
