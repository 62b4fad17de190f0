//! Session manager: the round lifecycle controller.
//!
//! Every command locks its session's mutex for the whole read-modify-write
//! sequence, so no command ever observes a half-built round. Snapshots are
//! cloned inside the lock and handed to the store and event listeners
//! after it is released; neither can fail a command.

use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::errors::{SessionError, SessionResult};
use super::events::{EventBus, SessionEvent};
use super::models::{
    ArchivedRound, MIN_PARTICIPANTS, Outcome, Participant, ParticipantId, ReportOutcome, Session,
    Table, TableResult,
};
use super::registry::SessionRegistry;
use crate::pairing::generator;
use crate::store::SessionStore;

/// Round-generation commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundCommand {
    /// Generate round 1; rejected once the game has started
    First,
    /// Archive the current round and generate the next one
    Next,
    /// Re-deal the current round without touching the archive
    Regenerate,
}

/// Facade over the registry, pairing engine, store, and event bus
pub struct SessionManager {
    registry: Arc<SessionRegistry>,
    store: Arc<dyn SessionStore>,
    events: Mutex<EventBus>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            registry: Arc::new(SessionRegistry::new()),
            store,
            events: Mutex::new(EventBus::new()),
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Register an event listener.
    pub async fn subscribe(&self) -> tokio::sync::mpsc::UnboundedReceiver<SessionEvent> {
        self.events.lock().await.subscribe()
    }

    /// Create a session and return its initial snapshot.
    pub async fn create_session(
        &self,
        host_id: ParticipantId,
        code_length: usize,
        ttl: Duration,
    ) -> SessionResult<Session> {
        let (_, handle) = self.registry.create(host_id, code_length, ttl).await?;
        let snapshot = handle.lock().await.clone();
        self.persist(&snapshot).await;
        Ok(snapshot)
    }

    /// Join a participant into the session pool.
    pub async fn join(
        &self,
        code: &str,
        participant_id: ParticipantId,
        name: String,
    ) -> SessionResult<Session> {
        if participant_id.is_empty() {
            return Err(SessionError::EmptyParticipantId);
        }

        let handle = self.registry.get(code).await?;
        let snapshot = {
            let mut session = handle.lock().await;
            ensure_live(&session)?;
            if session.started && !session.settings.allow_join_after_start {
                return Err(SessionError::JoinClosed);
            }
            if session.participants.contains_key(&participant_id) {
                return Err(SessionError::DuplicateParticipant(participant_id));
            }

            session.participants.insert(
                participant_id.clone(),
                Participant::new(participant_id.clone(), name.clone()),
            );
            session.clone()
        };

        self.persist(&snapshot).await;
        self.publish(SessionEvent::ParticipantJoined {
            code: code.to_owned(),
            participant_id,
            name,
        })
        .await;
        Ok(snapshot)
    }

    /// Deep snapshot of a session, serializable without holding its lock.
    pub async fn get_session(&self, code: &str) -> SessionResult<Session> {
        let handle = self.registry.get(code).await?;
        let session = handle.lock().await;
        Ok(session.clone())
    }

    /// Generate, advance, or re-deal a round.
    pub async fn generate_round(
        &self,
        code: &str,
        command: RoundCommand,
    ) -> SessionResult<Vec<Table>> {
        let handle = self.registry.get(code).await?;
        let (tables, snapshot) = {
            let mut session = handle.lock().await;
            ensure_live(&session)?;

            // Reject before any mutation so failed commands leave no trace.
            let active = session.active_participants().len();
            if active < MIN_PARTICIPANTS {
                return Err(SessionError::InsufficientParticipants {
                    needed: MIN_PARTICIPANTS,
                    current: active,
                });
            }

            match command {
                RoundCommand::First => {
                    if session.started {
                        return Err(SessionError::GameAlreadyStarted);
                    }
                    session.round = 1;
                    session.started = true;
                }
                RoundCommand::Next => {
                    if !session.started {
                        return Err(SessionError::GameNotStarted);
                    }
                    let max_rounds = session.settings.max_rounds;
                    if max_rounds > 0 && session.round >= max_rounds {
                        return Err(SessionError::MaxRoundsReached(max_rounds));
                    }
                    archive_current(&mut session);
                    session.round += 1;
                }
                RoundCommand::Regenerate => {
                    if !session.started {
                        return Err(SessionError::GameNotStarted);
                    }
                    session.tables = None;
                }
            }

            let tables = generator::generate_round(&mut session)?;
            (tables, session.clone())
        };

        self.persist(&snapshot).await;
        self.publish(SessionEvent::RoundGenerated {
            code: code.to_owned(),
            round: snapshot.round,
            table_count: tables.len(),
        })
        .await;
        Ok(tables)
    }

    /// Start every table of the current round.
    pub async fn start_round(&self, code: &str) -> SessionResult<()> {
        let handle = self.registry.get(code).await?;
        let snapshot = {
            let mut session = handle.lock().await;
            ensure_live(&session)?;
            let tables = session.tables.as_mut().ok_or(SessionError::NoCurrentRound)?;

            let now = Utc::now();
            for table in tables.iter_mut() {
                table.started_at.get_or_insert(now);
                table.round_started = true;
            }
            session.clone()
        };

        self.persist(&snapshot).await;
        self.publish(SessionEvent::RoundStarted {
            code: code.to_owned(),
            round: snapshot.round,
        })
        .await;
        Ok(())
    }

    /// Return every table of the current round to the forming state.
    pub async fn reset_round(&self, code: &str) -> SessionResult<()> {
        let handle = self.registry.get(code).await?;
        let snapshot = {
            let mut session = handle.lock().await;
            ensure_live(&session)?;
            let tables = session.tables.as_mut().ok_or(SessionError::NoCurrentRound)?;
            for table in tables.iter_mut() {
                table.reset();
            }
            session.clone()
        };

        self.persist(&snapshot).await;
        Ok(())
    }

    /// Record a win, draw, drop-out, or data-only update.
    pub async fn report_outcome(
        &self,
        code: &str,
        participant_id: &str,
        outcome: Outcome,
        commander: Option<String>,
        statistics: HashMap<String, serde_json::Value>,
    ) -> SessionResult<ReportOutcome> {
        let handle = self.registry.get(code).await?;
        let (report, snapshot, dropped) = {
            let mut session = handle.lock().await;
            ensure_live(&session)?;
            if !session.participants.contains_key(participant_id) {
                return Err(SessionError::ParticipantNotFound(participant_id.to_owned()));
            }

            let report = match outcome {
                Outcome::Win => record_result(
                    &mut session,
                    participant_id,
                    TableResult::Win(participant_id.to_owned()),
                    statistics,
                )?,
                Outcome::Draw => {
                    record_result(&mut session, participant_id, TableResult::Draw, statistics)?
                }
                Outcome::DropOut => drop_out(&mut session, participant_id)?,
                Outcome::DataOnly => merge_statistics(&mut session, participant_id, statistics)?,
            };

            if let Some(commander) = commander
                && let Some(participant) = session.participants.get_mut(participant_id)
            {
                participant.commander = commander;
            }

            let dropped = report.removed.is_some();
            (report, session.clone(), dropped)
        };

        self.persist(&snapshot).await;
        if dropped {
            self.publish(SessionEvent::ParticipantDropped {
                code: code.to_owned(),
                participant_id: participant_id.to_owned(),
            })
            .await;
        }
        Ok(report)
    }

    /// Put participants into a fresh custom group; returns the group id.
    pub async fn create_custom_group(
        &self,
        code: &str,
        participant_ids: &[ParticipantId],
        auto_fill: bool,
    ) -> SessionResult<String> {
        let handle = self.registry.get(code).await?;
        let (group_id, snapshot) = {
            let mut session = handle.lock().await;
            ensure_live(&session)?;
            if !session.settings.allow_custom_groups {
                return Err(SessionError::CustomGroupsDisabled);
            }
            for id in participant_ids {
                if !session.participants.contains_key(id) {
                    return Err(SessionError::ParticipantNotFound(id.clone()));
                }
            }

            let group_id = Uuid::new_v4().to_string();
            for id in participant_ids {
                if let Some(participant) = session.participants.get_mut(id) {
                    participant.custom_group = Some(group_id.clone());
                    participant.auto_fill = auto_fill;
                }
            }
            (group_id, session.clone())
        };

        self.persist(&snapshot).await;
        Ok(group_id)
    }

    /// Dissolve the custom groups the given participants belong to.
    pub async fn delete_custom_group(
        &self,
        code: &str,
        participant_ids: &[ParticipantId],
    ) -> SessionResult<()> {
        let handle = self.registry.get(code).await?;
        let snapshot = {
            let mut session = handle.lock().await;
            ensure_live(&session)?;

            let group_ids: Vec<String> = participant_ids
                .iter()
                .filter_map(|id| session.participants.get(id))
                .filter_map(|p| p.custom_group.clone())
                .collect();
            if group_ids.is_empty() {
                return Err(SessionError::CustomGroupNotFound);
            }

            for participant in session.participants.values_mut() {
                if participant
                    .custom_group
                    .as_ref()
                    .is_some_and(|g| group_ids.contains(g))
                {
                    participant.custom_group = None;
                    participant.auto_fill = false;
                }
            }
            session.clone()
        };

        self.persist(&snapshot).await;
        Ok(())
    }

    /// Move a participant between two tables of the current round.
    pub async fn move_participant(
        &self,
        code: &str,
        from_table: u32,
        to_table: u32,
        round: u32,
        participant_id: &str,
    ) -> SessionResult<()> {
        let handle = self.registry.get(code).await?;
        let snapshot = {
            let mut session = handle.lock().await;
            ensure_live(&session)?;
            if round != session.round {
                return Err(SessionError::NotCurrentRound(round));
            }
            let max_table_size = session.settings.max_table_size;
            let tables = session.tables.as_mut().ok_or(SessionError::NoCurrentRound)?;

            let from = tables
                .iter()
                .position(|t| t.number == from_table)
                .ok_or(SessionError::TableNotFound(from_table))?;
            let to = tables
                .iter()
                .position(|t| t.number == to_table)
                .ok_or(SessionError::TableNotFound(to_table))?;
            if !tables[to].is_bye() && tables[to].seats.len() >= max_table_size {
                return Err(SessionError::TableFull(to_table));
            }

            let seat = tables[from]
                .seats
                .iter()
                .position(|id| id == participant_id)
                .ok_or_else(|| SessionError::ParticipantNotFound(participant_id.to_owned()))?;
            let moved = tables[from].seats.remove(seat);
            tables[to].seats.push(moved);
            session.clone()
        };

        self.persist(&snapshot).await;
        Ok(())
    }

    /// Archive the current round without generating the next one.
    pub async fn end_round(&self, code: &str) -> SessionResult<()> {
        let handle = self.registry.get(code).await?;
        let snapshot = {
            let mut session = handle.lock().await;
            ensure_live(&session)?;
            if session.tables.is_none() {
                return Err(SessionError::NoCurrentRound);
            }
            archive_current(&mut session);
            session.clone()
        };

        self.persist(&snapshot).await;
        Ok(())
    }

    /// End the game; returns final standings ordered by points.
    pub async fn end_game(&self, code: &str) -> SessionResult<Vec<Participant>> {
        let handle = self.registry.get(code).await?;
        let (standings, snapshot) = {
            let mut session = handle.lock().await;
            ensure_live(&session)?;
            archive_current(&mut session);
            session.ended = true;

            let mut standings: Vec<Participant> =
                session.participants.values().cloned().collect();
            standings.sort_by(|a, b| {
                b.points.cmp(&a.points).then(a.joined_at.cmp(&b.joined_at))
            });
            (standings, session.clone())
        };

        self.persist(&snapshot).await;
        self.publish(SessionEvent::GameEnded {
            code: code.to_owned(),
            rounds_played: snapshot.round,
        })
        .await;
        Ok(standings)
    }

    /// Spawn the periodic sweep that archives and evicts expired sessions.
    /// Each session's lock is taken individually; the sweep never holds
    /// more than one at a time.
    pub fn spawn_expiry_sweeper(
        self: &Arc<Self>,
        period: std::time::Duration,
    ) -> tokio::task::JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                manager.sweep_expired().await;
            }
        })
    }

    /// One sweep pass; exposed for tests.
    pub async fn sweep_expired(&self) {
        let now = Utc::now();
        for code in self.registry.codes().await {
            let Some(handle) = self.registry.peek(&code).await else {
                continue;
            };
            let snapshot = {
                let mut session = handle.lock().await;
                if !session.is_expired(now) || session.archived {
                    continue;
                }
                session.ended = true;
                session.archived = true;
                session.clone()
            };

            log::info!("archiving expired session {code}");
            self.persist(&snapshot).await;
            self.registry.remove(&code).await;
        }
    }

    /// Save a snapshot, swallowing failures: persistence must never fail
    /// the in-memory operation.
    async fn persist(&self, snapshot: &Session) {
        if let Err(e) = self.store.save(snapshot).await {
            log::warn!("failed to save session {}: {e}", snapshot.code);
        }
    }

    async fn publish(&self, event: SessionEvent) {
        self.events.lock().await.publish(event);
    }
}

/// Reject commands against an ended session.
fn ensure_live(session: &Session) -> SessionResult<()> {
    if session.ended {
        return Err(SessionError::GameEnded);
    }
    Ok(())
}

/// Snapshot the current tables into the archive, stamping a completion
/// time on any table that never recorded one.
fn archive_current(session: &mut Session) {
    let Some(mut tables) = session.tables.take() else {
        return;
    };

    let now = Utc::now();
    let mut participants = HashMap::new();
    for table in tables.iter_mut() {
        table.completed_at.get_or_insert(now);
        for id in &table.seats {
            if let Some(participant) = session.participants.get(id) {
                participants.insert(id.clone(), participant.clone());
            }
        }
    }

    session.archive.push(ArchivedRound {
        number: session.round,
        tables,
        participants,
    });
}

/// Record a win or draw against the reporter's table.
fn record_result(
    session: &mut Session,
    participant_id: &str,
    result: TableResult,
    statistics: HashMap<String, serde_json::Value>,
) -> SessionResult<ReportOutcome> {
    let points = session.settings.points;
    let table_number = session
        .table_of(participant_id)
        .map(|t| t.number)
        .ok_or_else(|| SessionError::ParticipantNotFound(participant_id.to_owned()))?;

    let tables = session.tables.as_mut().ok_or(SessionError::NoCurrentRound)?;
    let table = tables
        .iter_mut()
        .find(|t| t.number == table_number)
        .ok_or(SessionError::TableNotFound(table_number))?;
    if table.result.is_decided() {
        return Err(SessionError::ResultAlreadyRecorded(table_number));
    }

    table.result = result.clone();
    table.completed_at = Some(Utc::now());
    table.statistics.extend(statistics);
    let seats = table.seats.clone();

    let winner = match result {
        TableResult::Win(ref id) => {
            if let Some(participant) = session.participants.get_mut(id) {
                participant.points += points.win;
            }
            Some(id.clone())
        }
        TableResult::Draw => {
            for id in &seats {
                if let Some(participant) = session.participants.get_mut(id) {
                    participant.points += points.draw;
                }
            }
            None
        }
        TableResult::Undecided => None,
    };

    Ok(ReportOutcome {
        winner,
        removed: None,
        table_number: Some(table_number),
    })
}

/// Remove a participant; only allowed while every table is still forming.
fn drop_out(session: &mut Session, participant_id: &str) -> SessionResult<ReportOutcome> {
    if session.round_started() {
        return Err(SessionError::DropOutAfterStart);
    }

    let table_number = session.table_of(participant_id).map(|t| t.number);
    if let Some(tables) = session.tables.as_mut() {
        for table in tables.iter_mut() {
            table.seats.retain(|id| id != participant_id);
        }
    }
    session.participants.remove(participant_id);

    Ok(ReportOutcome {
        winner: None,
        removed: Some(participant_id.to_owned()),
        table_number,
    })
}

/// Merge statistics into the reporter's table; never conflicts with an
/// existing result.
fn merge_statistics(
    session: &mut Session,
    participant_id: &str,
    statistics: HashMap<String, serde_json::Value>,
) -> SessionResult<ReportOutcome> {
    let table_number = session
        .table_of(participant_id)
        .map(|t| t.number)
        .ok_or_else(|| SessionError::ParticipantNotFound(participant_id.to_owned()))?;

    let tables = session.tables.as_mut().ok_or(SessionError::NoCurrentRound)?;
    if let Some(table) = tables.iter_mut().find(|t| t.number == table_number) {
        table.statistics.extend(statistics);
    }

    Ok(ReportOutcome {
        winner: None,
        removed: None,
        table_number: Some(table_number),
    })
}
