//! Round generation pipeline.
//!
//! Glues the planner, history builder, custom resolver, winner assembler,
//! and seat selector into one pass over a session's pool:
//!
//! 1. rebuild pairing history from the archive
//! 2. carve out custom tables (fixed and open)
//! 3. seed winner tables from the previous round
//! 4. auto-fill open custom tables
//! 5. plan and fill the remaining regular tables
//! 6. shuffle and renumber, with the bye table pinned at 99

use rand::seq::SliceRandom;

use super::custom::{self, CustomResolution};
use super::history::PairingHistory;
use super::planner;
use super::selector::{SeatSelector, SelectorVariant};
use super::winners::{self, WinnerAssembly};
use crate::session::errors::{SessionError, SessionResult};
use crate::session::models::{
    BYE_TABLE_NUMBER, MIN_PARTICIPANTS, ParticipantId, Session, Table,
};

/// Generate tables for the session's current round number.
///
/// Mutates the session: dissolved custom groups are cleared, per-round
/// seat-order values are re-rolled, and the new tables replace any
/// current ones. The caller owns archiving and round-number bookkeeping.
pub fn generate_round(session: &mut Session) -> SessionResult<Vec<Table>> {
    let settings = session.settings.clone();
    let active = session.active_participants();
    if active.len() < MIN_PARTICIPANTS {
        return Err(SessionError::InsufficientParticipants {
            needed: MIN_PARTICIPANTS,
            current: active.len(),
        });
    }

    let history = PairingHistory::build(
        &session.archive,
        settings.max_table_size,
        settings.extra_three_player_penalty,
    );

    let resolution = if settings.allow_custom_groups {
        custom::resolve(&active, settings.max_table_size)
    } else {
        CustomResolution::default()
    };

    let mut pool: Vec<ParticipantId> = active
        .iter()
        .filter(|p| {
            !resolution
                .fixed
                .iter()
                .any(|g| g.members.contains(&p.id))
                && !resolution.open.iter().any(|g| g.members.contains(&p.id))
        })
        .map(|p| p.id.clone())
        .collect();

    for id in &resolution.dissolved {
        if let Some(participant) = session.participants.get_mut(id) {
            participant.custom_group = None;
            participant.auto_fill = false;
        }
    }

    let assembly = if settings.prioritize_winners && !session.archive.is_empty() {
        let winner_ids = winners::collect_winners(&session.archive, &pool);
        winners::assemble(
            winner_ids,
            &mut pool,
            settings.max_table_size,
            !resolution.open.is_empty(),
            &history,
        )
    } else {
        WinnerAssembly::default()
    };

    let selector = SeatSelector::new(&history, SelectorVariant::Progressive);
    let mut leftover_winners = assembly.leftover;

    // Auto-fill open custom tables: leftover winners take the free seats
    // first, then the selector tops the table up to its target size.
    let mut open_tables: Vec<Vec<ParticipantId>> = Vec::with_capacity(resolution.open.len());
    for group in &resolution.open {
        let mut seats = group.members.clone();
        while seats.len() < settings.max_table_size {
            let Some(winner) = leftover_winners.pop() else {
                break;
            };
            seats.push(winner);
        }

        let target = if seats.len() >= settings.max_table_size {
            seats.len()
        } else if pool.len() >= settings.max_table_size - seats.len() {
            settings.max_table_size
        } else {
            settings.max_table_size - 1
        };
        if seats.len() < target {
            let fill = selector.select(target - seats.len(), &mut pool, &seats);
            seats.extend(fill);
        }
        open_tables.push(seats);
    }
    pool.append(&mut leftover_winners);

    let plan = planner::plan(pool.len(), settings.allow_three_player_tables);
    let mut regular_tables: Vec<Vec<ParticipantId>> = Vec::new();
    for size in plan.table_sizes() {
        let seats = selector.select(size, &mut pool, &[]);
        if seats.len() != size {
            return Err(SessionError::InternalInconsistency {
                expected: size,
                actual: seats.len(),
            });
        }
        regular_tables.push(seats);
    }

    // Whatever the planner could not seat becomes the bye table.
    let byes = pool;

    let round = session.round;
    let mut tables: Vec<Table> = Vec::new();
    for group in &resolution.fixed {
        let mut table = Table::new(0, round, group.members.clone());
        table.custom = true;
        tables.push(table);
    }
    for seats in open_tables {
        let mut table = Table::new(0, round, seats);
        table.custom = true;
        table.auto_filled = true;
        tables.push(table);
    }
    for seats in assembly.tables {
        tables.push(Table::new(0, round, seats));
    }
    for seats in regular_tables {
        tables.push(Table::new(0, round, seats));
    }

    // Relabel: shuffle regular/custom/winner tables and number from 1.
    // The bye table is an explicit case, appended last with its sentinel
    // number so it can never be shuffled away or renumbered.
    tables.shuffle(&mut rand::rng());
    for (index, table) in tables.iter_mut().enumerate() {
        table.number = index as u32 + 1;
        table.seats.shuffle(&mut rand::rng());
    }
    if !byes.is_empty() {
        log::info!(
            "session {}: {} participants seated at the bye table",
            session.code,
            byes.len()
        );
        tables.push(Table::new(BYE_TABLE_NUMBER, round, byes));
    }

    for table in &tables {
        for (seat, id) in table.seats.iter().enumerate() {
            if let Some(participant) = session.participants.get_mut(id) {
                participant.seat_order = seat as u32;
            }
        }
    }

    log::info!(
        "session {}: generated round {round} with {} tables",
        session.code,
        tables.len()
    );
    session.tables = Some(tables.clone());
    Ok(tables)
}
