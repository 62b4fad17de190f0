//! Winner-priority table assembly.
//!
//! When enabled, the previous round's winners are re-seated together:
//! shuffled and sliced into full 4-seat tables. A trailing remainder of
//! 1-3 winners either flows into an open custom table, borrows enough
//! non-winners to complete one last full table, or returns to the general
//! pool. Winner tables are never undersized.

use rand::seq::SliceRandom;

use super::history::PairingHistory;
use super::selector::{SeatSelector, SelectorVariant};
use crate::session::models::{ArchivedRound, ParticipantId, TableResult};

/// Result of assembling winner tables
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WinnerAssembly {
    /// Full tables of winners (plus any borrowed non-winners)
    pub tables: Vec<Vec<ParticipantId>>,
    /// Leftover winners heading for open custom tables or the pool
    pub leftover: Vec<ParticipantId>,
}

/// Winners of the most recently archived round still present in `pool`.
pub fn collect_winners(archive: &[ArchivedRound], pool: &[ParticipantId]) -> Vec<ParticipantId> {
    let Some(last) = archive.last() else {
        return Vec::new();
    };

    last.tables
        .iter()
        .filter_map(|table| match &table.result {
            TableResult::Win(id) => Some(id.clone()),
            _ => None,
        })
        .filter(|id| pool.iter().any(|p| p == id))
        .collect()
}

/// Slice shuffled winners into full tables of `table_size`.
///
/// Winners and any borrowed non-winners are removed from `pool`. When
/// `open_targets_exist`, a remainder is left for the caller to seat into
/// open custom tables instead of borrowing.
pub fn assemble(
    mut winners: Vec<ParticipantId>,
    pool: &mut Vec<ParticipantId>,
    table_size: usize,
    open_targets_exist: bool,
    history: &PairingHistory,
) -> WinnerAssembly {
    pool.retain(|id| !winners.contains(id));
    winners.shuffle(&mut rand::rng());

    let mut assembly = WinnerAssembly::default();
    while winners.len() >= table_size {
        assembly.tables.push(winners.drain(..table_size).collect());
    }

    if winners.is_empty() {
        return assembly;
    }

    if open_targets_exist {
        // Remainders prefer open custom tables over a fresh one.
        assembly.leftover = winners;
        return assembly;
    }

    let missing = table_size - winners.len();
    if pool.len() >= missing {
        let selector = SeatSelector::new(history, SelectorVariant::Flat);
        let borrowed = selector.select(missing, pool, &winners);
        winners.extend(borrowed);
        assembly.tables.push(winners);
    } else {
        // Not enough non-winners to complete a table; back to the pool.
        assembly.leftover = winners;
    }

    assembly
}
