//! Weighted minimal-repeat seat selector.
//!
//! Fills seats one at a time from a candidate pool, biased against repeat
//! pairings (exponential decay on historical co-occurrence) and toward
//! participants owed compensation for past undersized tables. Greedy and
//! non-backtracking: O(seats x candidates) per table.
//!
//! Every draw uses the OS-seeded `ThreadRng`, an unpredictable CSPRNG.
//! A seeded generator would let participants predict or game the seating.

use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

use super::history::PairingHistory;
use crate::session::models::ParticipantId;

/// Scores above this contribute nothing; avoids weights underflowing to
/// zero, which `WeightedIndex` rejects when every weight is zero.
const MAX_SCORE: u32 = 60;

/// Fairness/scoring variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorVariant {
    /// Score against committed members only; flat 3x bonus for anyone
    /// seated at an undersized table last round.
    Flat,
    /// Score against committed members and the remaining pool; bonus
    /// doubles per past undersized placement, capped at 32x.
    Progressive,
}

/// Seat filler bound to one round's pairing history
pub struct SeatSelector<'a> {
    history: &'a PairingHistory,
    variant: SelectorVariant,
}

impl<'a> SeatSelector<'a> {
    pub fn new(history: &'a PairingHistory, variant: SelectorVariant) -> Self {
        Self { history, variant }
    }

    /// Draw up to `seats` participants out of `pool`.
    ///
    /// `committed` holds everyone already placed at the forming table.
    /// Drawn candidates are removed from `pool`. Returns fewer than
    /// `seats` only when the pool runs out.
    pub fn select(
        &self,
        seats: usize,
        pool: &mut Vec<ParticipantId>,
        committed: &[ParticipantId],
    ) -> Vec<ParticipantId> {
        let mut selected: Vec<ParticipantId> = Vec::with_capacity(seats);

        while selected.len() < seats && !pool.is_empty() {
            let weights: Vec<f64> = pool
                .iter()
                .map(|candidate| self.weight(candidate, pool, committed, &selected))
                .collect();

            let index = match WeightedIndex::new(&weights) {
                Ok(dist) => dist.sample(&mut rand::rng()),
                // All-zero weights cannot happen with the score cap; take
                // the first candidate rather than dropping the table.
                Err(_) => 0,
            };

            selected.push(pool.swap_remove(index));
        }

        selected
    }

    fn weight(
        &self,
        candidate: &str,
        pool: &[ParticipantId],
        committed: &[ParticipantId],
        selected: &[ParticipantId],
    ) -> f64 {
        let mut score: u32 = committed
            .iter()
            .chain(selected.iter())
            .map(|other| self.history.pair_count(candidate, other))
            .sum();

        if self.variant == SelectorVariant::Progressive {
            // Also weigh against everyone still in the pool, so a candidate
            // who has met most of the field ranks below one who has not.
            score += pool
                .iter()
                .filter(|other| other.as_str() != candidate)
                .map(|other| self.history.pair_count(candidate, other))
                .sum::<u32>();
        }

        let base = 2f64.powi(-(score.min(MAX_SCORE) as i32));
        base * self.fairness_bonus(candidate)
    }

    fn fairness_bonus(&self, candidate: &str) -> f64 {
        match self.variant {
            SelectorVariant::Flat => {
                if self.history.was_undersized_last_round(candidate) {
                    3.0
                } else {
                    1.0
                }
            }
            SelectorVariant::Progressive => {
                let count = self.history.undersized_count(candidate).min(5);
                2f64.powi(count as i32)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::models::{ArchivedRound, Table};
    use std::collections::HashMap;

    fn ids(names: &[&str]) -> Vec<ParticipantId> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn archive_of(tables: Vec<Vec<&str>>) -> Vec<ArchivedRound> {
        vec![ArchivedRound {
            number: 1,
            tables: tables
                .into_iter()
                .enumerate()
                .map(|(i, seats)| {
                    Table::new(i as u32 + 1, 1, seats.into_iter().map(str::to_owned).collect())
                })
                .collect(),
            participants: HashMap::new(),
        }]
    }

    #[test]
    fn test_select_takes_requested_count() {
        let history = PairingHistory::build(&[], 4, false);
        let selector = SeatSelector::new(&history, SelectorVariant::Progressive);

        let mut pool = ids(&["a", "b", "c", "d", "e"]);
        let selected = selector.select(4, &mut pool, &[]);

        assert_eq!(selected.len(), 4);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_select_exhausts_short_pool() {
        let history = PairingHistory::build(&[], 4, false);
        let selector = SeatSelector::new(&history, SelectorVariant::Flat);

        let mut pool = ids(&["a", "b"]);
        let selected = selector.select(4, &mut pool, &[]);

        assert_eq!(selected.len(), 2);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_no_duplicates_in_selection() {
        let history = PairingHistory::build(&[], 4, false);
        let selector = SeatSelector::new(&history, SelectorVariant::Progressive);

        let mut pool = ids(&["a", "b", "c", "d", "e", "f", "g", "h"]);
        let selected = selector.select(8, &mut pool, &[]);

        let mut unique = selected.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), selected.len());
    }

    #[test]
    fn test_repeat_pairings_are_avoided_statistically() {
        // "a" has played "b" many times but never "c" or "d"; with one seat
        // next to "a", "b" should almost never be drawn.
        let mut archive = Vec::new();
        for _ in 0..8 {
            archive.extend(archive_of(vec![vec!["a", "b", "x", "y"]]));
        }
        let history = PairingHistory::build(&archive, 4, false);
        let selector = SeatSelector::new(&history, SelectorVariant::Flat);

        let mut b_drawn = 0;
        for _ in 0..200 {
            let mut pool = ids(&["b", "c", "d"]);
            let picked = selector.select(1, &mut pool, &ids(&["a"]));
            if picked[0] == "b" {
                b_drawn += 1;
            }
        }

        // weight for "b" is 2^-8 vs 1.0 for the others; ~0.2% of draws
        assert!(b_drawn < 20, "drew the repeat pairing {b_drawn}/200 times");
    }

    #[test]
    fn test_fairness_bonus_prefers_compensated() {
        // "c" sat at a 3-seat table; with the progressive bonus it should
        // win a head-to-head draw against "d" well over half the time.
        let archive = archive_of(vec![vec!["c", "x", "y"], vec!["d", "p", "q", "r"]]);
        let history = PairingHistory::build(&archive, 4, true);
        let selector = SeatSelector::new(&history, SelectorVariant::Progressive);

        let mut c_drawn = 0;
        for _ in 0..300 {
            let mut pool = ids(&["c", "d"]);
            let picked = selector.select(1, &mut pool, &[]);
            if picked[0] == "c" {
                c_drawn += 1;
            }
        }

        // bonus 16x vs 1x => expected ~94%
        assert!(c_drawn > 220, "compensated candidate drawn {c_drawn}/300");
    }
}
