//! Pairing history derived from archived rounds.
//!
//! Rebuilt from scratch on every round generation so the counts always
//! reflect the full archive, including rounds archived by end-round.

use std::collections::HashMap;

use crate::session::models::{ArchivedRound, ParticipantId};

/// Unordered pair key: the two ids in lexicographic order.
fn pair_key(a: &str, b: &str) -> (ParticipantId, ParticipantId) {
    if a <= b {
        (a.to_owned(), b.to_owned())
    } else {
        (b.to_owned(), a.to_owned())
    }
}

/// Co-occurrence counts and fairness bookkeeping over the archive
#[derive(Debug, Default, Clone)]
pub struct PairingHistory {
    /// Shared-table count per unordered participant pair
    pairings: HashMap<(ParticipantId, ParticipantId), u32>,
    /// Past undersized-table placements per participant
    undersized: HashMap<ParticipantId, u32>,
    /// Participants seated at an undersized table in the latest archived round
    last_round_undersized: Vec<ParticipantId>,
}

impl PairingHistory {
    /// Build history from the archive.
    ///
    /// Every historical placement at a table smaller than `max_table_size`
    /// adds 1 to the participant's undersized count, plus 3 more when the
    /// extra penalty is enabled.
    pub fn build(
        archive: &[ArchivedRound],
        max_table_size: usize,
        extra_three_player_penalty: bool,
    ) -> Self {
        let mut history = Self::default();
        let undersized_weight = if extra_three_player_penalty { 4 } else { 1 };

        for round in archive {
            for table in &round.tables {
                for (i, a) in table.seats.iter().enumerate() {
                    for b in table.seats.iter().skip(i + 1) {
                        *history.pairings.entry(pair_key(a, b)).or_insert(0) += 1;
                    }
                }

                if table.seats.len() < max_table_size {
                    for id in &table.seats {
                        *history.undersized.entry(id.clone()).or_insert(0) +=
                            undersized_weight;
                    }
                }
            }
        }

        if let Some(last) = archive.last() {
            history.last_round_undersized = last
                .tables
                .iter()
                .filter(|t| t.seats.len() < max_table_size)
                .flat_map(|t| t.seats.iter().cloned())
                .collect();
        }

        history
    }

    /// Times two participants shared a table.
    pub fn pair_count(&self, a: &str, b: &str) -> u32 {
        self.pairings.get(&pair_key(a, b)).copied().unwrap_or(0)
    }

    /// Weighted count of past undersized placements.
    pub fn undersized_count(&self, id: &str) -> u32 {
        self.undersized.get(id).copied().unwrap_or(0)
    }

    /// Whether the participant sat at an undersized table last round.
    pub fn was_undersized_last_round(&self, id: &str) -> bool {
        self.last_round_undersized.iter().any(|u| u == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::models::Table;

    fn archived(number: u32, tables: Vec<Vec<&str>>) -> ArchivedRound {
        ArchivedRound {
            number,
            tables: tables
                .into_iter()
                .enumerate()
                .map(|(i, seats)| {
                    Table::new(
                        i as u32 + 1,
                        number,
                        seats.into_iter().map(str::to_owned).collect(),
                    )
                })
                .collect(),
            participants: HashMap::new(),
        }
    }

    #[test]
    fn test_pair_counts_symmetric() {
        let archive = vec![archived(1, vec![vec!["a", "b", "c", "d"]])];
        let history = PairingHistory::build(&archive, 4, false);

        assert_eq!(history.pair_count("a", "b"), 1);
        assert_eq!(history.pair_count("b", "a"), 1);
        assert_eq!(history.pair_count("a", "e"), 0);
    }

    #[test]
    fn test_pair_counts_accumulate_across_rounds() {
        let archive = vec![
            archived(1, vec![vec!["a", "b", "c", "d"]]),
            archived(2, vec![vec!["a", "b", "e", "f"]]),
        ];
        let history = PairingHistory::build(&archive, 4, false);

        assert_eq!(history.pair_count("a", "b"), 2);
        assert_eq!(history.pair_count("a", "c"), 1);
        assert_eq!(history.pair_count("a", "e"), 1);
    }

    #[test]
    fn test_undersized_counts() {
        let archive = vec![
            archived(1, vec![vec!["a", "b", "c"], vec!["d", "e", "f", "g"]]),
            archived(2, vec![vec!["a", "d", "e"]]),
        ];
        let history = PairingHistory::build(&archive, 4, false);

        assert_eq!(history.undersized_count("a"), 2);
        assert_eq!(history.undersized_count("b"), 1);
        assert_eq!(history.undersized_count("g"), 0);
    }

    #[test]
    fn test_extra_penalty_weights_placements() {
        let archive = vec![archived(1, vec![vec!["a", "b", "c"]])];
        let history = PairingHistory::build(&archive, 4, true);

        // 1 base + 3 extra per placement
        assert_eq!(history.undersized_count("a"), 4);
    }

    #[test]
    fn test_last_round_undersized_only_latest() {
        let archive = vec![
            archived(1, vec![vec!["a", "b", "c"]]),
            archived(2, vec![vec!["a", "b", "c", "d"], vec!["e", "f", "g"]]),
        ];
        let history = PairingHistory::build(&archive, 4, false);

        assert!(!history.was_undersized_last_round("a"));
        assert!(history.was_undersized_last_round("e"));
    }

    #[test]
    fn test_empty_archive() {
        let history = PairingHistory::build(&[], 4, false);
        assert_eq!(history.pair_count("a", "b"), 0);
        assert_eq!(history.undersized_count("a"), 0);
        assert!(!history.was_undersized_last_round("a"));
    }
}
