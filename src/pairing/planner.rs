//! Group size planner.
//!
//! Decides how many 4-seat and 3-seat tables a participant count needs.
//! Participants that cannot be seated (3-seat tables disabled, or a
//! remainder too small to rearrange) are planned as byes, not errors.

/// Table counts for one round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupPlan {
    /// Number of 4-seat tables
    pub fours: usize,
    /// Number of 3-seat tables
    pub threes: usize,
    /// Participants left unseated (bye table)
    pub byes: usize,
}

impl GroupPlan {
    /// Total participants seated at regular tables.
    pub fn seated(&self) -> usize {
        self.fours * 4 + self.threes * 3
    }

    /// Seat counts for each planned table, fours first.
    pub fn table_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![4; self.fours];
        sizes.extend(std::iter::repeat_n(3, self.threes));
        sizes
    }
}

/// Plan table sizes for `count` participants.
///
/// With 3-seat tables disabled the remainder modulo 4 goes to byes. With
/// them enabled, a remainder of 1 borrows from two full tables (three
/// 3-seat tables), a remainder of 2 borrows from one (two 3-seat tables),
/// and a remainder of 3 seats directly. Pools of at least
/// [`MIN_PARTICIPANTS`](crate::session::models::MIN_PARTICIPANTS) always
/// plan without byes when 3-seat tables are allowed; smaller leftovers
/// (possible after custom/winner carve-outs) fall back to byes.
pub fn plan(count: usize, allow_three_player_tables: bool) -> GroupPlan {
    let fours = count / 4;
    let remainder = count % 4;

    if !allow_three_player_tables {
        return GroupPlan {
            fours,
            threes: 0,
            byes: remainder,
        };
    }

    match remainder {
        0 => GroupPlan {
            fours,
            threes: 0,
            byes: 0,
        },
        1 if fours >= 2 => GroupPlan {
            fours: fours - 2,
            threes: 3,
            byes: 0,
        },
        2 if fours >= 1 => GroupPlan {
            fours: fours - 1,
            threes: 2,
            byes: 0,
        },
        3 => GroupPlan {
            fours,
            threes: 1,
            byes: 0,
        },
        // count in {1, 2, 5, 6}: too few full tables to borrow from
        _ => GroupPlan {
            fours,
            threes: 0,
            byes: remainder,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_multiple_of_four() {
        assert_eq!(
            plan(12, true),
            GroupPlan {
                fours: 3,
                threes: 0,
                byes: 0
            }
        );
    }

    #[test]
    fn test_remainder_one_borrows_two_tables() {
        // 9 = 0*4 + 3*3
        assert_eq!(
            plan(9, true),
            GroupPlan {
                fours: 0,
                threes: 3,
                byes: 0
            }
        );
        // 13 = 1*4 + 3*3
        assert_eq!(
            plan(13, true),
            GroupPlan {
                fours: 1,
                threes: 3,
                byes: 0
            }
        );
    }

    #[test]
    fn test_remainder_two_borrows_one_table() {
        // 6 = 0*4 + 2*3
        assert_eq!(
            plan(6, true),
            GroupPlan {
                fours: 0,
                threes: 2,
                byes: 0
            }
        );
        // 10 = 1*4 + 2*3
        assert_eq!(
            plan(10, true),
            GroupPlan {
                fours: 1,
                threes: 2,
                byes: 0
            }
        );
    }

    #[test]
    fn test_remainder_three_seats_directly() {
        // 7 = 1*4 + 1*3
        assert_eq!(
            plan(7, true),
            GroupPlan {
                fours: 1,
                threes: 1,
                byes: 0
            }
        );
    }

    #[test]
    fn test_three_player_tables_disabled() {
        let plan = plan(14, false);
        assert_eq!(plan.fours, 3);
        assert_eq!(plan.threes, 0);
        assert_eq!(plan.byes, 2);
    }

    #[test]
    fn test_small_leftovers_become_byes() {
        assert_eq!(plan(5, true).byes, 1);
        assert_eq!(plan(2, true).byes, 2);
        assert_eq!(plan(1, true).byes, 1);
        assert_eq!(plan(0, true).byes, 0);
    }

    #[test]
    fn test_seat_invariant_for_valid_pools() {
        for n in 6..200 {
            let plan = plan(n, true);
            assert_eq!(plan.seated() + plan.byes, n);
            assert_eq!(plan.byes, 0, "no byes expected for n={n}");
            assert!(plan.threes <= 3);
        }
    }

    #[test]
    fn test_table_sizes_order() {
        let plan = plan(11, true);
        assert_eq!(plan.table_sizes(), vec![4, 4, 3]);
    }
}
