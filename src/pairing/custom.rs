//! Custom table resolver.
//!
//! Carves host/player-curated groups out of the pool before automatic
//! seating. A group with a full complement (or auto-fill disabled) becomes
//! a fixed table as-is; a smaller auto-fill group stays open and gets its
//! remaining seats filled later. A group reduced to a single member is
//! dissolved back into the general pool.

use std::collections::HashMap;

use crate::session::models::{Participant, ParticipantId};

/// A curated group that seats as-is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedGroup {
    pub group_id: String,
    pub members: Vec<ParticipantId>,
}

/// A curated group whose remaining seats are auto-filled.
/// The target size is decided during generation, once the size of the
/// leftover pool is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenGroup {
    pub group_id: String,
    pub members: Vec<ParticipantId>,
}

/// Outcome of carving custom groups out of the pool
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CustomResolution {
    /// Complete groups, emitted directly as final tables
    pub fixed: Vec<FixedGroup>,
    /// Open groups awaiting auto-fill
    pub open: Vec<OpenGroup>,
    /// Members of dissolved single-member groups; callers must clear
    /// their custom-group id and auto-fill flag
    pub dissolved: Vec<ParticipantId>,
}

/// Partition the pool's custom groups into fixed, open, and dissolved.
///
/// A group is complete when it has at least `max_table_size` members or
/// auto-fill is off for its members.
pub fn resolve(participants: &[&Participant], max_table_size: usize) -> CustomResolution {
    let mut groups: HashMap<String, Vec<&Participant>> = HashMap::new();
    for participant in participants {
        if let Some(group_id) = participant.custom_group.as_deref()
            && !group_id.is_empty()
        {
            groups
                .entry(group_id.to_owned())
                .or_default()
                .push(participant);
        }
    }

    let mut resolution = CustomResolution::default();
    // Deterministic iteration keeps behavior reproducible across calls
    // with the same pool; the final table shuffle adds the randomness.
    let mut group_ids: Vec<String> = groups.keys().cloned().collect();
    group_ids.sort();

    for group_id in group_ids {
        let members = &groups[&group_id];

        if members.len() == 1 {
            resolution.dissolved.push(members[0].id.clone());
            continue;
        }

        let member_ids: Vec<ParticipantId> = members.iter().map(|p| p.id.clone()).collect();
        let auto_fill = members.iter().all(|p| p.auto_fill);

        if members.len() >= max_table_size || !auto_fill {
            resolution.fixed.push(FixedGroup {
                group_id,
                members: member_ids,
            });
        } else {
            resolution.open.push(OpenGroup {
                group_id,
                members: member_ids,
            });
        }
    }

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(id: &str, group: Option<&str>, auto_fill: bool) -> Participant {
        let mut p = Participant::new(id.into(), id.into());
        p.custom_group = group.map(str::to_owned);
        p.auto_fill = auto_fill;
        p
    }

    #[test]
    fn test_ungrouped_participants_untouched() {
        let pool = vec![participant("a", None, false), participant("b", None, false)];
        let refs: Vec<&Participant> = pool.iter().collect();

        let resolution = resolve(&refs, 4);
        assert!(resolution.fixed.is_empty());
        assert!(resolution.open.is_empty());
        assert!(resolution.dissolved.is_empty());
    }

    #[test]
    fn test_full_group_is_fixed() {
        let pool = vec![
            participant("a", Some("g1"), true),
            participant("b", Some("g1"), true),
            participant("c", Some("g1"), true),
            participant("d", Some("g1"), true),
        ];
        let refs: Vec<&Participant> = pool.iter().collect();

        let resolution = resolve(&refs, 4);
        assert_eq!(resolution.fixed.len(), 1);
        assert_eq!(resolution.fixed[0].members.len(), 4);
        assert!(resolution.open.is_empty());
    }

    #[test]
    fn test_no_autofill_group_is_fixed_even_when_small() {
        let pool = vec![
            participant("a", Some("g1"), false),
            participant("b", Some("g1"), false),
        ];
        let refs: Vec<&Participant> = pool.iter().collect();

        let resolution = resolve(&refs, 4);
        assert_eq!(resolution.fixed.len(), 1);
        assert_eq!(resolution.fixed[0].members.len(), 2);
    }

    #[test]
    fn test_small_autofill_group_stays_open() {
        let pool = vec![
            participant("a", Some("g1"), true),
            participant("b", Some("g1"), true),
        ];
        let refs: Vec<&Participant> = pool.iter().collect();

        let resolution = resolve(&refs, 4);
        assert!(resolution.fixed.is_empty());
        assert_eq!(resolution.open.len(), 1);
        assert_eq!(resolution.open[0].members, vec!["a", "b"]);
    }

    #[test]
    fn test_single_member_group_dissolves() {
        let pool = vec![
            participant("a", Some("g1"), true),
            participant("b", Some("g2"), true),
            participant("c", Some("g2"), true),
        ];
        let refs: Vec<&Participant> = pool.iter().collect();

        let resolution = resolve(&refs, 4);
        assert_eq!(resolution.dissolved, vec!["a"]);
        assert_eq!(resolution.open.len(), 1);
    }

    #[test]
    fn test_empty_group_id_means_none() {
        let pool = vec![participant("a", Some(""), true)];
        let refs: Vec<&Participant> = pool.iter().collect();

        let resolution = resolve(&refs, 4);
        assert!(resolution.dissolved.is_empty());
        assert!(resolution.open.is_empty());
    }
}
