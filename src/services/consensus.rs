use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::models::{ConsensusItem, GroupConsensus, MemberSwipe};

pub const NO_LIKES_MESSAGE: &str = "No items have been liked by the group yet.";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConsensusError {
    #[error("group has no members")]
    NoMembers,
}

/// Per-item tally; each member is counted at most once per side
#[derive(Debug, Default)]
struct ItemTally<'a> {
    name: Option<&'a str>,
    category: Option<&'a str>,
    liked_by: BTreeSet<&'a str>,
    disliked_by: BTreeSet<&'a str>,
}

/// Aggregates every member's swipes into a group decision.
///
/// Items are ranked by how many members liked them. An item liked by every
/// member is a final selection; one that split the group is a conflict.
pub fn build_consensus(
    group_id: &str,
    member_swipes: &BTreeMap<String, Vec<MemberSwipe>>,
) -> Result<GroupConsensus, ConsensusError> {
    if member_swipes.is_empty() {
        return Err(ConsensusError::NoMembers);
    }

    let total_members = member_swipes.len();
    let mut tallies: BTreeMap<&str, ItemTally<'_>> = BTreeMap::new();

    for (member, swipes) in member_swipes {
        for swipe in swipes {
            let tally = tallies.entry(swipe.item_id.as_str()).or_default();
            tally.name = tally.name.or(swipe.name.as_deref());
            tally.category = tally.category.or(swipe.category.as_deref());
            if swipe.liked {
                tally.liked_by.insert(member.as_str());
            } else {
                tally.disliked_by.insert(member.as_str());
            }
        }
    }

    let mut top_items: Vec<ConsensusItem> = tallies
        .iter()
        .filter(|(_, tally)| !tally.liked_by.is_empty())
        .map(|(item_id, tally)| {
            let likes = tally.liked_by.len();
            ConsensusItem {
                item_id: item_id.to_string(),
                name: tally
                    .name
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Item {}", item_id)),
                category: tally.category.map(str::to_string),
                likes,
                approval_score_percent: approval_percent(likes, total_members),
            }
        })
        .collect();
    top_items.sort_by(|a, b| b.likes.cmp(&a.likes).then_with(|| a.item_id.cmp(&b.item_id)));

    let final_selections: Vec<String> = top_items
        .iter()
        .filter(|item| item.likes == total_members)
        .map(|item| item.item_id.clone())
        .collect();

    let conflict_items: Vec<String> = tallies
        .iter()
        .filter(|(_, tally)| !tally.liked_by.is_empty() && !tally.disliked_by.is_empty())
        .map(|(item_id, _)| item_id.to_string())
        .collect();

    let message = top_items.is_empty().then(|| NO_LIKES_MESSAGE.to_string());

    tracing::debug!(
        group_id = %group_id,
        members = total_members,
        liked_items = top_items.len(),
        selections = final_selections.len(),
        conflicts = conflict_items.len(),
        "Group consensus computed"
    );

    Ok(GroupConsensus {
        group_id: group_id.to_string(),
        total_members,
        consensus_reached: !final_selections.is_empty(),
        top_items,
        final_selections,
        conflict_items,
        message,
    })
}

fn approval_percent(likes: usize, members: usize) -> f64 {
    let percent = likes as f64 / members as f64 * 100.0;
    (percent * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swipes(entries: &[(&str, bool)]) -> Vec<MemberSwipe> {
        entries
            .iter()
            .map(|(id, liked)| MemberSwipe::new(id, *liked))
            .collect()
    }

    fn group(members: &[(&str, Vec<MemberSwipe>)]) -> BTreeMap<String, Vec<MemberSwipe>> {
        members
            .iter()
            .map(|(member, swipes)| (member.to_string(), swipes.clone()))
            .collect()
    }

    #[test]
    fn test_no_members_is_an_error() {
        assert_eq!(
            build_consensus("g1", &BTreeMap::new()),
            Err(ConsensusError::NoMembers)
        );
    }

    #[test]
    fn test_unanimous_like_is_final_selection() {
        let members = group(&[
            ("asha", swipes(&[("goa", true), ("ooty", true)])),
            ("ravi", swipes(&[("goa", true), ("ooty", false)])),
            ("meera", swipes(&[("goa", true)])),
        ]);
        let consensus = build_consensus("g1", &members).unwrap();

        assert_eq!(consensus.total_members, 3);
        assert_eq!(consensus.final_selections, vec!["goa"]);
        assert_eq!(consensus.conflict_items, vec!["ooty"]);
        assert!(consensus.consensus_reached);

        assert_eq!(consensus.top_items[0].item_id, "goa");
        assert_eq!(consensus.top_items[0].approval_score_percent, 100.0);
        assert_eq!(consensus.top_items[1].item_id, "ooty");
        assert_eq!(consensus.top_items[1].approval_score_percent, 33.33);
        assert_eq!(consensus.top_items[1].name, "Item ooty");
    }

    #[test]
    fn test_repeated_swipes_count_once() {
        let members = group(&[
            ("asha", swipes(&[("goa", true), ("goa", true), ("goa", true)])),
            ("ravi", swipes(&[("goa", false)])),
        ]);
        let consensus = build_consensus("g1", &members).unwrap();
        assert_eq!(consensus.top_items[0].likes, 1);
        assert_eq!(consensus.top_items[0].approval_score_percent, 50.0);
        assert!(!consensus.consensus_reached);
    }

    #[test]
    fn test_ties_ordered_by_item_id() {
        let members = group(&[
            ("a", swipes(&[("zanskar", true), ("alleppey", true)])),
            ("b", swipes(&[("munnar", true)])),
        ]);
        let ids: Vec<String> = build_consensus("g1", &members)
            .unwrap()
            .top_items
            .into_iter()
            .map(|item| item.item_id)
            .collect();
        assert_eq!(ids, vec!["alleppey", "munnar", "zanskar"]);
    }

    #[test]
    fn test_names_come_from_swipes() {
        let mut swipe = MemberSwipe::new("h1", true);
        swipe.name = Some("Taj Lake Palace".to_string());
        swipe.category = Some("accommodation".to_string());
        let members = group(&[("a", vec![swipe])]);

        let item = &build_consensus("g1", &members).unwrap().top_items[0];
        assert_eq!(item.name, "Taj Lake Palace");
        assert_eq!(item.category.as_deref(), Some("accommodation"));
    }

    #[test]
    fn test_nothing_liked_yet() {
        let members = group(&[("a", swipes(&[("goa", false)])), ("b", vec![])]);
        let consensus = build_consensus("g1", &members).unwrap();
        assert!(consensus.top_items.is_empty());
        assert!(!consensus.consensus_reached);
        assert_eq!(consensus.message.as_deref(), Some(NO_LIKES_MESSAGE));
    }
}
