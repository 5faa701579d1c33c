//! Two-hop ("friends of friends") computation.
//!
//! The repositories only hand over raw edges; everything that decides who is a
//! two-hop friend lives here so that every store answers the same way.

use std::collections::{BTreeMap, HashSet};

use crate::modules::friend::model::{FriendLinkRow, FriendResponse};

/// Candidates `w` reachable as `seed -> m -> w` where `m` is a direct friend.
///
/// A candidate is dropped when it is the seed itself, already a direct friend,
/// or blocked by the seed. Blocks held by the candidate against the seed are
/// not considered. Each candidate appears once, ordered by id ascending.
pub fn friends_of_friends(
    seed: i64,
    direct: &[FriendResponse],
    second_hop: Vec<FriendLinkRow>,
    blocked: &HashSet<i64>,
) -> Vec<FriendResponse> {
    let direct_ids: HashSet<i64> = direct.iter().map(|f| f.id).collect();

    let mut candidates: BTreeMap<i64, String> = BTreeMap::new();
    for link in second_hop {
        if !direct_ids.contains(&link.owner_id) {
            continue;
        }
        if link.id == seed || direct_ids.contains(&link.id) || blocked.contains(&link.id) {
            continue;
        }
        candidates.entry(link.id).or_insert(link.name);
    }

    candidates.into_iter().map(|(id, name)| FriendResponse { id, name }).collect()
}
