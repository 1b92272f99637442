//! Deciding which candidate videos still need to go into the managed playlist.

use crate::Video;
use std::collections::HashSet;

/// Returns the ids of `candidates` that aren't in `existing_ids`, in candidate order.
///
/// Identity is the exact video id; titles and channels play no part. Candidates are
/// assumed to be distinct already, so nothing is deduplicated among them.
pub fn reconcile(existing_ids: &HashSet<String>, candidates: &[Video]) -> Vec<String> {
    candidates
        .iter()
        .filter(|video| !existing_ids.contains(&video.id))
        .map(|video| video.id.clone())
        .collect()
}
