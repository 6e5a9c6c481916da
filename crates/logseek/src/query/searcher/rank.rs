use crate::types::{parse_id, SearchHit, SortBy};
use rand::seq::SliceRandom;
use std::cmp::Reverse;

/// Orders hits in place. `frequency` ties fall back to id descending so the
/// ordering stays deterministic; ids that fail to parse order as 0.
pub(super) fn sort_hits(hits: &mut [SearchHit], sort_by: SortBy) {
    match sort_by {
        SortBy::Newest => hits.sort_by_key(|h| Reverse(parse_id(&h.id))),
        SortBy::Oldest => hits.sort_by_key(|h| parse_id(&h.id)),
        SortBy::Frequency => hits.sort_by(|a, b| {
            b.match_count
                .cmp(&a.match_count)
                .then_with(|| parse_id(&b.id).cmp(&parse_id(&a.id)))
        }),
        SortBy::Random => hits.shuffle(&mut rand::thread_rng()),
    }
}
