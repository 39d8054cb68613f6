//! Timestamp-to-distance mapping for a sibling group

use crate::timestamps::epoch_seconds;
use repograph_core::config::LayoutConfig;
use repograph_core::node::Node;

/// Radial distance of each sibling, by index.
///
/// The most recently modified sibling gets `min_distance` and the oldest
/// `max_distance`, linearly in between. Equal timestamps all map to
/// `min_distance`. Siblings without a parseable timestamp, or every sibling
/// when none has one, get the midpoint.
pub fn sibling_distances(siblings: &[Node], config: &LayoutConfig) -> Vec<f64> {
    let timestamps: Vec<Option<f64>> = siblings
        .iter()
        .map(|s| s.last_modified.as_deref().and_then(epoch_seconds))
        .collect();

    let known = timestamps.iter().flatten().copied();
    let (min_ts, max_ts) = known.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), ts| {
        (lo.min(ts), hi.max(ts))
    });

    let mid = config.mid_distance();
    let span = config.max_distance - config.min_distance;

    timestamps
        .into_iter()
        .map(|ts| match ts {
            None => mid,
            Some(_) if max_ts == min_ts => config.min_distance,
            Some(ts) => config.min_distance + ((max_ts - ts) / (max_ts - min_ts)) * span,
        })
        .collect()
}
