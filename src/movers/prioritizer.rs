//! Candidate selection for a movers scan.
//!
//! Fetching the whole universe on every request wastes provider quota, so a
//! scan looks at a bounded working set. With no recent volatility history the
//! set is seeded from the most liquid pairs plus a random sample of the rest.
//! Once history exists, the symbols that moved most recently are preferred and
//! random unseen symbols fill any gap, so sampling converges on active pairs.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

use super::universe::{candidate_floor, common_pairs, universe};
use crate::cache::VolatilitySample;
use crate::models::mover::AssetType;

pub struct PairPrioritizer {
    history_window: Duration,
}

impl PairPrioritizer {
    pub fn new(history_window: Duration) -> Self {
        Self { history_window }
    }

    /// `min(universe, max(requested * 2, floor))`.
    pub fn target_count(asset_type: AssetType, requested: usize) -> usize {
        universe(asset_type)
            .len()
            .min((requested * 2).max(candidate_floor(asset_type)))
    }

    pub fn select_candidates(
        &self,
        asset_type: AssetType,
        requested: usize,
        history: &[VolatilitySample],
    ) -> Vec<String> {
        self.select_candidates_with_rng(
            asset_type,
            requested,
            history,
            Utc::now(),
            &mut rand::thread_rng(),
        )
    }

    pub fn select_candidates_with_rng<R: Rng + ?Sized>(
        &self,
        asset_type: AssetType,
        requested: usize,
        history: &[VolatilitySample],
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<String> {
        let target = Self::target_count(asset_type, requested);
        let members = universe(asset_type);

        let mut fresh: Vec<&VolatilitySample> = history
            .iter()
            .filter(|s| members.contains(&s.symbol.as_str()))
            .filter(|s| self.is_fresh(s, now))
            .collect();

        let mut selected: Vec<String> = Vec::with_capacity(target);
        if fresh.is_empty() {
            debug!(
                asset_type = %asset_type,
                target = target,
                "PairPrioritizer: cold start, seeding {} candidates from common pairs",
                target
            );
            selected.extend(
                common_pairs(asset_type)
                    .iter()
                    .take(target)
                    .map(|s| s.to_string()),
            );
        } else {
            fresh.sort_by(|a, b| {
                b.abs_movement
                    .cmp(&a.abs_movement)
                    .then_with(|| a.symbol.cmp(&b.symbol))
            });
            debug!(
                asset_type = %asset_type,
                known = fresh.len(),
                target = target,
                "PairPrioritizer: ranking {} symbols with recent volatility",
                fresh.len()
            );
            selected.extend(fresh.iter().take(target).map(|s| s.symbol.clone()));
        }

        fill_randomly(&mut selected, members, target, rng);
        selected
    }

    fn is_fresh(&self, sample: &VolatilitySample, now: DateTime<Utc>) -> bool {
        let window = chrono::Duration::seconds(self.history_window.as_secs() as i64);
        now.signed_duration_since(sample.observed_at) <= window
    }
}

fn fill_randomly<R: Rng + ?Sized>(
    selected: &mut Vec<String>,
    members: &[&str],
    target: usize,
    rng: &mut R,
) {
    if selected.len() >= target {
        return;
    }
    let taken: HashSet<String> = selected.iter().cloned().collect();
    let mut rest: Vec<&str> = members
        .iter()
        .copied()
        .filter(|s| !taken.contains(*s))
        .collect();
    rest.shuffle(rng);
    let missing = target - selected.len();
    selected.extend(rest.into_iter().take(missing).map(str::to_string));
}
