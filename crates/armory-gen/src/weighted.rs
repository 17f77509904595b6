//! Weighted pools and the cumulative-distribution sampler.
//!
//! A [`WeightedPool`] maps template ids to relative weights. Drawing never
//! mutates the pool; constrained draws (retry loops) clone the pool into a
//! working copy and remove rejected candidates from the copy only.
//!
//! The sampler is generic over any [`Rng`], so tests inject a seeded
//! `SmallRng` and get reproducible draws.

use std::collections::BTreeMap;

use armory_types::{TemplateId, WeightMap};
use rand::Rng;

/// Roll a percentage chance. `0` never succeeds, `100` or more always does.
pub fn roll_chance<R: Rng + ?Sized>(rng: &mut R, percent: u32) -> bool {
    if percent >= 100 {
        return true;
    }
    if percent == 0 {
        return false;
    }
    rng.random_range(0..100_u32) < percent
}

/// Uniform integer in an inclusive range, tolerating `min > max` by
/// swapping the bounds.
pub fn random_between<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> u32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    rng.random_range(lo..=hi)
}

/// Draw a key from any `(key, weight)` sequence using a cumulative
/// distribution. Returns `None` when the total weight is zero.
pub fn draw_weighted<'a, K, R, I>(entries: I, rng: &mut R) -> Option<&'a K>
where
    K: 'a,
    R: Rng + ?Sized,
    I: IntoIterator<Item = (&'a K, &'a u32)> + Clone,
{
    let total: u64 = entries
        .clone()
        .into_iter()
        .fold(0_u64, |acc, (_, &w)| acc.saturating_add(u64::from(w)));
    if total == 0 {
        return None;
    }
    let roll = rng.random_range(0..total);
    let mut cumulative: u64 = 0;
    for (key, &weight) in entries {
        cumulative = cumulative.saturating_add(u64::from(weight));
        if roll < cumulative {
            return Some(key);
        }
    }
    None
}

/// Mapping from template id to positive relative weight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeightedPool {
    entries: BTreeMap<TemplateId, u32>,
}

impl WeightedPool {
    /// Create an empty pool.
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Build a pool from a raw weight map, dropping zero weights.
    pub fn from_weights(weights: &WeightMap) -> Self {
        let entries = weights
            .iter()
            .filter(|(_, w)| **w > 0)
            .map(|(tpl, w)| (tpl.clone(), *w))
            .collect();
        Self { entries }
    }

    /// Insert or overwrite an entry. Zero weights are ignored.
    pub fn insert(&mut self, tpl: TemplateId, weight: u32) {
        if weight > 0 {
            self.entries.insert(tpl, weight);
        }
    }

    /// Merge another pool in, keeping the larger weight on collisions.
    pub fn merge_max(&mut self, other: &Self) {
        for (tpl, &weight) in &other.entries {
            let slot = self.entries.entry(tpl.clone()).or_insert(0);
            *slot = (*slot).max(weight);
        }
    }

    /// Remove an entry from this pool.
    pub fn remove(&mut self, tpl: &TemplateId) -> Option<u32> {
        self.entries.remove(tpl)
    }

    /// Keep only entries matching the predicate.
    pub fn retain(&mut self, mut keep: impl FnMut(&TemplateId) -> bool) {
        self.entries.retain(|tpl, _| keep(tpl));
    }

    /// Copy of this pool restricted to entries matching the predicate.
    #[must_use]
    pub fn filtered(&self, mut keep: impl FnMut(&TemplateId) -> bool) -> Self {
        let entries = self
            .entries
            .iter()
            .filter(|(tpl, _)| keep(tpl))
            .map(|(tpl, w)| (tpl.clone(), *w))
            .collect();
        Self { entries }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pool has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the pool holds `tpl`.
    pub fn contains(&self, tpl: &TemplateId) -> bool {
        self.entries.contains_key(tpl)
    }

    /// Weight of `tpl`, if present.
    pub fn weight(&self, tpl: &TemplateId) -> Option<u32> {
        self.entries.get(tpl).copied()
    }

    /// Sum of all weights.
    pub fn total_weight(&self) -> u64 {
        self.entries
            .values()
            .fold(0_u64, |acc, &w| acc.saturating_add(u64::from(w)))
    }

    /// Iterate template ids in key order.
    pub fn templates(&self) -> impl Iterator<Item = &TemplateId> {
        self.entries.keys()
    }

    /// Iterate `(template, weight)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&TemplateId, u32)> {
        self.entries.iter().map(|(tpl, w)| (tpl, *w))
    }

    /// Draw one template proportionally to weight. `None` if the total
    /// weight is zero.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&TemplateId> {
        draw_weighted(&self.entries, rng)
    }
}

impl FromIterator<(TemplateId, u32)> for WeightedPool {
    fn from_iter<T: IntoIterator<Item = (TemplateId, u32)>>(iter: T) -> Self {
        let mut pool = Self::new();
        for (tpl, weight) in iter {
            pool.insert(tpl, weight);
        }
        pool
    }
}

/// Draw an item count from a `count -> weight` table. Empty or all-zero
/// tables yield zero.
pub fn draw_count<R: Rng + ?Sized>(weights: &BTreeMap<u32, u32>, rng: &mut R) -> u32 {
    draw_weighted(weights, rng).copied().unwrap_or(0)
}
