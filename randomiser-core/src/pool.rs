use rand::Rng;
use std::collections::BTreeMap;

/// Weighted multiset used to spread assignments evenly across a catalog.
///
/// Items are keyed in a `BTreeMap` so draws walk the pool in a stable order
/// and a given seed always produces the same sequence.
#[derive(Clone, Debug)]
pub struct PoolDistributor<T: Ord + Clone> {
    weights: BTreeMap<T, u32>,
}

impl<T: Ord + Clone> Default for PoolDistributor<T> {
    fn default() -> Self {
        Self { weights: BTreeMap::new() }
    }
}

impl<T: Ord + Clone> PoolDistributor<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: T) {
        self.add_weighted(item, 1);
    }

    pub fn add_weighted(&mut self, item: T, weight: u32) {
        let entry = self.weights.entry(item).or_insert(0);
        *entry = entry.saturating_add(weight);
    }

    pub fn add_all<I: IntoIterator<Item = T>>(&mut self, items: I) {
        for item in items {
            self.add(item);
        }
    }

    /// Items that can still be drawn.
    pub fn possible_results(&self) -> Vec<T> {
        self.weights
            .iter()
            .filter(|(_, &w)| w > 0)
            .map(|(item, _)| item.clone())
            .collect()
    }

    pub fn count(&self, item: &T) -> u32 {
        self.weights.get(item).copied().unwrap_or(0)
    }

    pub fn total_weight(&self) -> u64 {
        self.weights.values().map(|&w| u64::from(w)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_weight() == 0
    }

    pub fn remove(&mut self, item: &T, fully_remove: bool) {
        if let Some(weight) = self.weights.get_mut(item) {
            if fully_remove {
                *weight = 0;
            } else {
                *weight = weight.saturating_sub(1);
            }
        }
    }

    /// Pick an item with probability proportional to its remaining weight.
    /// Returns `None` when nothing is left to draw.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R, consume: bool) -> Option<T> {
        let total = self.total_weight();
        if total == 0 {
            return None;
        }

        let mut roll = rng.gen_range(0..total);
        let mut picked = None;
        for (item, &weight) in &self.weights {
            let weight = u64::from(weight);
            if roll < weight {
                picked = Some(item.clone());
                break;
            }
            roll -= weight;
        }

        let item = picked?;
        if consume {
            self.remove(&item, false);
        }
        Some(item)
    }

    /// Draw from the part of the pool that intersects `subset`.
    ///
    /// When none of `subset` is left in the pool the whole `catalog` is
    /// added back first. The drawn item loses one unit of weight.
    pub fn draw_from_subset<R: Rng + ?Sized>(
        &mut self,
        subset: &[T],
        catalog: &[T],
        rng: &mut R,
    ) -> Option<T> {
        if subset.iter().all(|item| self.count(item) == 0) {
            self.add_all(catalog.iter().cloned());
        }

        let mut restricted = PoolDistributor::new();
        for item in subset {
            let count = self.count(item);
            if count > 0 && restricted.count(item) == 0 {
                restricted.add_weighted(item.clone(), count);
            }
        }

        let item = restricted.draw(rng, true)?;
        self.remove(&item, false);
        Some(item)
    }
}
