//! Weighted discrete sampling
//!
//! Partitions [0, 1) into contiguous half-open ranges whose widths are the
//! normalized weights, then maps a uniform draw back to a value by binary
//! search over the range ends.

use crate::error::DistributionError;
use crate::rng::GameRng;

#[derive(Debug, Clone)]
struct WeightedEntry<T> {
    /// Exclusive upper end of this entry's range; the lower end is the
    /// previous entry's `end` (or 0.0)
    end: f64,
    value: T,
}

/// Immutable weighted distribution over a fixed set of values
#[derive(Debug, Clone)]
pub struct WeightedDistribution<T> {
    entries: Vec<WeightedEntry<T>>,
}

impl<T> WeightedDistribution<T> {
    /// Build a distribution from `(value, weight)` pairs.
    ///
    /// Every weight must be positive and finite and the list must not be
    /// empty.
    pub fn new<I>(pairs: I) -> Result<Self, DistributionError>
    where
        I: IntoIterator<Item = (T, f64)>,
    {
        let pairs: Vec<(T, f64)> = pairs.into_iter().collect();
        if pairs.is_empty() {
            return Err(DistributionError::Empty);
        }
        for (index, (_, weight)) in pairs.iter().enumerate() {
            if !weight.is_finite() || *weight <= 0.0 {
                return Err(DistributionError::NonPositiveWeight {
                    index,
                    weight: *weight,
                });
            }
        }

        let total: f64 = pairs.iter().map(|(_, w)| w).sum();
        let count = pairs.len();
        let mut cumulative = 0.0;
        let mut entries = Vec::with_capacity(count);
        for (i, (value, weight)) in pairs.into_iter().enumerate() {
            cumulative += weight;
            // Pin the last end to exactly 1.0 so rounding never leaves a gap
            let end = if i + 1 == count {
                1.0
            } else {
                cumulative / total
            };
            entries.push(WeightedEntry { end, value });
        }

        Ok(Self { entries })
    }

    /// Number of values in the distribution
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Probability assigned to the entry at `index`
    pub fn probability(&self, index: usize) -> Option<f64> {
        let entry = self.entries.get(index)?;
        let start = if index == 0 {
            0.0
        } else {
            self.entries[index - 1].end
        };
        Some(entry.end - start)
    }

    /// Value whose range contains `u`, for `u` in [0, 1).
    ///
    /// Values outside the interval are clamped onto it.
    pub fn value_at(&self, u: f64) -> &T {
        let u = u.clamp(0.0, 1.0);
        let idx = self.entries.partition_point(|entry| entry.end <= u);
        &self.entries[idx.min(self.entries.len() - 1)].value
    }

    /// Draw a value. Draws are independent.
    pub fn next_value(&self, rng: &mut GameRng) -> &T {
        self.value_at(rng.uniform())
    }

    /// Iterate over values in partition order
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|entry| &entry.value)
    }
}
