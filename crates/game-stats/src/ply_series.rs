//! Sparse per-ply numeric series, exported dense.

use std::collections::BTreeMap;

use serde::ser::{Serialize, Serializer};

/// Mapping from ply index to a value. Stored sparse; serialized as a dense
/// array from ply 0 to the highest observed ply with gaps filled by zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlySeries(BTreeMap<usize, f64>);

impl PlySeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, ply: usize, value: f64) {
        *self.0.entry(ply).or_insert(0.0) += value;
    }

    pub fn set(&mut self, ply: usize, value: f64) {
        self.0.insert(ply, value);
    }

    pub fn get(&self, ply: usize) -> f64 {
        self.0.get(&ply).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of observed plies (not the dense length).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn max_ply(&self) -> Option<usize> {
        self.0.keys().next_back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.0.iter().map(|(&k, &v)| (k, v))
    }

    pub fn merge(&mut self, other: &PlySeries) {
        for (ply, value) in other.iter() {
            self.add(ply, value);
        }
    }

    /// Divide every value by `divisor`; a zero divisor yields zero.
    pub fn divide_by(&mut self, divisor: f64) {
        for value in self.0.values_mut() {
            *value = ratio(*value, divisor);
        }
    }

    /// Divide each ply by the value `divisors` holds at the same ply.
    pub fn divide_by_series(&mut self, divisors: &PlySeries) {
        for (ply, value) in self.0.iter_mut() {
            *value = ratio(*value, divisors.get(*ply));
        }
    }

    pub fn to_dense(&self) -> Vec<f64> {
        match self.max_ply() {
            Some(max) => (0..=max).map(|ply| self.get(ply)).collect(),
            None => Vec::new(),
        }
    }
}

fn ratio(value: f64, divisor: f64) -> f64 {
    if divisor == 0.0 {
        0.0
    } else {
        value / divisor
    }
}

impl Serialize for PlySeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.to_dense())
    }
}
