//! Count vectors with an explicit active mask.
//!
//! Positions are stable identifiers: removing a category flips its mask bit
//! and never shifts the remaining entries, so indices reported to callers
//! always refer to the original vector.

use crate::error::{OutlierError, Result};
use lt_math::MathError;

/// Non-negative per-category counts plus the set of categories still active.
#[derive(Debug, Clone, PartialEq)]
pub struct CountVector {
    values: Vec<f64>,
    active: Vec<bool>,
}

impl CountVector {
    /// Build a vector from raw values.
    ///
    /// NaN marks a missing entry: it starts inactive. Every other value must be
    /// finite and non-negative.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(MathError::EmptyInput.into());
        }

        let mut active = Vec::with_capacity(values.len());
        for (index, &value) in values.iter().enumerate() {
            if value.is_nan() {
                active.push(false);
                continue;
            }
            if !value.is_finite() || value < 0.0 {
                return Err(OutlierError::InvalidCount { index, value });
            }
            active.push(true);
        }

        Ok(Self { values, active })
    }

    /// Build a vector from integer tallies.
    pub fn from_counts(counts: &[u64]) -> Result<Self> {
        Self::new(counts.iter().map(|&c| c as f64).collect())
    }

    /// Original length, including inactive entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false: construction rejects empty input.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index` if that category is still active.
    pub fn get(&self, index: usize) -> Option<f64> {
        match self.active.get(index) {
            Some(true) => Some(self.values[index]),
            _ => None,
        }
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active.get(index).copied().unwrap_or(false)
    }

    /// Number of active categories.
    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|&&a| a).count()
    }

    /// Active values in original order.
    pub fn active_values(&self) -> Vec<f64> {
        self.iter_active().map(|(_, v)| v).collect()
    }

    /// Sum of active values.
    pub fn active_total(&self) -> f64 {
        self.iter_active().map(|(_, v)| v).sum()
    }

    /// Mask parallel to the original vector; `true` means still active.
    pub fn active_mask(&self) -> &[bool] {
        &self.active
    }

    /// Exclude `index` from all further computations.
    ///
    /// Returns whether the category was active before the call.
    pub fn deactivate(&mut self, index: usize) -> bool {
        match self.active.get_mut(index) {
            Some(slot) if *slot => {
                *slot = false;
                true
            }
            _ => false,
        }
    }

    /// Index of the largest active value; ties go to the lowest index.
    pub fn argmax_active(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (index, value) in self.iter_active() {
            match best {
                Some((_, max)) if value <= max => {}
                _ => best = Some((index, value)),
            }
        }
        best.map(|(index, _)| index)
    }

    fn iter_active(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values
            .iter()
            .zip(&self.active)
            .enumerate()
            .filter_map(|(i, (&v, &a))| a.then_some((i, v)))
    }
}
