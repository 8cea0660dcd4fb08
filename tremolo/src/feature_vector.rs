//! Sparse feature vectors over string keys.

use hashbrown::HashMap;

/// A sparse mapping from feature strings to real-valued weights.
///
/// The same type serves as the per-state feature representation of an
/// assignment and as the global weight vector of the linear model. Missing
/// keys read as zero and no operation fails on them.
#[derive(Debug, Clone, Default)]
pub struct FeatureVector {
    map: HashMap<String, f64>,
}

impl FeatureVector {
    /// Creates a new empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty vector with capacity for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
        }
    }

    /// Returns the weight of `key`, or `None` when absent.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.map.get(key).copied()
    }

    /// Accumulates `value` into `key`, creating the entry if absent.
    pub fn add(&mut self, key: &str, value: f64) {
        *self.map.entry_ref(key).or_insert(0.0) += value;
    }

    /// Computes the dot product with `other`.
    ///
    /// Iterates the smaller of the two vectors; the operation is
    /// commutative.
    pub fn dot(&self, other: &Self) -> f64 {
        let (small, large) = if self.map.len() <= other.map.len() {
            (&self.map, &other.map)
        } else {
            (&other.map, &self.map)
        };
        small
            .iter()
            .filter_map(|(key, v1)| large.get(key).map(|v2| v1 * v2))
            .sum()
    }

    /// Adds `other` scaled by `factor` into this vector, creating entries
    /// as needed. Keys present only in `self` are left untouched.
    pub fn plus_equals(&mut self, other: &Self, factor: f64) {
        for (key, value) in &other.map {
            self.add(key, value * factor);
        }
    }

    /// Adds `(a - b) * factor` into this vector over the union of the keys
    /// of `a` and `b`, treating missing keys as zero.
    ///
    /// This is the perceptron update: reward the features of the gold
    /// structure, penalize the features of the predicted one. Exact-zero
    /// deltas are skipped so dead keys do not accumulate.
    pub fn add_delta(&mut self, a: &Self, b: &Self, factor: f64) {
        for (key, &va) in &a.map {
            let vb = b.map.get(key).copied().unwrap_or(0.0);
            let delta = (va - vb) * factor;
            if delta != 0.0 {
                self.add(key, delta);
            }
        }
        for (key, &vb) in &b.map {
            if !a.map.contains_key(key) {
                let delta = -vb * factor;
                if delta != 0.0 {
                    self.add(key, delta);
                }
            }
        }
    }

    /// Scales every weight in place.
    pub fn multiply(&mut self, factor: f64) {
        for value in self.map.values_mut() {
            *value *= factor;
        }
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Checks if the vector stores no keys.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Creates an iterator over `(key, weight)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.map.iter().map(|(key, &value)| (key.as_str(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(pairs: &[(&str, f64)]) -> FeatureVector {
        let mut fv = FeatureVector::new();
        for &(key, value) in pairs {
            fv.add(key, value);
        }
        fv
    }

    #[test]
    fn test_add_accumulates() {
        let mut fv = FeatureVector::new();
        fv.add("f", 1.5);
        fv.add("f", 2.0);
        assert_eq!(fv.get("f"), Some(3.5));
        assert_eq!(fv.len(), 1);
    }

    #[test]
    fn test_dot_is_symmetric() {
        let a = vector(&[("x", 2.0), ("y", -1.0), ("z", 4.0)]);
        let b = vector(&[("y", 3.0), ("z", 0.5)]);
        assert_eq!(a.dot(&b), b.dot(&a));
        assert_eq!(a.dot(&b), -3.0 + 2.0);
    }

    #[test]
    fn test_dot_with_disjoint_keys() {
        let a = vector(&[("x", 2.0)]);
        let b = vector(&[("y", 3.0)]);
        assert_eq!(a.dot(&b), 0.0);
    }

    #[test]
    fn test_plus_equals() {
        let mut a = vector(&[("x", 1.0), ("y", 2.0)]);
        let b = vector(&[("y", 1.0), ("z", 3.0)]);
        a.plus_equals(&b, 2.0);
        assert_eq!(a.get("x"), Some(1.0));
        assert_eq!(a.get("y"), Some(4.0));
        assert_eq!(a.get("z"), Some(6.0));
    }

    #[test]
    fn test_add_delta() {
        let a = vector(&[("x", 1.0), ("y", 2.0)]);
        let b = vector(&[("y", 1.0), ("z", 3.0)]);
        let mut result = FeatureVector::new();
        result.add_delta(&a, &b, 2.0);
        assert_eq!(result.get("x"), Some(2.0));
        assert_eq!(result.get("y"), Some(2.0));
        assert_eq!(result.get("z"), Some(-6.0));
    }

    #[test]
    fn test_add_delta_skips_exact_zero() {
        let a = vector(&[("x", 1.0)]);
        let b = vector(&[("x", 1.0)]);
        let mut result = FeatureVector::new();
        result.add_delta(&a, &b, 1.0);
        assert!(result.is_empty());
    }

    #[test]
    fn test_multiply() {
        let mut fv = vector(&[("x", 2.0), ("y", -4.0)]);
        fv.multiply(0.5);
        assert_eq!(fv.get("x"), Some(1.0));
        assert_eq!(fv.get("y"), Some(-2.0));
    }

    #[test]
    fn test_clone_is_deep() {
        let mut a = vector(&[("x", 1.0)]);
        let b = a.clone();
        a.add("x", 1.0);
        assert_eq!(b.get("x"), Some(1.0));
        assert_eq!(a.get("x"), Some(2.0));
    }
}
