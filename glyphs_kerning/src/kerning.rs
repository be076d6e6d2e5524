//! The sparse per-master pair table.

use std::collections::BTreeMap;

use crate::key::KerningKey;

/// Kerning for one master: left key to right key to value.
///
/// A pair without an entry reads as 0. Empty rows are never kept, so the
/// set of explicit pairs is exactly what [`KerningTable::iter`] visits.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KerningTable {
    pairs: BTreeMap<KerningKey, BTreeMap<KerningKey, f64>>,
}

impl KerningTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The value for a pair; absent pairs are 0.
    pub fn get(&self, left: &KerningKey, right: &KerningKey) -> f64 {
        self.get_explicit(left, right).unwrap_or(0.0)
    }

    pub fn get_explicit(&self, left: &KerningKey, right: &KerningKey) -> Option<f64> {
        self.pairs.get(left).and_then(|row| row.get(right)).copied()
    }

    pub fn contains(&self, left: &KerningKey, right: &KerningKey) -> bool {
        self.get_explicit(left, right).is_some()
    }

    /// Set a pair, creating it if needed. Returns the previous explicit value.
    pub fn set(&mut self, left: KerningKey, right: KerningKey, value: f64) -> Option<f64> {
        self.pairs.entry(left).or_default().insert(right, value)
    }

    pub fn remove(&mut self, left: &KerningKey, right: &KerningKey) -> Option<f64> {
        let row = self.pairs.get_mut(left)?;
        let value = row.remove(right);
        if row.is_empty() {
            self.pairs.remove(left);
        }
        value
    }

    /// All entries whose left key is `left`.
    pub fn row(&self, left: &KerningKey) -> Option<&BTreeMap<KerningKey, f64>> {
        self.pairs.get(left)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&KerningKey, &BTreeMap<KerningKey, f64>)> {
        self.pairs.iter()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&KerningKey, &KerningKey, f64)> {
        self.pairs
            .iter()
            .flat_map(|(left, row)| row.iter().map(move |(right, value)| (left, right, *value)))
    }

    /// Mutable access to the values of existing pairs. Keys cannot change
    /// and no pair can be added this way.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&KerningKey, &KerningKey, &mut f64)> {
        self.pairs
            .iter_mut()
            .flat_map(|(left, row)| row.iter_mut().map(move |(right, value)| (left, right, value)))
    }

    /// Number of explicit pairs.
    pub fn len(&self) -> usize {
        self.pairs.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl From<BTreeMap<KerningKey, BTreeMap<KerningKey, f64>>> for KerningTable {
    fn from(mut pairs: BTreeMap<KerningKey, BTreeMap<KerningKey, f64>>) -> Self {
        pairs.retain(|_, row| !row.is_empty());
        Self { pairs }
    }
}

impl FromIterator<(KerningKey, KerningKey, f64)> for KerningTable {
    fn from_iter<T: IntoIterator<Item = (KerningKey, KerningKey, f64)>>(iter: T) -> Self {
        let mut table = KerningTable::new();
        for (left, right, value) in iter {
            table.set(left, right, value);
        }
        table
    }
}
