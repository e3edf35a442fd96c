//! Per-metal totals over a list of assets
//!
//! Pure and synchronous; works on whatever copy of the list the caller holds.

use std::fmt;

use crate::storage::types::{Asset, Metal};

/// How a record's weight contributes to its metal's total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightBasis {
    /// Always `weight * count`, whatever `weight_type` says.
    ///
    /// This is how totals have always been computed; a record whose weight
    /// is marked `total` is over-counted by a factor of `count`.
    #[default]
    PerItem,
    /// Honour `weight_type`: a `total` weight counts once.
    Declared,
}

/// Totals for one metal
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetalTotal {
    /// Number of items
    pub count: u64,
    /// Summed weight in grams
    pub weight: f64,
}

/// "3 items" or "3 items • 10.0g"
impl fmt::Display for MetalTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} items", self.count)?;
        if self.weight > 0.0 {
            write!(f, " • {:.1}g", self.weight)?;
        }
        Ok(())
    }
}

/// Totals keyed by metal, in order of each metal's first appearance
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetalTotals {
    entries: Vec<(Metal, MetalTotal)>,
}

impl MetalTotals {
    pub fn get(&self, metal: &Metal) -> Option<&MetalTotal> {
        self.entries.iter().find(|(m, _)| m == metal).map(|(_, t)| t)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Metal, &MetalTotal)> {
        self.entries.iter().map(|(m, t)| (m, t))
    }

    pub fn metals(&self) -> impl Iterator<Item = &Metal> {
        self.entries.iter().map(|(m, _)| m)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&mut self, metal: &Metal) -> &mut MetalTotal {
        let index = match self.entries.iter().position(|(m, _)| m == metal) {
            Some(index) => index,
            None => {
                self.entries.push((metal.clone(), MetalTotal::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }
}

impl IntoIterator for MetalTotals {
    type Item = (Metal, MetalTotal);
    type IntoIter = std::vec::IntoIter<(Metal, MetalTotal)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Per-metal item count and weight, treating every weight as per-item
pub fn totals_by_metal(assets: &[Asset]) -> MetalTotals {
    totals_by_metal_with(assets, WeightBasis::PerItem)
}

/// Per-metal item count and weight under the given weight basis
///
/// Metals outside the known set get an entry like any other.
pub fn totals_by_metal_with(assets: &[Asset], basis: WeightBasis) -> MetalTotals {
    let mut totals = MetalTotals::default();

    for asset in assets {
        let total = totals.entry(&asset.metal);
        total.count += asset.count;

        let weight = match basis {
            WeightBasis::PerItem => asset.weight.map(|w| w * asset.count as f64),
            WeightBasis::Declared => asset.total_weight(),
        };
        if let Some(weight) = weight {
            total.weight += weight;
        }
    }

    totals
}
