use std::collections::BTreeSet;

use super::model::{Material, PriceTable};

// ---------------------------------------------------------------------------
// Text search
// ---------------------------------------------------------------------------

/// Text search over the name and identifier columns.
///
/// `Fields` keeps two independent queries that must both hold, each one
/// inactive while empty. `Combined` is a single query satisfied by a hit in
/// either column. Name matching is case-insensitive; id matching is a plain
/// substring over the id text. Missing cells never match an active query.
#[derive(Debug, Clone, PartialEq)]
pub enum TextSearch {
    Fields { name: String, id: String },
    Combined(String),
}

impl Default for TextSearch {
    fn default() -> Self {
        TextSearch::Fields {
            name: String::new(),
            id: String::new(),
        }
    }
}

impl TextSearch {
    pub fn matches(&self, material: &Material) -> bool {
        self.lowered().matches(material)
    }

    /// Fold the name query once up front; a pass over the table reuses the
    /// folded form for every row instead of re-folding per row.
    fn lowered(&self) -> LoweredSearch<'_> {
        match self {
            TextSearch::Fields { name, id } => LoweredSearch::Fields {
                name: name.to_lowercase(),
                id,
            },
            TextSearch::Combined(query) => LoweredSearch::Combined {
                lowered: query.to_lowercase(),
                raw: query,
            },
        }
    }
}

/// A [`TextSearch`] with its case folding already done. Only name matching
/// folds; the id comparison keeps the raw query.
enum LoweredSearch<'a> {
    Fields { name: String, id: &'a str },
    Combined { lowered: String, raw: &'a str },
}

impl LoweredSearch<'_> {
    fn matches(&self, material: &Material) -> bool {
        match self {
            LoweredSearch::Fields { name, id } => {
                (name.is_empty() || name_contains(material, name))
                    && (id.is_empty() || id_contains(material, id))
            }
            LoweredSearch::Combined { lowered, raw } => {
                lowered.is_empty()
                    || name_contains(material, lowered)
                    || id_contains(material, raw)
            }
        }
    }
}

/// `query` must already be lowercase.
fn name_contains(material: &Material, query: &str) -> bool {
    material
        .name
        .as_deref()
        .is_some_and(|name| name.to_lowercase().contains(query))
}

fn id_contains(material: &Material, query: &str) -> bool {
    material.id.as_deref().is_some_and(|id| id.contains(query))
}

// ---------------------------------------------------------------------------
// Criteria: the active filter set
// ---------------------------------------------------------------------------

/// Inclusive `[min, max]` band over the primary price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBand {
    pub min: f64,
    pub max: f64,
}

impl PriceBand {
    pub fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// The active filter configuration. `Criteria::default()` restricts nothing,
/// so the filtered view equals the full dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    pub search: TextSearch,
    /// Accepted UOM codes; an empty set means "accept all", not "reject all".
    pub uoms: BTreeSet<String>,
    /// Accepted sales organizations; empty accepts all.
    pub orgs: BTreeSet<String>,
    /// Primary-price band; `None` accepts all.
    pub price: Option<PriceBand>,
}

impl Criteria {
    /// Whether a single material passes every active criterion.
    /// Active criteria combine with logical AND.
    pub fn matches(&self, material: &Material) -> bool {
        self.search.matches(material) && self.rest_accepts(material)
    }

    /// Everything but the text search.
    fn rest_accepts(&self, material: &Material) -> bool {
        set_accepts(&self.uoms, material.uom.as_deref())
            && set_accepts(&self.orgs, material.org.as_deref())
            && band_accepts(self.price, material.price)
    }
}

/// Membership test for the set filters. A record whose value is missing
/// fails an active filter and passes an inactive one.
fn set_accepts(accepted: &BTreeSet<String>, value: Option<&str>) -> bool {
    if accepted.is_empty() {
        return true;
    }
    value.is_some_and(|v| accepted.contains(v))
}

fn band_accepts(band: Option<PriceBand>, price: Option<f64>) -> bool {
    match band {
        None => true,
        Some(band) => price.is_some_and(|p| band.contains(p)),
    }
}

// ---------------------------------------------------------------------------
// View computation
// ---------------------------------------------------------------------------

/// Return indices of materials passing all active criteria, in dataset
/// order. The view is recomputed from the full table on every criteria
/// change; nothing incremental is kept between calls.
pub fn filtered_indices(table: &PriceTable, criteria: &Criteria) -> Vec<usize> {
    let search = criteria.search.lowered();
    table
        .materials
        .iter()
        .enumerate()
        .filter(|(_, m)| search.matches(m) && criteria.rest_accepts(m))
        .map(|(i, _)| i)
        .collect()
}
