use std::collections::BTreeSet;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Source column names
// ---------------------------------------------------------------------------

/// Exact column names of the source price list, matched after header
/// whitespace has been trimmed.
pub mod columns {
    pub const ID: &str = "Material";
    pub const NAME: &str = "Material Name";
    pub const UOM: &str = "UOM";
    pub const ORG: &str = "Sales Org.";
    pub const PRICE: &str = "Rawabi Price";
    pub const MARKET: &str = "Market Price";
    pub const VALID_FROM: &str = "Valid From";
    pub const VALID_TO: &str = "Valid To";
    /// Derived at load time, never read from the source.
    pub const PRICE_DIFF: &str = "Price Diff";

    /// Columns a file must provide; the validity columns are optional.
    pub const REQUIRED: [&str; 6] = [ID, NAME, UOM, ORG, PRICE, MARKET];
}

// ---------------------------------------------------------------------------
// Material – one row of the price list
// ---------------------------------------------------------------------------

/// A single material (one row of the source table).
///
/// Every field is optional: blank or unparsable cells load as `None` and
/// stay `None` through filtering, aggregation, and export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    /// Identifier, kept textual so leading zeros survive.
    pub id: Option<String>,
    pub name: Option<String>,
    pub uom: Option<String>,
    /// Sales organization code.
    pub org: Option<String>,
    /// Primary price (the `Rawabi Price` column).
    pub price: Option<f64>,
    /// Reference market price.
    pub market_price: Option<f64>,
    /// Derived: `market_price - price`; `None` if either side is missing.
    pub price_diff: Option<f64>,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
}

impl Material {
    /// Fill in the derived price difference from the two source prices.
    pub fn with_price_diff(mut self) -> Self {
        self.price_diff = match (self.price, self.market_price) {
            (Some(price), Some(market)) => Some(market - price),
            _ => None,
        };
        self
    }

    /// Render one cell as the string shown in the table and written to CSV.
    /// Missing values render as the empty string.
    pub fn cell(&self, column: &str) -> String {
        match column {
            columns::ID => self.id.clone().unwrap_or_default(),
            columns::NAME => self.name.clone().unwrap_or_default(),
            columns::UOM => self.uom.clone().unwrap_or_default(),
            columns::ORG => self.org.clone().unwrap_or_default(),
            columns::PRICE => fmt_price(self.price),
            columns::MARKET => fmt_price(self.market_price),
            columns::PRICE_DIFF => fmt_price(self.price_diff),
            columns::VALID_FROM => fmt_date(self.valid_from),
            columns::VALID_TO => fmt_date(self.valid_to),
            _ => String::new(),
        }
    }
}

/// `{}` on `f64` prints the shortest string that parses back to the same
/// value, which the CSV round-trip relies on.
fn fmt_price(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// PriceTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed price list with pre-computed value indices.
/// Immutable after load; the UI shares it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PriceTable {
    /// All materials (rows), in source order.
    pub materials: Vec<Material>,
    /// Ordered column names of the view: the six source columns, the
    /// derived difference, then whichever validity columns the source had.
    pub columns: Vec<String>,
    /// Sorted unique UOM codes present in the data.
    pub uoms: BTreeSet<String>,
    /// Sorted unique sales organizations present in the data.
    pub orgs: BTreeSet<String>,
    /// Min/max of the present primary prices; `None` when no row has one.
    pub price_bounds: Option<(f64, f64)>,
}

impl PriceTable {
    /// Build the column list and value indices from loaded rows.
    pub fn from_materials(
        materials: Vec<Material>,
        has_valid_from: bool,
        has_valid_to: bool,
    ) -> Self {
        let mut cols: Vec<String> = columns::REQUIRED.iter().map(|c| c.to_string()).collect();
        cols.push(columns::PRICE_DIFF.to_string());
        if has_valid_from {
            cols.push(columns::VALID_FROM.to_string());
        }
        if has_valid_to {
            cols.push(columns::VALID_TO.to_string());
        }

        let mut uoms = BTreeSet::new();
        let mut orgs = BTreeSet::new();
        let mut price_bounds: Option<(f64, f64)> = None;
        for m in &materials {
            if let Some(uom) = &m.uom {
                uoms.insert(uom.clone());
            }
            if let Some(org) = &m.org {
                orgs.insert(org.clone());
            }
            if let Some(p) = m.price {
                price_bounds = match price_bounds {
                    Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
                    None => Some((p, p)),
                };
            }
        }

        PriceTable {
            materials,
            columns: cols,
            uoms,
            orgs,
            price_bounds,
        }
    }

    /// Number of materials.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Iterate the rows selected by a filtered view, in view order.
    pub fn rows<'a>(&'a self, indices: &'a [usize]) -> impl Iterator<Item = &'a Material> + 'a {
        indices.iter().map(move |&i| &self.materials[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(uom: &str, org: &str, price: Option<f64>) -> Material {
        Material {
            id: Some("100001".to_string()),
            name: Some("Test".to_string()),
            uom: Some(uom.to_string()),
            org: Some(org.to_string()),
            price,
            ..Material::default()
        }
    }

    #[test]
    fn price_diff_needs_both_prices() {
        let m = Material {
            price: Some(100.0),
            market_price: Some(120.0),
            ..Material::default()
        }
        .with_price_diff();
        assert_eq!(m.price_diff, Some(20.0));

        let m = Material {
            price: Some(100.0),
            market_price: None,
            ..Material::default()
        }
        .with_price_diff();
        assert_eq!(m.price_diff, None);
    }

    #[test]
    fn from_materials_collects_unique_values_and_bounds() {
        let table = PriceTable::from_materials(
            vec![
                material("EA", "1000", Some(40.0)),
                material("M", "2000", Some(10.0)),
                material("EA", "1000", None),
            ],
            false,
            false,
        );
        let uoms: Vec<&str> = table.uoms.iter().map(String::as_str).collect();
        assert_eq!(uoms, ["EA", "M"]);
        assert_eq!(table.orgs.len(), 2);
        assert_eq!(table.price_bounds, Some((10.0, 40.0)));
    }

    #[test]
    fn validity_columns_appear_only_when_present_in_source() {
        let bare = PriceTable::from_materials(vec![], false, false);
        assert!(!bare.columns.contains(&columns::VALID_TO.to_string()));
        assert_eq!(bare.price_bounds, None);

        let dated = PriceTable::from_materials(vec![], true, true);
        assert_eq!(
            dated.columns.last().map(String::as_str),
            Some(columns::VALID_TO)
        );
    }

    #[test]
    fn cells_render_missing_values_as_empty() {
        let m = Material::default();
        assert_eq!(m.cell(columns::NAME), "");
        assert_eq!(m.cell(columns::PRICE), "");

        let m = Material {
            price: Some(12.5),
            valid_to: chrono::NaiveDate::from_ymd_opt(2026, 3, 1),
            ..Material::default()
        };
        assert_eq!(m.cell(columns::PRICE), "12.5");
        assert_eq!(m.cell(columns::VALID_TO), "2026-03-01");
    }
}
