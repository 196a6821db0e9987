use chrono::{Days, NaiveDate};

use super::model::PriceTable;

/// How many records each ranked sub-view holds.
pub const RANKING_SIZE: usize = 10;

/// How many days ahead the expiry monitor looks.
pub const EXPIRY_WINDOW_DAYS: u64 = 30;

// ---------------------------------------------------------------------------
// KPI aggregates
// ---------------------------------------------------------------------------

/// Aggregate figures over the filtered view. Each mean covers only the
/// values present in its column; a column with no present values reports
/// `None` instead of dividing by zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Kpis {
    pub count: usize,
    pub avg_price: Option<f64>,
    pub avg_market: Option<f64>,
    pub avg_diff: Option<f64>,
}

pub fn compute_kpis(table: &PriceTable, indices: &[usize]) -> Kpis {
    Kpis {
        count: indices.len(),
        avg_price: mean(table.rows(indices).filter_map(|m| m.price)),
        avg_market: mean(table.rows(indices).filter_map(|m| m.market_price)),
        avg_diff: mean(table.rows(indices).filter_map(|m| m.price_diff)),
    }
}

/// Arithmetic mean; `None` for an empty sequence.
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

// ---------------------------------------------------------------------------
// Expiry monitor
// ---------------------------------------------------------------------------

/// Count records whose validity ends on or before the cutoff day. The
/// boundary is inclusive, and records already past their end date count
/// too; records without an end date never do.
pub fn expiring_count(table: &PriceTable, indices: &[usize], reference_date: NaiveDate) -> usize {
    let cutoff = expiry_cutoff(reference_date);
    table
        .rows(indices)
        .filter(|m| m.valid_to.is_some_and(|end| end <= cutoff))
        .count()
}

/// The last day still inside the expiry window.
pub fn expiry_cutoff(reference_date: NaiveDate) -> NaiveDate {
    reference_date + Days::new(EXPIRY_WINDOW_DAYS)
}

// ---------------------------------------------------------------------------
// Ranked sub-views
// ---------------------------------------------------------------------------

/// Indices of the `n` highest-priced records, price descending.
pub fn most_expensive(table: &PriceTable, indices: &[usize], n: usize) -> Vec<usize> {
    ranked_by_price(table, indices, n, true)
}

/// Indices of the `n` lowest-priced records, price ascending.
pub fn cheapest(table: &PriceTable, indices: &[usize], n: usize) -> Vec<usize> {
    ranked_by_price(table, indices, n, false)
}

/// Records without a price cannot rank. `sort_by` is stable, so equal
/// prices keep their dataset order. Fewer than `n` rows returns them all.
fn ranked_by_price(
    table: &PriceTable,
    indices: &[usize],
    n: usize,
    descending: bool,
) -> Vec<usize> {
    let mut priced: Vec<(usize, f64)> = indices
        .iter()
        .filter_map(|&i| table.materials[i].price.map(|p| (i, p)))
        .collect();
    if descending {
        priced.sort_by(|a, b| b.1.total_cmp(&a.1));
    } else {
        priced.sort_by(|a, b| a.1.total_cmp(&b.1));
    }
    priced.truncate(n);
    priced.into_iter().map(|(i, _)| i).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filtered_indices, Criteria, TextSearch};
    use crate::data::model::Material;

    fn priced(name: &str, price: Option<f64>, market: Option<f64>) -> Material {
        Material {
            id: Some(name.to_lowercase().replace(' ', "-")),
            name: Some(name.to_string()),
            uom: Some("EA".to_string()),
            org: Some("1000".to_string()),
            price,
            market_price: market,
            ..Material::default()
        }
        .with_price_diff()
    }

    fn all(table: &PriceTable) -> Vec<usize> {
        (0..table.len()).collect()
    }

    #[test]
    fn searched_pipe_view_has_expected_averages() {
        let table = PriceTable::from_materials(
            vec![
                priced("Pipe A", Some(100.0), Some(120.0)),
                priced("Pipe B", Some(50.0), Some(40.0)),
            ],
            false,
            false,
        );
        let criteria = Criteria {
            search: TextSearch::Fields {
                name: "Pipe A".to_string(),
                id: String::new(),
            },
            ..Criteria::default()
        };
        let view = filtered_indices(&table, &criteria);
        assert_eq!(view, vec![0]);

        let kpis = compute_kpis(&table, &view);
        assert_eq!(kpis.count, 1);
        assert_eq!(kpis.avg_price, Some(100.0));
        assert_eq!(kpis.avg_diff, Some(20.0));
    }

    #[test]
    fn empty_view_reports_undefined_means() {
        let table = PriceTable::from_materials(vec![], false, false);
        let kpis = compute_kpis(&table, &[]);
        assert_eq!(kpis.count, 0);
        assert_eq!(kpis.avg_price, None);
        assert_eq!(kpis.avg_market, None);
        assert_eq!(kpis.avg_diff, None);
    }

    #[test]
    fn each_mean_skips_its_own_missing_values() {
        let table = PriceTable::from_materials(
            vec![
                priced("A", Some(10.0), None),
                priced("B", Some(30.0), Some(33.0)),
                priced("C", None, Some(7.0)),
            ],
            false,
            false,
        );
        let view = all(&table);
        let kpis = compute_kpis(&table, &view);
        assert_eq!(kpis.avg_price, Some(20.0));
        assert_eq!(kpis.avg_market, Some(20.0));
        // Only row B has both prices, so the diff mean covers it alone.
        assert_eq!(kpis.avg_diff, Some(3.0));
    }

    #[test]
    fn expiry_window_boundary_is_inclusive() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        let mut on_boundary = priced("A", Some(1.0), None);
        on_boundary.valid_to = Some(date(2026, 1, 31));
        let mut past_boundary = priced("B", Some(1.0), None);
        past_boundary.valid_to = Some(date(2026, 2, 1));
        let mut already_expired = priced("C", Some(1.0), None);
        already_expired.valid_to = Some(date(2025, 12, 1));
        let no_end_date = priced("D", Some(1.0), None);

        let table = PriceTable::from_materials(
            vec![on_boundary, past_boundary, already_expired, no_end_date],
            false,
            true,
        );
        let view = all(&table);
        // Reference 2026-01-01, cutoff 2026-01-31: the boundary row and the
        // expired row count, the later row and the dateless row do not.
        assert_eq!(expiring_count(&table, &view, date(2026, 1, 1)), 2);
        assert_eq!(expiry_cutoff(date(2026, 1, 1)), date(2026, 1, 31));
    }

    #[test]
    fn no_expiring_records_counts_zero() {
        let table = PriceTable::from_materials(
            vec![priced("A", Some(1.0), None)],
            false,
            false,
        );
        let view = all(&table);
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(expiring_count(&table, &view, today), 0);
    }

    #[test]
    fn rankings_order_and_break_ties_by_dataset_order() {
        let table = PriceTable::from_materials(
            vec![
                priced("A", Some(5.0), None),
                priced("B", Some(3.0), None),
                priced("C", Some(9.0), None),
                priced("D", Some(3.0), None),
                priced("E", None, None),
                priced("F", Some(1.0), None),
            ],
            false,
            false,
        );
        let view = all(&table);
        assert_eq!(most_expensive(&table, &view, 3), vec![2, 0, 1]);
        assert_eq!(cheapest(&table, &view, 3), vec![5, 1, 3]);
    }

    #[test]
    fn short_views_rank_everything_they_have() {
        let table = PriceTable::from_materials(
            vec![priced("A", Some(5.0), None), priced("B", None, None)],
            false,
            false,
        );
        let view = all(&table);
        // The priceless row cannot rank, so both sub-views hold one entry.
        assert_eq!(most_expensive(&table, &view, RANKING_SIZE), vec![0]);
        assert_eq!(cheapest(&table, &view, RANKING_SIZE), vec![0]);
    }

    #[test]
    fn top_prices_never_undercut_bottom_prices() {
        let prices = [40.0, 12.0, 88.0, 7.0, 55.0, 23.0, 61.0, 19.0];
        let table = PriceTable::from_materials(
            prices
                .iter()
                .map(|&p| priced("M", Some(p), None))
                .collect(),
            false,
            false,
        );
        let view = all(&table);
        let top = most_expensive(&table, &view, 4);
        let bottom = cheapest(&table, &view, 4);

        let top_min = top
            .iter()
            .filter_map(|&i| table.materials[i].price)
            .fold(f64::INFINITY, f64::min);
        let bottom_max = bottom
            .iter()
            .filter_map(|&i| table.materials[i].price)
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(top_min >= bottom_max);
    }
}
