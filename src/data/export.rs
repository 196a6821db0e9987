use anyhow::{Context, Result};

use super::model::PriceTable;

// ---------------------------------------------------------------------------
// CSV export of the filtered view
// ---------------------------------------------------------------------------

/// Serialize a view to CSV bytes: header row with the view's column names,
/// one line per record, UTF-8, RFC 4180 quoting. Missing cells become empty
/// fields. A pure function of the view; whichever criteria produced it
/// have no say here.
pub fn view_to_csv(table: &PriceTable, indices: &[usize]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&table.columns)
        .context("writing CSV header")?;

    for material in table.rows(indices) {
        let cells: Vec<String> = table.columns.iter().map(|c| material.cell(c)).collect();
        writer.write_record(&cells).context("writing CSV row")?;
    }

    writer.flush().context("flushing CSV writer")?;
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("finishing CSV buffer: {e}"))
}
