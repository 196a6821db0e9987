use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{columns, Material, PriceTable};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a price list failed to load. Any of these aborts the whole load;
/// no partial table is ever handed out.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a top-level JSON array of records")]
    NotAnArray,
    #[error("record {0} is not a JSON object")]
    NotAnObject(usize),
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a price list from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row naming the [`columns`]; whitespace around header
///   names is ignored
/// * `.json` – records-oriented array: `[{ "Material": …, … }, …]`
pub fn load_file(path: &Path) -> Result<PriceTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => read_csv(open(path)?),
        "json" => read_json(open(path)?),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// The column check runs before any row parsing so a bad file fails as a
/// whole.
fn require_columns(present: impl Fn(&str) -> bool) -> Result<(), LoadError> {
    let missing: Vec<String> = columns::REQUIRED
        .iter()
        .filter(|c| !present(c))
        .map(|c| c.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(LoadError::MissingColumns(missing))
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Positions of the source columns within one file's header row.
struct ColumnIndex {
    id: usize,
    name: usize,
    uom: usize,
    org: usize,
    price: usize,
    market: usize,
    valid_from: Option<usize>,
    valid_to: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &[String]) -> Result<Self, LoadError> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        require_columns(|c| find(c).is_some())?;

        // The required positions are now known to exist.
        let at = |name: &str| find(name).unwrap_or_default();
        Ok(ColumnIndex {
            id: at(columns::ID),
            name: at(columns::NAME),
            uom: at(columns::UOM),
            org: at(columns::ORG),
            price: at(columns::PRICE),
            market: at(columns::MARKET),
            valid_from: find(columns::VALID_FROM),
            valid_to: find(columns::VALID_TO),
        })
    }
}

/// CSV layout: one header row, one line per material. Blank or unparsable
/// cells become missing values; a structurally broken row (wrong field
/// count, bad UTF-8) fails the load.
fn read_csv<R: Read>(reader: R) -> Result<PriceTable, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    let cols = ColumnIndex::from_headers(&headers)?;

    let mut materials = Vec::new();
    for result in rdr.records() {
        let record = result?;
        materials.push(material_from_record(&record, &cols));
    }

    Ok(PriceTable::from_materials(
        materials,
        cols.valid_from.is_some(),
        cols.valid_to.is_some(),
    ))
}

fn material_from_record(record: &csv::StringRecord, cols: &ColumnIndex) -> Material {
    let text = |i: usize| {
        record
            .get(i)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let price = |i: usize| record.get(i).and_then(parse_price);
    let date = |i: Option<usize>| i.and_then(|i| record.get(i)).and_then(parse_date);

    Material {
        id: text(cols.id),
        name: text(cols.name),
        uom: text(cols.uom),
        org: text(cols.org),
        price: price(cols.price),
        market_price: price(cols.market),
        price_diff: None,
        valid_from: date(cols.valid_from),
        valid_to: date(cols.valid_to),
    }
    .with_price_diff()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')` shape):
///
/// ```json
/// [
///   {
///     "Material": 100001,
///     "Material Name": "Carbon Steel Pipe 2in",
///     "UOM": "EA",
///     "Sales Org.": "1000",
///     "Rawabi Price": 34.5,
///     "Market Price": 39.0
///   },
///   ...
/// ]
/// ```
fn read_json<R: Read>(reader: R) -> Result<PriceTable, LoadError> {
    let root: JsonValue = serde_json::from_reader(reader)?;
    let records = root.as_array().ok_or(LoadError::NotAnArray)?;

    // Key presence across the records stands in for the CSV header row.
    // An empty array carries no keys, so it fails the column check the same
    // way a header-less CSV does.
    let mut seen: BTreeSet<String> = BTreeSet::new();
    for record in records {
        if let Some(obj) = record.as_object() {
            seen.extend(obj.keys().map(|k| k.trim().to_string()));
        }
    }
    require_columns(|c| seen.contains(c))?;

    let mut materials = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let obj = record.as_object().ok_or(LoadError::NotAnObject(i))?;
        materials.push(
            Material {
                id: json_text(json_field(obj, columns::ID)),
                name: json_text(json_field(obj, columns::NAME)),
                uom: json_text(json_field(obj, columns::UOM)),
                org: json_text(json_field(obj, columns::ORG)),
                price: json_price(json_field(obj, columns::PRICE)),
                market_price: json_price(json_field(obj, columns::MARKET)),
                price_diff: None,
                valid_from: json_date(json_field(obj, columns::VALID_FROM)),
                valid_to: json_date(json_field(obj, columns::VALID_TO)),
            }
            .with_price_diff(),
        );
    }

    Ok(PriceTable::from_materials(
        materials,
        seen.contains(columns::VALID_FROM),
        seen.contains(columns::VALID_TO),
    ))
}

/// Look a column up by trimmed key, mirroring the CSV header trimming.
fn json_field<'a>(
    obj: &'a serde_json::Map<String, JsonValue>,
    column: &str,
) -> Option<&'a JsonValue> {
    obj.iter().find(|(k, _)| k.trim() == column).map(|(_, v)| v)
}

fn json_text(value: Option<&JsonValue>) -> Option<String> {
    match value? {
        JsonValue::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_price(value: Option<&JsonValue>) -> Option<f64> {
    match value? {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => parse_price(s),
        _ => None,
    }
}

fn json_date(value: Option<&JsonValue>) -> Option<NaiveDate> {
    match value? {
        JsonValue::String(s) => parse_date(s),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Cell parsers
// ---------------------------------------------------------------------------

/// Forgiving price parser for the kind of values spreadsheet exports carry:
/// trims, strips thousands separators, rejects anything with letters.
/// Whatever cannot be parsed becomes `None`, a missing value, never an error.
fn parse_price(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    s.replace(',', "").parse::<f64>().ok()
}

/// Dates arrive as `YYYY-MM-DD`; anything else becomes a missing value.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

// ---------------------------------------------------------------------------
// Session load cache
// ---------------------------------------------------------------------------

/// Explicit memoization of the load step, keyed by path and owned by the
/// session state. Reloading goes through [`LoadCache::invalidate`]; nothing
/// caches globally behind the caller's back.
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: HashMap<PathBuf, Arc<PriceTable>>,
}

impl LoadCache {
    /// Return the cached table for `path`, loading it on first use.
    pub fn load(&mut self, path: &Path) -> Result<Arc<PriceTable>, LoadError> {
        if let Some(table) = self.entries.get(path) {
            log::debug!("load cache hit for {}", path.display());
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(load_file(path)?);
        self.entries.insert(path.to_path_buf(), Arc::clone(&table));
        Ok(table)
    }

    /// Drop the cached table for `path`; the next load re-reads the file.
    pub fn invalidate(&mut self, path: &Path) {
        self.entries.remove(path);
    }
}
