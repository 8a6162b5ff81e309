//! CSV import for bank transaction exports
//!
//! Expected columns (any order, headers trimmed and case-insensitive):
//! `date`, `description`, `amount`, and optionally `direction`.
//!
//! Without a direction column the sign of the amount decides: positive is
//! income, anything else is expense. Amounts are stored as magnitudes.

use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Direction, NewTransaction};

const REQUIRED_COLUMNS: [&str; 3] = ["date", "description", "amount"];

/// Column positions resolved from the header row
struct Columns {
    date: usize,
    description: usize,
    amount: usize,
    direction: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |name: &str| names.iter().position(|h| h == name);

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| find(c).is_none())
            .collect();

        match (find("date"), find("description"), find("amount")) {
            (Some(date), Some(description), Some(amount)) => Ok(Self {
                date,
                description,
                amount,
                direction: find("direction"),
            }),
            _ => Err(Error::Import(format!(
                "Missing required columns: {}",
                missing.join(", ")
            ))),
        }
    }
}

/// Convert a CSV record to a JSON object using headers as keys
fn record_to_json(headers: &StringRecord, record: &StringRecord) -> String {
    let mut map = serde_json::Map::new();
    for (i, header) in headers.iter().enumerate() {
        if let Some(value) = record.get(i) {
            map.insert(header.trim().to_string(), Value::String(value.to_string()));
        }
    }
    json!(map).to_string()
}

/// Parse a transaction CSV into validated transactions
///
/// The whole file is rejected if any row fails to parse.
pub fn parse_csv<R: Read>(mut reader: R) -> Result<Vec<NewTransaction>> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    if content.trim().is_empty() {
        return Err(Error::Import("Empty file content".into()));
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = rdr.headers()?.clone();
    let columns = Columns::from_headers(&headers)?;
    let mut transactions = Vec::new();
    // Identical rows are separate purchases; count them so each gets its own hash
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (index, result) in rdr.records().enumerate() {
        let row = index + 1;
        let record = result.map_err(|e| Error::Import(format!("Row {}: {}", row, e)))?;
        let mut tx = parse_row(&columns, &headers, &record)
            .map_err(|e| Error::Import(format!("Row {}: {}", row, e)))?;

        let occurrence = seen.entry(tx.import_hash.clone()).or_insert(0);
        tx.import_hash = occurrence_hash(&tx.import_hash, *occurrence);
        *occurrence += 1;

        transactions.push(tx);
    }

    if transactions.is_empty() {
        return Err(Error::Import("CSV contains no data rows".into()));
    }

    debug!("Parsed {} transactions", transactions.len());
    Ok(transactions)
}

fn parse_row(
    columns: &Columns,
    headers: &StringRecord,
    record: &StringRecord,
) -> std::result::Result<NewTransaction, String> {
    let field = |idx: usize, name: &str| {
        record
            .get(idx)
            .map(str::trim)
            .ok_or_else(|| format!("Missing {}", name))
    };

    let date = parse_date(field(columns.date, "date")?)?;
    let description = field(columns.description, "description")?.to_string();
    let signed_amount = parse_amount(field(columns.amount, "amount")?)?;

    let explicit = columns
        .direction
        .and_then(|idx| record.get(idx))
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let direction = match explicit {
        Some(value) => value.parse::<Direction>().map_err(|e| e.to_string())?,
        None if signed_amount > 0.0 => Direction::Income,
        None => Direction::Expense,
    };

    Ok(NewTransaction {
        import_hash: generate_hash(&date, &description, signed_amount),
        date,
        description,
        amount: signed_amount.abs(),
        direction,
        original_data: Some(record_to_json(headers, record)),
    })
}

/// Generate a unique hash for deduplication
pub fn generate_hash(date: &NaiveDate, description: &str, amount: f64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.to_string().as_bytes());
    hasher.update(description.as_bytes());
    hasher.update(amount.to_be_bytes());
    hex::encode(hasher.finalize())
}

/// Hash of the `occurrence`-th identical row within one file
///
/// The first occurrence keeps the plain hash, so re-importing a file
/// still matches every row it stored before.
pub fn occurrence_hash(base: &str, occurrence: usize) -> String {
    if occurrence == 0 {
        return base.to_string();
    }
    let mut hasher = Sha256::new();
    hasher.update(base.as_bytes());
    hasher.update((occurrence as u64).to_be_bytes());
    hex::encode(hasher.finalize())
}

/// Parse a date in one of the supported formats
fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    // %Y also accepts a two-digit year, so %y must come first
    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%y", // 01/15/24
        "%m/%d/%Y", // 01/15/2024
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(format!("Unable to parse date: {}", s))
}

/// Parse an amount string, handling currency symbols and commas
fn parse_amount(s: &str) -> std::result::Result<f64, String> {
    let cleaned: String = s
        .trim()
        .replace(['$', '€', '£', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Unable to parse amount: {}", s)),
    }
}
