//! CSV export of saved transactions

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::io::Write;

use crate::error::Result;
use crate::store::TransactionRecord;

const HEADER: [&str; 7] = [
    "id",
    "date",
    "type",
    "amount",
    "description",
    "confidence",
    "created_at",
];

#[derive(Serialize)]
struct ExportRow<'a> {
    id: &'a str,
    date: NaiveDate,
    #[serde(rename = "type")]
    kind: &'static str,
    amount: f64,
    description: &'a str,
    confidence: f64,
    created_at: DateTime<Utc>,
}

/// Write `records` as CSV. The header row is written even when there are
/// no records.
pub fn write_csv<W: Write>(records: &[TransactionRecord], writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(HEADER)?;
    for r in records {
        wtr.serialize(ExportRow {
            id: &r.id,
            date: r.date,
            kind: r.kind.as_str(),
            amount: r.amount,
            description: &r.description,
            confidence: r.confidence,
            created_at: r.created_at,
        })?;
    }
    wtr.flush()?;
    Ok(())
}
