//! Extraction: parse submitted text and save every candidate, or nothing.

use tally_core::Clock;
use tally_ingest::FreeTextParser;

use crate::error::{LedgerError, Result};
use crate::store::{LedgerStore, TransactionRecord};

/// Parse `text` and append the results to `org_id`'s ledger on behalf of `user_id`.
///
/// Rejects empty input, non-members, and text with no parsable line. Records
/// are saved in line order, so their ids ascend in the same order. The store
/// is only modified in memory; call [`LedgerStore::save`] to persist.
pub fn extract_transactions(
    store: &mut LedgerStore,
    parser: &FreeTextParser,
    clock: &impl Clock,
    org_id: &str,
    user_id: &str,
    text: &str,
) -> Result<Vec<TransactionRecord>> {
    if text.is_empty() {
        return Err(LedgerError::EmptyInput);
    }
    store.require_member(org_id, user_id)?;

    let parsed = parser.parse(text, clock);
    if parsed.is_empty() {
        tracing::warn!(org = org_id, "no transactions found in submitted text");
        return Err(LedgerError::NoTransactionsFound);
    }

    let now = clock.now_utc();
    let saved: Vec<TransactionRecord> = parsed
        .into_iter()
        .map(|tx| TransactionRecord {
            id: store.next_transaction_id(),
            organization_id: org_id.to_string(),
            user_id: user_id.to_string(),
            amount: tx.amount,
            description: tx.description,
            kind: tx.kind,
            date: tx.date,
            confidence: tx.confidence,
            raw_text: text.to_string(),
            created_at: now,
            updated_at: now,
        })
        .collect();

    store.push_transactions(saved.iter().cloned());
    tracing::info!(org = org_id, user = user_id, count = saved.len(), "transactions saved");
    Ok(saved)
}
