//! JSON-file ledger: organizations, saved transactions and the id sequence.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tally_core::TransactionType;

use crate::error::Result;
use crate::orgs::Organization;

/// A parsed transaction after it has been saved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    /// Sortable id (`tx-00000001`); later saves get larger ids
    pub id: String,
    pub organization_id: String,
    pub user_id: String,
    pub amount: f64,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub date: NaiveDate,
    pub confidence: f64,
    /// Full text of the submission this record came from
    pub raw_text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LedgerData {
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    organizations: Vec<Organization>,
    #[serde(default)]
    transactions: Vec<TransactionRecord>,
}

/// In-memory view of the ledger, written back with [`LedgerStore::save`].
#[derive(Debug, Clone, Default)]
pub struct LedgerStore {
    path: Option<PathBuf>,
    data: LedgerData,
}

impl LedgerStore {
    /// Load a ledger file. A missing file is an empty ledger.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let s = fs::read_to_string(&path)?;
            serde_json::from_str(&s)?
        } else {
            LedgerData::default()
        };
        Ok(Self {
            path: Some(path),
            data,
        })
    }

    /// A ledger that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&self.data)?;
        fs::write(path, json)?;
        tracing::debug!(path = %path.display(), "ledger saved");
        Ok(())
    }

    /// Ids ascend with save order. Compare them with [`id_order`].
    pub fn next_transaction_id(&mut self) -> String {
        self.data.next_id += 1;
        format!("tx-{:08}", self.data.next_id)
    }

    pub fn transactions(&self) -> &[TransactionRecord] {
        &self.data.transactions
    }

    pub fn organizations(&self) -> &[Organization] {
        &self.data.organizations
    }

    pub(crate) fn organizations_mut(&mut self) -> &mut Vec<Organization> {
        &mut self.data.organizations
    }

    pub(crate) fn push_transactions(&mut self, records: impl IntoIterator<Item = TransactionRecord>) {
        self.data.transactions.extend(records);
    }
}

/// Sort key for transaction ids: shorter ids are older, so `tx-100000000`
/// sorts after `tx-99999999`.
pub fn id_order(id: &str) -> (usize, &str) {
    (id.len(), id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sortable() {
        let mut store = LedgerStore::in_memory();
        let a = store.next_transaction_id();
        let b = store.next_transaction_id();
        assert_eq!(a, "tx-00000001");
        assert!(id_order(&a) < id_order(&b));
    }

    #[test]
    fn test_id_order_past_eight_digits() {
        assert!(id_order("tx-99999999") < id_order("tx-100000000"));
        assert!(id_order("tx-00000009") < id_order("tx-00000010"));
    }

    #[test]
    fn test_missing_file_is_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path().join("ledger.json")).unwrap();
        assert!(store.transactions().is_empty());
        assert!(store.organizations().is_empty());
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ledger.json");

        let mut store = LedgerStore::open(&path).unwrap();
        store.next_transaction_id();
        store.save().unwrap();

        let mut reopened = LedgerStore::open(&path).unwrap();
        assert_eq!(reopened.next_transaction_id(), "tx-00000002");
    }

    #[test]
    fn test_corrupt_file_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, "{not json").unwrap();
        let err = LedgerStore::open(&path).unwrap_err();
        assert!(matches!(err, crate::LedgerError::Format(_)));
    }
}
