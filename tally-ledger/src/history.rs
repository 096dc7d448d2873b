//! Cursor pagination over a member's saved transactions, newest first.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::{LedgerStore, TransactionRecord, id_order};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// One page of history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    pub transactions: Vec<TransactionRecord>,
    /// Pass back as `cursor` to get the next page
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// List `user_id`'s transactions in `org_id`, newest first.
///
/// "Newest" means most recently saved, i.e. largest id; `created_at` is not
/// consulted, so a clock that moves backwards cannot break paging.
///
/// `cursor` is the id of the last record already seen; only older records
/// (smaller ids) are returned. `limit` defaults to [`DEFAULT_PAGE_SIZE`] and
/// is clamped to `1..=MAX_PAGE_SIZE`.
pub fn list_transactions(
    store: &LedgerStore,
    org_id: &str,
    user_id: &str,
    cursor: Option<&str>,
    limit: Option<usize>,
) -> Result<Page> {
    store.require_member(org_id, user_id)?;
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let mut matching: Vec<&TransactionRecord> = store
        .transactions()
        .iter()
        .filter(|t| t.organization_id == org_id && t.user_id == user_id)
        .filter(|t| cursor.is_none_or(|c| id_order(&t.id) < id_order(c)))
        .collect();

    matching.sort_by(|a, b| id_order(&b.id).cmp(&id_order(&a.id)));

    let has_more = matching.len() > limit;
    let transactions: Vec<TransactionRecord> =
        matching.into_iter().take(limit).cloned().collect();
    let next_cursor = if has_more {
        transactions.last().map(|t| t.id.clone())
    } else {
        None
    };

    Ok(Page {
        transactions,
        next_cursor,
        has_more,
    })
}

/// Every page of history, concatenated.
pub fn list_all_transactions(
    store: &LedgerStore,
    org_id: &str,
    user_id: &str,
) -> Result<Vec<TransactionRecord>> {
    let mut out = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = list_transactions(store, org_id, user_id, cursor.as_deref(), Some(MAX_PAGE_SIZE))?;
        out.extend(page.transactions);
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_transactions;
    use chrono::NaiveDate;
    use tally_core::FixedClock;
    use tally_ingest::FreeTextParser;

    fn seeded(lines: usize) -> LedgerStore {
        let clock = FixedClock::at_date(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());
        let parser = FreeTextParser::new().unwrap();
        let mut store = LedgerStore::in_memory();
        store.create_organization("Home", "alice", &clock).unwrap();
        let text: String = (1..=lines).map(|i| format!("Item ${i}.00\n")).collect();
        extract_transactions(&mut store, &parser, &clock, "home", "alice", &text).unwrap();
        store
    }

    #[test]
    fn test_default_limit_and_order() {
        let store = seeded(25);
        let page = list_transactions(&store, "home", "alice", None, None).unwrap();
        assert_eq!(page.transactions.len(), DEFAULT_PAGE_SIZE);
        assert!(page.has_more);
        assert_eq!(page.transactions[0].id, "tx-00000025");
        assert_eq!(page.next_cursor.as_deref(), Some("tx-00000006"));
    }

    #[test]
    fn test_cursor_resumes_after_last_item() {
        let store = seeded(5);
        let first = list_transactions(&store, "home", "alice", None, Some(2)).unwrap();
        let second =
            list_transactions(&store, "home", "alice", first.next_cursor.as_deref(), Some(2)).unwrap();
        let third =
            list_transactions(&store, "home", "alice", second.next_cursor.as_deref(), Some(2)).unwrap();

        let ids: Vec<_> = [first, second, third.clone()]
            .iter()
            .flat_map(|p| p.transactions.iter().map(|t| t.id.clone()))
            .collect();
        assert_eq!(
            ids,
            vec!["tx-00000005", "tx-00000004", "tx-00000003", "tx-00000002", "tx-00000001"]
        );
        assert!(!third.has_more);
        assert_eq!(third.next_cursor, None);
    }

    #[test]
    fn test_limit_is_clamped() {
        let store = seeded(3);
        let page = list_transactions(&store, "home", "alice", None, Some(0)).unwrap();
        assert_eq!(page.transactions.len(), 1);

        let store = seeded(120);
        let page = list_transactions(&store, "home", "alice", None, Some(500)).unwrap();
        assert_eq!(page.transactions.len(), MAX_PAGE_SIZE);
        assert!(page.has_more);
    }

    #[test]
    fn test_list_all_walks_every_page() {
        let store = seeded(230);
        let all = list_all_transactions(&store, "home", "alice").unwrap();
        assert_eq!(all.len(), 230);
        assert_eq!(all.last().unwrap().id, "tx-00000001");
    }

    #[test]
    fn test_order_follows_save_order_when_clock_goes_back() {
        let parser = FreeTextParser::new().unwrap();
        let early = FixedClock::at_date(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());
        let late = FixedClock::at_date(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap());
        let mut store = LedgerStore::in_memory();
        store.create_organization("Home", "alice", &late).unwrap();

        // saved second, but stamped a month earlier
        extract_transactions(&mut store, &parser, &late, "home", "alice", "A $1.00\nB $2.00").unwrap();
        extract_transactions(&mut store, &parser, &early, "home", "alice", "C $3.00").unwrap();

        let first = list_transactions(&store, "home", "alice", None, Some(2)).unwrap();
        let rest =
            list_transactions(&store, "home", "alice", first.next_cursor.as_deref(), Some(2)).unwrap();
        let descriptions: Vec<_> = first
            .transactions
            .iter()
            .chain(&rest.transactions)
            .map(|t| t.description.as_str())
            .collect();
        assert_eq!(descriptions, vec!["C", "B", "A"]);
        assert!(!rest.has_more);
    }

    #[test]
    fn test_other_members_see_only_their_rows() {
        let mut store = seeded(3);
        store.add_member("home", "bob").unwrap();
        let page = list_transactions(&store, "home", "bob", None, None).unwrap();
        assert!(page.transactions.is_empty());
        assert!(!page.has_more);
        assert!(list_transactions(&store, "home", "eve", None, None).is_err());
    }
}
