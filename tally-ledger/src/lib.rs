//! tally-ledger: organizations, saved transactions, extraction and history

pub mod error;
pub mod export;
pub mod extract;
pub mod history;
pub mod orgs;
pub mod store;

pub use error::LedgerError;
pub use export::write_csv;
pub use extract::extract_transactions;
pub use history::{Page, list_all_transactions, list_transactions};
pub use orgs::Organization;
pub use store::{LedgerStore, TransactionRecord};
