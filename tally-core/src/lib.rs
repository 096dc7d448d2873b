//! tally-core: shared transaction types and time sources

pub mod finance;
pub mod time;

pub use finance::{ParsedTransaction, TransactionType};
pub use time::{Clock, FixedClock, SystemClock};
