//! Transaction value types shared by the parser and the ledger

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of money movement inferred from a statement line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionType {
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "expense")]
    Expense,
}

impl TransactionType {
    /// Wire name, as stored in the ledger and printed by the CLI
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A transaction candidate extracted from free text, before it has an identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedTransaction {
    /// Always non-negative; the sign is carried by `kind`
    pub amount: f64,
    /// Residual line text, or "Transaction" when nothing is left
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Date token from the line, or the clock's today
    pub date: NaiveDate,
    /// Heuristic reliability score (0.0 - 1.0)
    pub confidence: f64,
}

impl ParsedTransaction {
    /// Placeholder used when a line carries nothing but tokens
    pub const DEFAULT_DESCRIPTION: &'static str = "Transaction";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: TransactionType) -> ParsedTransaction {
        ParsedTransaction {
            amount: 45.99,
            description: "Grocery Store".to_string(),
            kind,
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            confidence: 1.0,
        }
    }

    #[test]
    fn test_serializes_type_field_lowercase() {
        let json = serde_json::to_value(sample(TransactionType::Expense)).unwrap();
        assert_eq!(json["type"], "expense");
        assert_eq!(json["date"], "2024-01-15");
        assert!(json.get("kind").is_none());
    }
}
