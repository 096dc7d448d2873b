//! Free-text statement parser
//!
//! Turns pasted statement snippets, one transaction per line, into
//! confidence-scored candidates:
//!   01/15/2024 Grocery Store $45.99 debit
//!   2024-01-16 Salary deposit +2,500.00
//!   -75.00
//!
//! Lines without an amount-shaped token are dropped. Nothing here fails on
//! bad input; odd lines just come out with defaults and a lower score.

use std::ops::Range;

use anyhow::Result;
use chrono::NaiveDate;
use regex::Regex;
use tally_core::{Clock, ParsedTransaction, TransactionType};
use tracing::{debug, trace};

const BASE_CONFIDENCE: f64 = 0.5;
const AMOUNT_WEIGHT: f64 = 0.3;
const DATE_WEIGHT: f64 = 0.2;
const LENGTH_WEIGHT: f64 = 0.1;
const KEYWORD_WEIGHT: f64 = 0.1;

/// Lines longer than this (in chars) are assumed to carry a description.
const DESCRIPTIVE_LINE_LEN: usize = 10;

const POSITIVE_KEYWORDS: [&str; 2] = ["credit", "deposit"];
const NEGATIVE_KEYWORDS: [&str; 3] = ["debit", "withdrawal", "payment"];
/// Words statements print in a type column; they also raise confidence.
const TYPE_INDICATORS: [&str; 4] = ["debit", "credit", "deposit", "withdrawal"];

/// Regex-driven parser for pasted statement text.
///
/// Holds only compiled patterns, so a single instance can be shared across
/// threads and reused for every request.
#[derive(Debug, Clone)]
pub struct FreeTextParser {
    amount_re: Regex,
    date_re: Regex,
}

/// Tokens located in one line.
struct LineTokens<'a> {
    amount: Range<usize>,
    amount_digits: &'a str,
    date: Option<Range<usize>>,
}

impl FreeTextParser {
    pub fn new() -> Result<Self> {
        // sign, currency symbol, thousands groups, cents
        let amount_re = Regex::new(r"[-+]?\$?\s*(\d+(?:,\d{3})*(?:\.\d{2})?)")?;
        // M/D/Y (2-4 digit year) or Y/M/D, separators / or -
        let date_re = Regex::new(concat!(
            r"(?P<mdy>\d{1,2}[/-]\d{1,2}[/-]\d{2,4})",
            r"|(?P<ymd>\d{4}[/-]\d{1,2}[/-]\d{1,2})"
        ))?;
        Ok(Self { amount_re, date_re })
    }

    /// Parse a block of text, one candidate per line that has an amount.
    /// Output keeps the input line order.
    pub fn parse(&self, text: &str, clock: &impl Clock) -> Vec<ParsedTransaction> {
        let mut out = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match self.parse_line(line, clock) {
                Some(txn) => out.push(txn),
                None => debug!(line = idx + 1, "no amount token, skipping line"),
            }
        }

        debug!(candidates = out.len(), "parsed statement text");
        out
    }

    /// Parse a single statement line. `None` when the line has no amount token.
    pub fn parse_line(&self, line: &str, clock: &impl Clock) -> Option<ParsedTransaction> {
        let tokens = self.locate(line)?;

        let mut amount: f64 = tokens.amount_digits.replace(',', "").parse().ok()?;

        let date_token = tokens.date.clone().map(|r| &line[r]);
        let date = match date_token.and_then(parse_date_token) {
            Some(d) => d,
            None => {
                if let Some(raw) = date_token {
                    trace!(token = raw, "not a calendar date, using today");
                }
                clock.today()
            }
        };

        let kind = match classify(line) {
            Signal::Positive => TransactionType::Income,
            Signal::Negative => {
                amount = amount.abs();
                TransactionType::Expense
            }
            Signal::None => TransactionType::Expense,
        };

        Some(ParsedTransaction {
            amount,
            description: describe(line, &tokens),
            kind,
            date,
            confidence: confidence(line, tokens.date.is_some()),
        })
    }

    /// Find the date token and the first amount token that is not part of it,
    /// so the digits of a leading date are not read as the amount. A line
    /// whose only numbers are the date falls back to the first match inside it.
    fn locate<'a>(&self, line: &'a str) -> Option<LineTokens<'a>> {
        let date = self.date_re.find(line).map(|m| m.range());

        let mut fallback = None;
        for caps in self.amount_re.captures_iter(line) {
            let (Some(token), Some(digits)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let found = (token.range(), digits.as_str());
            if !overlaps(&found.0, date.as_ref()) {
                return Some(LineTokens {
                    amount: found.0,
                    amount_digits: found.1,
                    date,
                });
            }
            fallback.get_or_insert(found);
        }

        fallback.map(|(amount, amount_digits)| LineTokens {
            amount,
            amount_digits,
            date,
        })
    }
}

fn overlaps(a: &Range<usize>, b: Option<&Range<usize>>) -> bool {
    b.is_some_and(|b| a.start < b.end && b.start < a.end)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Positive,
    Negative,
    None,
}

/// Positive markers are checked first, so "+ ... debit" and "- ... credit"
/// both come out as income.
fn classify(line: &str) -> Signal {
    let lower = line.to_lowercase();

    if line.contains('+') || POSITIVE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Signal::Positive
    } else if line.contains('-') || NEGATIVE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Signal::Negative
    } else {
        Signal::None
    }
}

/// Interpret a matched date token. M/D/Y when the first group is short,
/// Y/M/D when it has four digits.
fn parse_date_token(token: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = token.split(['/', '-']).collect();
    if parts.len() != 3 {
        return None;
    }

    let a: u32 = parts[0].parse().ok()?;
    let b: u32 = parts[1].parse().ok()?;
    let c: u32 = parts[2].parse().ok()?;

    if parts[0].len() == 4 {
        NaiveDate::from_ymd_opt(a as i32, b, c)
    } else {
        let year = match parts[2].len() {
            2 if c < 50 => 2000 + c,
            2 => 1900 + c,
            _ => c,
        };
        NaiveDate::from_ymd_opt(year as i32, a, b)
    }
}

/// Whatever is left of the line once the amount and date are cut out.
fn describe(line: &str, tokens: &LineTokens<'_>) -> String {
    let mut cuts = vec![tokens.amount.clone()];
    if let Some(d) = &tokens.date {
        cuts.push(d.clone());
    }
    cuts.sort_by_key(|r| r.start);

    // Uncut stretches of the line; the cuts may overlap when the amount
    // came from inside the date.
    let mut pieces: Vec<Range<usize>> = Vec::with_capacity(3);
    let mut pos = 0;
    for cut in cuts {
        if cut.start > pos {
            pieces.push(pos..cut.start);
        }
        pos = pos.max(cut.end);
    }
    pieces.push(pos..line.len());

    let mut words: Vec<&str> = pieces
        .iter()
        .flat_map(|r| line[r.clone()].split_whitespace())
        .collect();

    // Type column printed after the amount ("... $45.99 debit")
    let last_piece = pieces
        .iter()
        .rev()
        .find(|r| !line[(*r).clone()].trim().is_empty());
    let after_amount = last_piece.is_some_and(|r| r.start >= tokens.amount.end);
    if after_amount {
        if let Some(last) = words.last() {
            if TYPE_INDICATORS.contains(&last.to_lowercase().as_str()) {
                words.pop();
            }
        }
    }

    if words.is_empty() {
        ParsedTransaction::DEFAULT_DESCRIPTION.to_string()
    } else {
        words.join(" ")
    }
}

/// Additive score: the amount term always applies since unmatched lines
/// never get here.
fn confidence(line: &str, has_date: bool) -> f64 {
    let mut score = BASE_CONFIDENCE + AMOUNT_WEIGHT;

    if has_date {
        score += DATE_WEIGHT;
    }

    if line.chars().count() > DESCRIPTIVE_LINE_LEN {
        score += LENGTH_WEIGHT;
    }

    let lower = line.to_lowercase();
    if TYPE_INDICATORS.iter().any(|k| lower.contains(k)) {
        score += KEYWORD_WEIGHT;
    }

    score.min(1.0)
}
