//! tally-ingest: turns pasted statement text into transaction candidates.

pub mod parsers;

pub use parsers::free_text::FreeTextParser;
