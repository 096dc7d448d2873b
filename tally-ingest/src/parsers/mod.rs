//! Statement text parsers

pub mod free_text;
