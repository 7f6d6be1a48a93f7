//! Symbol and reference-price file loaders
//!
//! Both formats are line-oriented text: `SYMBOL,INDEX` for the symbol
//! table and `INDEX,PRICE` for reference prices. Lines starting with
//! `#` and blank lines are skipped. Symbols shorter than eight
//! characters are right-space-padded; longer ones are rejected. Prices
//! are decimal dollars, converted to the 1e-4 fixed point with
//! half-up rounding.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::core::{pad_symbol, LoadError, SymbolKey, MAX_SYMBOLS};

/// Parse a symbol file into `(key, index)` pairs.
pub fn read_symbol_file<P: AsRef<Path>>(path: P) -> Result<Vec<(SymbolKey, u16)>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read symbol file {}", path.display()))?;

    let mut entries = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        if let Some(entry) = parse_symbol_line(line, lineno + 1)? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

fn parse_symbol_line(line: &str, lineno: usize) -> Result<Option<(SymbolKey, u16)>, LoadError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (ticker, index) = line.split_once(',').ok_or_else(|| LoadError::ParseLine {
        line: lineno,
        reason: "expected SYMBOL,INDEX".to_string(),
    })?;

    let ticker = ticker.trim();
    let key = pad_symbol(ticker).ok_or_else(|| LoadError::SymbolTooLong {
        ticker: ticker.to_string(),
    })?;

    let index: u32 = index.trim().parse().map_err(|_| LoadError::ParseLine {
        line: lineno,
        reason: format!("bad index '{}'", index.trim()),
    })?;
    if index as usize >= MAX_SYMBOLS {
        return Err(LoadError::IndexOutOfRange { index });
    }

    Ok(Some((key, index as u16)))
}

/// Parse a reference price file into `(index, fixed_point_price)` pairs.
pub fn read_price_file<P: AsRef<Path>>(path: P) -> Result<Vec<(u16, u32)>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read price file {}", path.display()))?;

    let mut entries = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        if let Some(entry) = parse_price_line(line, lineno + 1)? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

fn parse_price_line(line: &str, lineno: usize) -> Result<Option<(u16, u32)>, LoadError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (index, price) = line.split_once(',').ok_or_else(|| LoadError::ParseLine {
        line: lineno,
        reason: "expected INDEX,PRICE".to_string(),
    })?;

    let index: u32 = index.trim().parse().map_err(|_| LoadError::ParseLine {
        line: lineno,
        reason: format!("bad index '{}'", index.trim()),
    })?;
    if index as usize >= MAX_SYMBOLS {
        return Err(LoadError::IndexOutOfRange { index });
    }

    let price = Decimal::from_str(price.trim()).map_err(|_| LoadError::ParseLine {
        line: lineno,
        reason: format!("bad price '{}'", price.trim()),
    })?;
    if price.is_sign_negative() {
        return Err(LoadError::ParseLine {
            line: lineno,
            reason: "negative price".to_string(),
        });
    }

    // Dollars → 1e-4 fixed point, rounding half-up.
    let fixed = (price * Decimal::from(10_000u32))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .ok_or_else(|| LoadError::ParseLine {
            line: lineno,
            reason: "price out of range".to_string(),
        })?;

    Ok(Some((index as u16, fixed)))
}
