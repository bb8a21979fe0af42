//! Parsing of human-readable resource quantities
//!
//! Kubernetes expresses memory quantities as a number with an optional
//! suffix, e.g. "512Mi" or "2G". Annotation values and usage samples both
//! arrive in this form and are canonicalized to integer bytes before any
//! comparison.

use crate::error::GuardError;

/// Multiplier for a recognized suffix, decimal-SI (powers of 1000) or
/// binary (powers of 1024). Suffixes are matched case-insensitively.
fn multiplier(suffix: &str) -> Option<u64> {
    let value = match suffix {
        "" => 1,
        "k" => 1_000,
        "m" => 1_000_000,
        "g" => 1_000_000_000,
        "t" => 1_000_000_000_000,
        "p" => 1_000_000_000_000_000,
        "e" => 1_000_000_000_000_000_000,
        "ki" => 1 << 10,
        "mi" => 1 << 20,
        "gi" => 1 << 30,
        "ti" => 1 << 40,
        "pi" => 1 << 50,
        "ei" => 1 << 60,
        _ => return None,
    };
    Some(value)
}

/// Parse a quantity string into an integer byte count.
///
/// The amount may be an integer or a decimal fraction; fractional byte
/// counts are truncated toward zero after the multiplier is applied, so
/// `"0.5Mi"` is 524288. An unrecognized suffix is a `MalformedQuantity`
/// error, never a silent zero.
pub fn parse_quantity(text: &str) -> Result<u64, GuardError> {
    let trimmed = text.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(trimmed.len());
    let (amount, suffix) = trimmed.split_at(split);

    if amount.is_empty() {
        return Err(GuardError::malformed(text, "missing numeric amount"));
    }

    let mult = multiplier(&suffix.to_ascii_lowercase())
        .ok_or_else(|| GuardError::malformed(text, format!("unknown unit suffix {suffix:?}")))?;

    // Integer amounts stay on the exact path; only fractions go through f64.
    if let Ok(whole) = amount.parse::<u64>() {
        return whole
            .checked_mul(mult)
            .ok_or_else(|| GuardError::malformed(text, "quantity overflows u64"));
    }

    let fraction: f64 = amount
        .parse()
        .map_err(|_| GuardError::malformed(text, "unparsable numeric amount"))?;
    let bytes = fraction * mult as f64;
    if !bytes.is_finite() || bytes < 0.0 || bytes > u64::MAX as f64 {
        return Err(GuardError::malformed(text, "quantity out of range"));
    }
    Ok(bytes as u64)
}
