//! Environment variable helpers.
//!
//! All runtime configuration in ringsys comes from `RINGSYS_*` variables;
//! there are no config files.
//!
//! ```ignore
//! use ringsys_core::env::{env_get, env_get_bits};
//!
//! let entries: u32 = env_get("RINGSYS_ENTRIES", 64);
//! let flags: u32 = env_get_bits("RINGSYS_SETUP_FLAGS", 0);
//! ```

use std::str::FromStr;

/// Parse `key` as `T`, or return `default` if unset or unparsable.
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    env_get_opt(key).unwrap_or(default)
}

/// `Some(T)` if `key` is set and parses.
#[inline]
pub fn env_get_opt<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Accepts "1", "true", "yes", "on" (case-insensitive) as true.
/// Any other value is false; unset returns `default`.
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => matches!(val.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

#[inline]
pub fn env_get_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[inline]
pub fn env_is_set(key: &str) -> bool {
    std::env::var(key).is_ok()
}

/// A 32-bit mask, decimal or `0x`-prefixed hex.
pub fn env_get_bits(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| parse_bits(&v))
        .unwrap_or(default)
}

/// Parse "42", "0x2a", "0X2A".
pub fn parse_bits(s: &str) -> Option<u32> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

// ============================================================================
// Tests
// ============================================================================
