//! Shared constants and utilities for storage implementations

use chrono::{DateTime, Utc};

/// Key the asset list is stored under unless a store is given another one
pub const DEFAULT_STORAGE_KEY: &str = "@asset_tracker_data";

/// Current wall-clock time, used for `createdAt` / `updatedAt`
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Upper-case the first character, leaving the rest untouched
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("gold"), "Gold");
        assert_eq!(capitalize_first("earrings"), "Earrings");
        assert_eq!(capitalize_first(""), "");
    }
}
