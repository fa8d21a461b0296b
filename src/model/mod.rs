//! Record model — normalization of raw ledger records.
//!
//! Turns heterogeneous/legacy key-value records into the typed model in
//! `types`, and owns the calendar conventions (display date format,
//! Sunday week start) every engine relies on.

pub mod date;
pub mod normalize;

use uuid::Uuid;

/// Mint an opaque unique record id (UUID v4, string form).
pub fn mint_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_id_is_unique() {
        let a = mint_id();
        let b = mint_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }
}
