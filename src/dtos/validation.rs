//! Espressioni regolari condivise dai DTO validati

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// International or local phone number: digits, spaces, dashes and brackets
    pub static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9 ()\-]{7,20}$").unwrap();
    /// Tax identification number: 10 digits for companies, 12 for individuals
    pub static ref TAX_ID_RE: Regex = Regex::new(r"^(\d{10}|\d{12})$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_pattern() {
        assert!(PHONE_RE.is_match("+7 (495) 123-45-67"));
        assert!(!PHONE_RE.is_match("call me"));
    }

    #[test]
    fn tax_id_pattern() {
        assert!(TAX_ID_RE.is_match("7707083893"));
        assert!(TAX_ID_RE.is_match("500100732259"));
        assert!(!TAX_ID_RE.is_match("12345"));
        assert!(!TAX_ID_RE.is_match("77070838931"));
    }
}
