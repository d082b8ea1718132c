//! Input validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// Regex for validating organization subdomains
static SUBDOMAIN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9-]*$").unwrap());

/// Regex for validating setting/queue/category names
static SETTING_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9 ._-]*$").unwrap());

/// Regex for validating inventory SKUs
static SKU_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap());

/// Validate an organization subdomain
pub fn validate_subdomain(subdomain: &str) -> bool {
    !subdomain.is_empty() && subdomain.len() <= 63 && SUBDOMAIN_REGEX.is_match(subdomain)
}

/// Validate a settings registry item name
pub fn validate_setting_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= 100 && SETTING_NAME_REGEX.is_match(name)
}

/// Validate an inventory SKU
pub fn validate_sku(sku: &str) -> bool {
    !sku.is_empty() && sku.len() <= 64 && SKU_REGEX.is_match(sku)
}

/// Parse a comma-separated query string parameter into its values
pub fn split_multi_value(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_subdomain_valid() {
        assert!(validate_subdomain("acme"));
        assert!(validate_subdomain("acme-corp"));
        assert!(validate_subdomain("a1"));
    }

    #[test]
    fn test_validate_subdomain_invalid() {
        assert!(!validate_subdomain(""));
        assert!(!validate_subdomain("Acme")); // No uppercase
        assert!(!validate_subdomain("1acme")); // Can't start with number
        assert!(!validate_subdomain("has space"));
    }

    #[test]
    fn test_validate_setting_name_valid() {
        assert!(validate_setting_name("Pending Approval"));
        assert!(validate_setting_name("Tier-1 Queue"));
        assert!(validate_setting_name("Hardware"));
    }

    #[test]
    fn test_validate_setting_name_invalid() {
        assert!(!validate_setting_name(""));
        assert!(!validate_setting_name(" leading space"));
        assert!(!validate_setting_name("1st")); // Can't start with digit
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("WKS-2024-001"));
        assert!(validate_sku("ram.ddr5.32"));
        assert!(!validate_sku(""));
        assert!(!validate_sku("-leading"));
        assert!(!validate_sku("has space"));
    }

    #[test]
    fn test_split_multi_value() {
        assert_eq!(split_multi_value("Server,Printer"), vec!["Server", "Printer"]);
        assert_eq!(split_multi_value(" Server , "), vec!["Server"]);
        assert!(split_multi_value("").is_empty());
    }
}
