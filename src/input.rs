//! Validation rules shared by the terminal prompts and the web form.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{InvoiceError, Result};

/// Characters that cannot appear in a file name on common filesystems.
static PATH_UNSAFE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[/\\:*?"<>|\x00-\x1F\x7F]"#).expect("valid regex"));

/// The project number becomes the invoice number and part of the file
/// name, so it is kept verbatim: surrounding whitespace is rejected rather
/// than trimmed.
pub fn validate_project_number(value: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(InvoiceError::MissingRequiredField("project number"));
    }
    if value.trim() != value {
        return Err(InvoiceError::InvalidInput(
            "project number cannot start or end with spaces".to_string(),
        ));
    }
    if value == "." || value == ".." || PATH_UNSAFE.is_match(value) {
        return Err(InvoiceError::InvalidInput(
            "project number cannot contain / \\ : * ? \" < > | or control characters".to_string(),
        ));
    }
    Ok(value.to_string())
}

pub fn validate_project_address(raw: &str) -> Result<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(InvoiceError::MissingRequiredField("project address"));
    }
    Ok(value.to_string())
}

pub fn validate_contract_value(value: f64) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(InvoiceError::InvalidInput(
            "Please enter a positive value.".to_string(),
        ));
    }
    Ok(value)
}

/// Parses a typed contract value. A leading `$` is tolerated.
pub fn parse_contract_value(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
    let value: f64 = trimmed.parse().map_err(|_| {
        InvoiceError::InvalidInput("Invalid input. Please enter a number.".to_string())
    })?;
    validate_contract_value(value)
}

/// Parses a 1-based supplier choice against `count` configured suppliers.
pub fn parse_supplier_choice(raw: &str, count: usize) -> Result<usize> {
    let choice: usize = raw.trim().parse().map_err(|_| {
        InvoiceError::InvalidInput("Invalid input. Please enter a number.".to_string())
    })?;
    if choice == 0 || choice > count {
        return Err(InvoiceError::InvalidInput(format!(
            "Invalid choice. Please select {}.",
            choice_list(count)
        )));
    }
    Ok(choice)
}

/// "1, 2, or 3"
fn choice_list(count: usize) -> String {
    let numbers: Vec<String> = (1..=count).map(|n| n.to_string()).collect();
    match numbers.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} or {second}"),
        [rest @ .., last] => format!("{}, or {}", rest.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_number_allows_spaces_and_punctuation() {
        assert_eq!(validate_project_number("PN 2024-001 (B), #3").unwrap(), "PN 2024-001 (B), #3");
    }

    #[test]
    fn test_project_number_rejects_path_unsafe_values() {
        for raw in ["../etc", "a/b", "a\\b", "C:", "what?", "..", "tab\there"] {
            let err = validate_project_number(raw).unwrap_err();
            assert!(matches!(err, InvoiceError::InvalidInput(_)), "{raw} accepted");
        }
    }

    #[test]
    fn test_project_number_is_not_trimmed() {
        for raw in [" PN-1", "PN-1 ", "\tPN-1"] {
            let err = validate_project_number(raw).unwrap_err();
            assert!(matches!(err, InvoiceError::InvalidInput(_)), "{raw:?} accepted");
        }
    }

    #[test]
    fn test_project_number_required() {
        assert!(matches!(
            validate_project_number(""),
            Err(InvoiceError::MissingRequiredField("project number"))
        ));
    }

    #[test]
    fn test_parse_contract_value() {
        assert_eq!(parse_contract_value("10000").unwrap(), 10000.0);
        assert_eq!(parse_contract_value(" $0.01 ").unwrap(), 0.01);
        assert!(parse_contract_value("ten").is_err());
        assert!(parse_contract_value("0").is_err());
        assert!(parse_contract_value("-5").is_err());
        assert!(parse_contract_value("inf").is_err());
        assert!(parse_contract_value("").is_err());
    }

    #[test]
    fn test_parse_supplier_choice() {
        assert_eq!(parse_supplier_choice("2", 3).unwrap(), 2);
        assert!(parse_supplier_choice("x", 3).is_err());

        let err = parse_supplier_choice("4", 3).unwrap_err();
        assert_eq!(err.to_string(), "Invalid choice. Please select 1, 2, or 3.");
        assert!(parse_supplier_choice("0", 3).is_err());
    }

    #[test]
    fn test_choice_list() {
        assert_eq!(choice_list(1), "1");
        assert_eq!(choice_list(2), "1 or 2");
        assert_eq!(choice_list(4), "1, 2, 3, or 4");
    }
}
