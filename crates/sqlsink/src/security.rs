//! Identifier validation for sqlsink.
//!
//! Table, schema and column names are interpolated into DDL and DML text
//! unquoted, so every identifier is checked once when a
//! [`TableIdentifier`](crate::identifier::TableIdentifier) or
//! [`RecordSchema`](crate::schema::RecordSchema) is built. Generated
//! statements never see an unchecked name.

use crate::error::Error;

/// Maximum identifier length accepted
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// Validate a single SQL identifier part (no dots).
///
/// - Must not be empty
/// - At most [`MAX_IDENTIFIER_LEN`] characters
/// - Must start with an ASCII letter or underscore
/// - May only contain ASCII alphanumerics, underscores and `$`
///
/// # Examples
///
/// ```
/// use sqlsink::security::validate_sql_identifier;
///
/// assert!(validate_sql_identifier("users").is_ok());
/// assert!(validate_sql_identifier("created_on").is_ok());
///
/// assert!(validate_sql_identifier("x; DROP TABLE users--").is_err());
/// assert!(validate_sql_identifier("").is_err());
/// assert!(validate_sql_identifier("schema.table").is_err());
/// ```
pub fn validate_sql_identifier(name: &str) -> crate::Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_identifier(name, "identifier cannot be empty"));
    }

    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(Error::invalid_identifier(
            name,
            format!(
                "identifier too long: {} chars (max {})",
                name.len(),
                MAX_IDENTIFIER_LEN
            ),
        ));
    }

    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => {
            return Err(Error::invalid_identifier(
                name,
                "must start with a letter or underscore",
            ));
        }
    }

    for c in chars {
        if !c.is_ascii_alphanumeric() && c != '_' && c != '$' {
            return Err(Error::invalid_identifier(
                name,
                format!("contains invalid character '{}'", c),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(validate_sql_identifier("users").is_ok());
        assert!(validate_sql_identifier("test_table").is_ok());
        assert!(validate_sql_identifier("_private").is_ok());
        assert!(validate_sql_identifier("ACCOUNTS").is_ok());
        assert!(validate_sql_identifier("col$1").is_ok());
    }

    #[test]
    fn test_length_limit() {
        let max = "a".repeat(MAX_IDENTIFIER_LEN);
        assert!(validate_sql_identifier(&max).is_ok());

        let long = "a".repeat(MAX_IDENTIFIER_LEN + 1);
        assert!(validate_sql_identifier(&long).is_err());
    }

    #[test]
    fn test_starts_with_digit() {
        assert!(validate_sql_identifier("1users").is_err());
        assert!(validate_sql_identifier("$x").is_err());
    }

    #[test]
    fn test_injection_attempts() {
        assert!(validate_sql_identifier("x; DROP TABLE users--").is_err());
        assert!(validate_sql_identifier("x' OR '1'='1").is_err());
        assert!(validate_sql_identifier("user name").is_err());
        assert!(validate_sql_identifier("x\nDROP TABLE").is_err());
        assert!(validate_sql_identifier("tabl\u{0435}").is_err());
        assert!(validate_sql_identifier("a(b)").is_err());
    }

    #[test]
    fn test_error_names_identifier() {
        let err = validate_sql_identifier("bad-name").unwrap_err();
        assert!(err.to_string().contains("bad-name"));
    }
}
