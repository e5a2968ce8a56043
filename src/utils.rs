// ABOUTME: Small helpers shared by the snapshot store and the sync pipelines
// ABOUTME: Identifier quoting, display sanitizing and column-name unqualifying

/// Quote an identifier (table name) for use in SQLite statements
///
/// Wraps the name in double quotes and doubles any embedded double quote, so
/// any table name coming from the remote store maps to exactly one snapshot
/// table and can never break out of the identifier.
///
/// # Examples
///
/// ```
/// # use table_snapshot_sync::utils::quote_identifier;
/// assert_eq!(quote_identifier("users"), "\"users\"");
/// assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
/// ```
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Sanitize an identifier (table name, row key) for display
///
/// Removes control characters and limits length to prevent log injection and
/// keep error messages readable.
///
/// **Note**: This is for display purposes only. Use [`quote_identifier`] for SQL.
///
/// # Examples
///
/// ```
/// # use table_snapshot_sync::utils::sanitize_identifier;
/// assert_eq!(sanitize_identifier("normal_table"), "normal_table");
/// assert_eq!(sanitize_identifier("table\x00name"), "tablename");
///
/// let long_name = "a".repeat(200);
/// assert_eq!(sanitize_identifier(&long_name).len(), 100);
/// ```
pub fn sanitize_identifier(identifier: &str) -> String {
    identifier
        .chars()
        .filter(|c| !c.is_control())
        .take(100)
        .collect()
}

/// Strip the `family:` qualifier the table store puts in front of column names
///
/// Only the exact family of the item is stripped; a column that happens to
/// contain a colon keeps everything after the qualifier.
pub fn unqualified_column<'a>(family: &str, column: &'a str) -> &'a str {
    column
        .strip_prefix(family)
        .and_then(|rest| rest.strip_prefix(':'))
        .unwrap_or(column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("t"), "\"t\"");
        assert_eq!(quote_identifier(""), "\"\"");
        assert_eq!(quote_identifier("x\"; DROP"), "\"x\"\"; DROP\"");
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("normal_table"), "normal_table");
        assert_eq!(sanitize_identifier("table\nname"), "tablename");
        assert_eq!(sanitize_identifier(&"a".repeat(200)).len(), 100);
    }

    #[test]
    fn test_unqualified_column() {
        assert_eq!(unqualified_column("cf1", "cf1:mycolumn"), "mycolumn");
        assert_eq!(unqualified_column("cf1", "mycolumn"), "mycolumn");
        assert_eq!(unqualified_column("cf1", "cf1:a:b"), "a:b");
        assert_eq!(unqualified_column("cf1", "cf10:x"), "cf10:x");
        assert_eq!(unqualified_column("cf1", "cf1:"), "");
    }
}
