//! Textual keyword blocklist for the SQL runner.
//!
//! A plain case-insensitive substring check. It also matches inside string
//! literals, identifiers and comments (`dropped_at` is rejected) and does not
//! stop other destructive statements. It is not a safety boundary.

use crate::error::{ConsoleError, ConsoleResult};

/// Keywords that reject a runner statement wherever they appear.
pub const FORBIDDEN_KEYWORDS: [&str; 3] = ["DROP", "TRUNCATE", "DELETE"];

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a valid SQL query.";

/// First forbidden keyword contained in `sql`, compared case-insensitively.
pub fn find_forbidden_keyword(sql: &str) -> Option<&'static str> {
    let upper = sql.to_uppercase();
    FORBIDDEN_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| upper.contains(keyword))
}

/// Reject blank input and anything containing a forbidden keyword.
pub fn check_sql(sql: &str) -> ConsoleResult<()> {
    if sql.trim().is_empty() {
        return Err(ConsoleError::invalid_input(EMPTY_QUERY_MESSAGE));
    }
    match find_forbidden_keyword(sql) {
        Some(keyword) => Err(ConsoleError::forbidden_sql(keyword)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_sql_rejected() {
        for sql in ["", "   ", "\n\t"] {
            let err = check_sql(sql).unwrap_err();
            assert_eq!(err.to_string(), EMPTY_QUERY_MESSAGE);
        }
    }

    #[test]
    fn test_keywords_rejected_in_any_case() {
        assert_eq!(find_forbidden_keyword("DELETE FROM x"), Some("DELETE"));
        assert_eq!(find_forbidden_keyword("truncate table x"), Some("TRUNCATE"));
        assert_eq!(find_forbidden_keyword("Drop Table x"), Some("DROP"));
    }

    #[test]
    fn test_keywords_matched_inside_comments_and_names() {
        assert_eq!(
            find_forbidden_keyword("select * from x; -- drop nothing"),
            Some("DROP")
        );
        assert_eq!(
            find_forbidden_keyword("SELECT dropped_at FROM events"),
            Some("DROP")
        );
        assert_eq!(
            find_forbidden_keyword("SELECT 'please delete me'"),
            Some("DELETE")
        );
    }

    #[test]
    fn test_plain_queries_pass() {
        assert!(check_sql("SELECT * FROM accounts").is_ok());
        assert!(check_sql("UPDATE accounts SET name = 'x'").is_ok());
    }

    #[test]
    fn test_forbidden_message_names_keyword() {
        let err = check_sql("drop table accounts").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("'DROP'"));
    }
}
