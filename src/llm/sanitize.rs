use regex::Regex;
use std::sync::LazyLock;

// Colon-bearing prefixes come first so that "SQL:" is not half-matched by the
// bare "sql" token.
static PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(sql\s*:|query\s*:|sql)\s*").unwrap());

/// Strips a single leading `sql` / `SQL:` / `Query:` label from raw model
/// output, after trimming surrounding whitespace.
///
/// Fenced code blocks, trailing commentary, and stacked prefixes are left
/// alone; on non-matching input this is a no-op beyond the trim.
pub fn clean_sql(raw: &str) -> String {
    let trimmed = raw.trim();
    PREFIX_RE.replace(trimmed, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bare_sql_prefix() {
        assert_eq!(clean_sql("sql SELECT 1"), "SELECT 1");
    }

    #[test]
    fn strips_colon_prefixes() {
        assert_eq!(clean_sql("SQL: SELECT 1"), "SELECT 1");
        assert_eq!(clean_sql("Query: SELECT 1"), "SELECT 1");
    }

    #[test]
    fn is_case_insensitive() {
        assert_eq!(clean_sql("Sql   SELECT 1"), "SELECT 1");
        assert_eq!(clean_sql("qUeRy: SELECT 1"), "SELECT 1");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(clean_sql("  SELECT 1\n"), "SELECT 1");
    }

    #[test]
    fn is_a_no_op_without_a_recognized_prefix() {
        assert_eq!(clean_sql("SELECT name FROM users"), "SELECT name FROM users");
        assert_eq!(clean_sql("WITH t AS (SELECT 1) SELECT * FROM t"),
                   "WITH t AS (SELECT 1) SELECT * FROM t");
    }

    #[test]
    fn is_idempotent_on_clean_input() {
        let once = clean_sql("Query: SELECT id FROM orders");
        assert_eq!(clean_sql(&once), once);
    }

    #[test]
    fn strips_only_the_first_prefix() {
        // Stacked labels are a known gap, handled once only.
        assert_eq!(clean_sql("sql SQL: SELECT 1"), "SQL: SELECT 1");
    }

    #[test]
    fn does_not_touch_mid_string_labels() {
        assert_eq!(
            clean_sql("SELECT 'sql' FROM dual"),
            "SELECT 'sql' FROM dual"
        );
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(clean_sql(""), "");
        assert_eq!(clean_sql("   "), "");
    }
}
