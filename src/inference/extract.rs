//! SQL extraction from model output.
//!
//! The model is asked to finish with its query inside a ```` ```sql ```` fenced
//! block. Extraction is plain substring search, not parsing:
//!
//! - nothing happens unless the text contains ```` ```sql ````
//! - the query starts after the last ```` ```sql ```` marker (and its newline)
//! - the query ends at the last ```` ``` ```` in the text
//!
//! With several fenced blocks the last one wins. An unterminated fence yields
//! an empty query, which the read-only check then rejects.

const SQL_FENCE: &str = "```sql";
const FENCE: &str = "```";

/// Pull the fenced SQL query out of `response`, if a SQL fence is present.
pub fn extract_sql(response: &str) -> Option<&str> {
    let marker = response.rfind(SQL_FENCE)?;
    let mut start = marker + SQL_FENCE.len();
    if response[start..].starts_with('\n') {
        start += 1;
    }

    // rfind always succeeds here: the marker itself contains a fence
    let end = response.rfind(FENCE).unwrap_or(marker);
    if end <= start {
        return Some("");
    }

    Some(response[start..end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_fenced_query() {
        let response = "Let me think.\n```sql\nSELECT * FROM t\n```\nThis returns all rows.";
        assert_eq!(extract_sql(response), Some("SELECT * FROM t"));
    }

    #[test]
    fn test_no_fence_returns_none() {
        assert_eq!(extract_sql("The question is unrelated to the database."), None);
        assert_eq!(extract_sql("```\nSELECT 1\n```"), None);
    }

    #[test]
    fn test_last_sql_block_wins() {
        let response = "First try:\n```sql\nSELECT 1\n```\nBetter:\n```sql\nSELECT 2\n```\n";
        assert_eq!(extract_sql(response), Some("SELECT 2"));
    }

    #[test]
    fn test_unterminated_fence_yields_empty_query() {
        assert_eq!(extract_sql("```sql\nSELECT * FROM t"), Some(""));
    }

    #[test]
    fn test_marker_without_newline() {
        assert_eq!(extract_sql("```sql SELECT 1 ```"), Some("SELECT 1"));
    }

    #[test]
    fn test_multiline_query_preserved() {
        let response = "```sql\nSELECT name\nFROM users\nWHERE id = 1;\n```";
        assert_eq!(
            extract_sql(response),
            Some("SELECT name\nFROM users\nWHERE id = 1;")
        );
    }

    #[test]
    fn test_trailing_plain_fence_after_sql_block() {
        // the closing fence is the last ``` anywhere in the text
        let response = "```sql\nSELECT 1\n```\nOutput:\n```\n1\n```";
        assert_eq!(extract_sql(response), Some("SELECT 1\n```\nOutput:\n```\n1"));
    }

    #[test]
    fn test_marker_is_case_sensitive() {
        assert_eq!(extract_sql("```SQL\nSELECT 1\n```"), None);
    }
}
