//! Shared paging and search-filter helpers for the repository queries.
//!
//! All listings share one contract: offset pagination ordered by creation
//! time descending, and an optional case-insensitive substring filter
//! OR-combined across the entity's searchable columns.

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Turn a raw search term into an ILIKE pattern.
///
/// Returns `None` for absent or whitespace-only terms, which means the
/// listing is unfiltered.
pub fn search_pattern(term: Option<&str>) -> Option<String> {
    let term = term?.trim();
    if term.is_empty() {
        return None;
    }
    Some(format!("%{}%", escape_like(term)))
}

/// Build the OR-combined ILIKE clause for a fixed set of searchable
/// columns, binding the pattern at `$param`.
pub fn search_clause(columns: &[&str], param: usize) -> String {
    let parts: Vec<String> = columns
        .iter()
        .map(|col| format!("{} ILIKE ${}", col, param))
        .collect();
    format!("({})", parts.join(" OR "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_passes_plain_text() {
        assert_eq!(escape_like("babad tanah jawi"), "babad tanah jawi");
    }

    #[test]
    fn test_escape_like_escapes_wildcards() {
        assert_eq!(escape_like("100%_done"), "100\\%\\_done");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_search_pattern_none_for_empty() {
        assert_eq!(search_pattern(None), None);
        assert_eq!(search_pattern(Some("")), None);
        assert_eq!(search_pattern(Some("   ")), None);
    }

    #[test]
    fn test_search_pattern_wraps_and_escapes() {
        assert_eq!(search_pattern(Some("babad")), Some("%babad%".to_string()));
        assert_eq!(search_pattern(Some(" 50% ")), Some("%50\\%%".to_string()));
    }

    #[test]
    fn test_search_clause_or_combines_columns() {
        let clause = search_clause(&["title", "description", "author"], 1);
        assert_eq!(
            clause,
            "(title ILIKE $1 OR description ILIKE $1 OR author ILIKE $1)"
        );
    }
}
