/// What the operator typed at the first prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKind {
    /// A specific listing link
    Listing(String),
    /// A location or property description without a link
    General(String),
}

/// A query carrying any http(s) link is a listing query for that link
pub fn classify_query(input: &str) -> QueryKind {
    let link = input
        .split_whitespace()
        .find(|token| token.starts_with("http://") || token.starts_with("https://"));

    match link {
        Some(url) => QueryKind::Listing(url.to_string()),
        None => QueryKind::General(input.trim().to_string()),
    }
}

/// Operator's answer when picking a search result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Cancel,
    /// Zero-based index into the candidate list
    Pick(usize),
    Invalid,
}

/// Parse a 1-based choice among `count` candidates; `q` cancels
pub fn parse_selection(input: &str, count: usize) -> Selection {
    let input = input.trim();
    if input.eq_ignore_ascii_case("q") {
        return Selection::Cancel;
    }

    match input.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Selection::Pick(n - 1),
        _ => Selection::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_anywhere_in_the_query_win() {
        assert_eq!(
            classify_query("analyze https://www.unegui.mn/adv/9129580/ please"),
            QueryKind::Listing("https://www.unegui.mn/adv/9129580/".into())
        );
        assert_eq!(
            classify_query("http://1212.mn/x"),
            QueryKind::Listing("http://1212.mn/x".into())
        );
    }

    #[test]
    fn plain_text_is_a_general_query() {
        assert_eq!(
            classify_query("  apartments in Khan-Uul "),
            QueryKind::General("apartments in Khan-Uul".into())
        );
        assert_eq!(classify_query("httpd config"), QueryKind::General("httpd config".into()));
    }

    #[test]
    fn selection_parsing() {
        assert_eq!(parse_selection("q", 2), Selection::Cancel);
        assert_eq!(parse_selection(" Q ", 2), Selection::Cancel);
        assert_eq!(parse_selection("1", 2), Selection::Pick(0));
        assert_eq!(parse_selection("2", 2), Selection::Pick(1));
        assert_eq!(parse_selection("3", 2), Selection::Invalid);
        assert_eq!(parse_selection("0", 2), Selection::Invalid);
        assert_eq!(parse_selection("two", 2), Selection::Invalid);
        assert_eq!(parse_selection("1", 0), Selection::Invalid);
    }
}
