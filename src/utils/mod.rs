//! Shared helpers.

pub mod path;
pub mod xml;

/// Format count with noun, handling pluralization
///
/// - `plural_count(0, "card")` -> `"0 cards"`
/// - `plural_count(1, "card")` -> `"1 card"`
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_count() {
        assert_eq!(plural_count(0, "card"), "0 cards");
        assert_eq!(plural_count(1, "card"), "1 card");
        assert_eq!(plural_count(5, "social card"), "5 social cards");
    }
}
