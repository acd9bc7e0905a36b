use std::sync::LazyLock;

use regex::Regex;

static CASE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"OCP-\d{4,}").expect("case id pattern is valid"));

/// What a free-text item name says about the case it ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseIdentity {
    /// Case identifiers in order of appearance, duplicates kept.
    pub identifiers: Vec<String>,
    pub author: String,
    pub title: String,
}

impl CaseIdentity {
    /// Keys the item is recorded under: every identifier, or the raw name
    /// when there is none.
    pub fn record_keys(&self, name: &str) -> Vec<String> {
        if self.identifiers.is_empty() {
            vec![name.to_string()]
        } else {
            self.identifiers.clone()
        }
    }
}

pub trait CaseNameParser {
    fn parse(&self, name: &str) -> CaseIdentity;
}

/// Colon-split policy used by the CI item names: author is the second
/// `:`-segment and title the last one. Segments in between are dropped
/// and nothing is trimmed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ColonSplitParser;

impl CaseNameParser for ColonSplitParser {
    fn parse(&self, name: &str) -> CaseIdentity {
        let identifiers: Vec<String> = CASE_ID_REGEX
            .find_iter(name)
            .map(|m| m.as_str().to_string())
            .collect();

        if identifiers.is_empty() || !name.contains(':') {
            return CaseIdentity {
                identifiers,
                author: String::new(),
                title: name.to_string(),
            };
        }

        let segments: Vec<&str> = name.split(':').collect();
        CaseIdentity {
            identifiers,
            author: segments[1].to_string(),
            title: segments[segments.len() - 1].to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_case_identity(name: &str) -> CaseIdentity {
        ColonSplitParser.parse(name)
    }

    #[test]
    fn test_single_identifier_with_author_and_title() {
        let identity = extract_case_identity("OCP-1001: alice: sample test");

        assert_eq!(identity.identifiers, vec!["OCP-1001"]);
        assert_eq!(identity.author, " alice");
        assert_eq!(identity.title, " sample test");
    }

    #[test]
    fn test_identifiers_keep_order_and_duplicates() {
        let identity = extract_case_identity("OCP-2222 then OCP-11111 and OCP-2222 again");

        assert_eq!(
            identity.identifiers,
            vec!["OCP-2222", "OCP-11111", "OCP-2222"]
        );
    }

    #[test]
    fn test_three_digit_suffix_is_not_an_identifier() {
        let identity = extract_case_identity("OCP-123 is too short");

        assert!(identity.identifiers.is_empty());
        assert_eq!(identity.title, "OCP-123 is too short");
    }

    #[test]
    fn test_no_identifier_keeps_full_name_as_title() {
        let name = "[sig-olm] install: operator should work";
        let identity = extract_case_identity(name);

        assert!(identity.identifiers.is_empty());
        assert_eq!(identity.author, "");
        assert_eq!(identity.title, name);
        assert_eq!(identity.record_keys(name), vec![name.to_string()]);
    }

    #[test]
    fn test_identifier_without_colon_uses_whole_name() {
        let name = "Author-xzha-Medium-OCP-43191-subscription works";
        let identity = extract_case_identity(name);

        assert_eq!(identity.identifiers, vec!["OCP-43191"]);
        assert_eq!(identity.author, "");
        assert_eq!(identity.title, name);
    }

    #[test]
    fn test_single_colon_takes_author_and_title_from_same_segment() {
        let identity = extract_case_identity("[sig-olm] Author:xzha-OCP-43191-works");

        assert_eq!(identity.author, "xzha-OCP-43191-works");
        assert_eq!(identity.title, "xzha-OCP-43191-works");
    }

    #[test]
    fn test_middle_segments_are_dropped() {
        let identity = extract_case_identity("OCP-5555:bob:ignored:also ignored:final title");

        assert_eq!(identity.author, "bob");
        assert_eq!(identity.title, "final title");
    }

    #[test]
    fn test_record_keys_use_identifiers() {
        let name = "OCP-1001 OCP-1002: carol: two cases";
        let identity = extract_case_identity(name);

        assert_eq!(identity.record_keys(name), vec!["OCP-1001", "OCP-1002"]);
    }
}
