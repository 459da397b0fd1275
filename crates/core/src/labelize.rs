//! Human label derivation from field and wrap names.

use once_cell::sync::Lazy;
use regex::Regex;

// Acronym followed by a capitalized word, or lower/digit followed by upper.
static CAMEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])|([a-z0-9])([A-Z])").unwrap());
static DELIMS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[_-]+").unwrap());

/// Turn an identifier into a display label.
///
/// Camel-case and acronym boundaries become spaces, as do `_` and `-`.
/// All-uppercase tokens of two or more characters are kept as acronyms, every
/// other token is lower-cased and only the first one gets a capital letter.
///
/// ```text
/// HTTPRequestStatus -> HTTP request status
/// my-XML-parser     -> My XML parser
/// ```
pub fn labelize(input: &str) -> String {
    if input.is_empty() { return String::new(); }
    let split = CAMEL.replace_all(input, "${1}${3} ${2}${4}");
    let split = DELIMS.replace_all(&split, " ");

    let mut words: Vec<String> = split
        .split_whitespace()
        .map(|w| if is_acronym(w) { w.to_uppercase() } else { w.to_lowercase() })
        .collect();
    let Some(first) = words.first_mut() else { return String::new() };
    if !is_acronym(first) {
        *first = capitalize(first);
    }
    words.join(" ")
}

fn is_acronym(s: &str) -> bool {
    s.chars().count() > 1 && s == s.to_uppercase()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labelize_table() {
        let cases = [
            ("HTTPRequestStatus", "HTTP request status"),
            ("APIClient", "API client"),
            ("getHTTPServer", "Get HTTP server"),
            ("hello_world", "Hello world"),
            ("my-XML-parser", "My XML parser"),
            ("ParseJSONFile", "Parse JSON file"),
            ("simpleTest", "Simple test"),
            ("JSON", "JSON"),
            ("", ""),
            ("___HTTP__Server", "HTTP server"),
            ("XMLHTTPRequest", "XMLHTTP request"),
            ("UserID", "User ID"),
            ("replicas", "Replicas"),
        ];
        for (input, want) in cases {
            assert_eq!(labelize(input), want, "labelize({input:?})");
        }
    }

    #[test]
    fn labelize_is_idempotent_on_labels() {
        for input in ["HTTPRequestStatus", "my-XML-parser", "UserID", "hello_world", "JSON"] {
            let once = labelize(input);
            assert_eq!(labelize(&once), once);
        }
        assert_eq!(labelize("HTTP request status"), "HTTP request status");
    }

    #[test]
    fn separators_only_give_empty_label() {
        assert_eq!(labelize("__--"), "");
    }
}
