//! Dotted value-path helpers.

/// Join two value-path elements with exactly one `.` between them.
///
/// `a.` + `.b` collapses to `a.b`, `a` + `b` gets a dot inserted, and a single
/// dot on either side is kept as is.
pub fn join_path(parent: &str, child: &str) -> String {
    let s = parent.ends_with('.');
    let p = child.starts_with('.');
    match (s, p) {
        (true, true) => format!("{}{}", parent, &child[1..]),
        (false, false) => format!("{}.{}", parent, child),
        _ => format!("{}{}", parent, child),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_collapses_and_inserts_dots() {
        assert_eq!(join_path("a.", ".b"), "a.b");
        assert_eq!(join_path("a", "b"), "a.b");
        assert_eq!(join_path("a.", "b"), "a.b");
        assert_eq!(join_path("a", ".b"), "a.b");
    }

    #[test]
    fn empty_root_yields_leading_dot() {
        assert_eq!(join_path("", "spec"), ".spec");
        assert_eq!(join_path(".spec", "replicas"), ".spec.replicas");
    }
}
