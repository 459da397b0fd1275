//! Validators for the small sub-languages embedded in wrap documents:
//! alignments, UI component allow-lists, durations and expressions.
//!
//! Expressions are never evaluated here. [`check_expression`] only rejects
//! text that no expression evaluator could parse (unbalanced delimiters,
//! unterminated string literals).

pub const ALIGNMENTS: &[&str] = &["left", "center", "right"];

/// Which allow-list a `uiComponent` (or array `display`) is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiKind {
    Boolean,
    Duration,
    Integer,
    Number,
    String,
    ObjectCard,
    ObjectList,
    ArrayList,
}

impl UiKind {
    pub fn allowed(self) -> &'static [&'static str] {
        match self {
            UiKind::Boolean => &["checkbox"],
            UiKind::String => &["input", "textarea"],
            UiKind::ObjectCard => &["fieldSet"],
            UiKind::Duration | UiKind::Integer | UiKind::Number | UiKind::ObjectList | UiKind::ArrayList => &["raw"],
        }
    }

    pub fn accepts(self, component: &str) -> bool { self.allowed().contains(&component) }
}

pub fn check_alignment(a: &str) -> bool { ALIGNMENTS.contains(&a) }

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    #[error("unclosed '{0}' at offset {1}")]
    Unclosed(char, usize),
    #[error("unexpected '{0}' at offset {1}")]
    Unexpected(char, usize),
    #[error("unterminated string literal starting at offset {0}")]
    Unterminated(usize),
}

/// Structural check of an expression. An empty expression is valid.
pub fn check_expression(expr: &str) -> Result<(), ExprError> {
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut chars = expr.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\'' | '"' => {
                let mut closed = false;
                while let Some((_, n)) = chars.next() {
                    if n == '\\' { chars.next(); continue; }
                    if n == c { closed = true; break; }
                }
                if !closed { return Err(ExprError::Unterminated(i)); }
            }
            '(' | '[' | '{' => stack.push((c, i)),
            ')' | ']' | '}' => {
                let want = match c { ')' => '(', ']' => '[', _ => '{' };
                match stack.pop() {
                    Some((open, _)) if open == want => {}
                    _ => return Err(ExprError::Unexpected(c, i)),
                }
            }
            _ => {}
        }
    }
    match stack.pop() {
        Some((open, at)) => Err(ExprError::Unclosed(open, at)),
        None => Ok(()),
    }
}

/// Parse a Go-style duration (`300ms`, `1h30m`, `-1.5s`, `0`).
pub fn check_duration(s: &str) -> Option<std::time::Duration> {
    let body = s.strip_prefix(['-', '+']).unwrap_or(s);
    if body == "0" { return Some(std::time::Duration::ZERO); }
    if body.is_empty() { return None; }
    let mut rest = body;
    let mut nanos = 0f64;
    while !rest.is_empty() {
        let num_len = rest.find(|c: char| !(c.is_ascii_digit() || c == '.')).unwrap_or(rest.len());
        if num_len == 0 { return None; }
        let value: f64 = rest[..num_len].parse().ok()?;
        rest = &rest[num_len..];
        let unit_len = rest.find(|c: char| c.is_ascii_digit() || c == '.').unwrap_or(rest.len());
        let scale = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return None,
        };
        nanos += value * scale;
        rest = &rest[unit_len..];
    }
    Some(std::time::Duration::from_nanos(nanos as u64))
}
