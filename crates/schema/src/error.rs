//! Grooming errors, qualified by the dotted path of the offending field.

use krapper_core::ExprError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GroomErrorKind {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("can't be '{first}' and '{second}'")]
    Conflict { first: &'static str, second: &'static str },
    #[error("invalid {what}: '{value}'")]
    InvalidValue { what: &'static str, value: String },
    #[error("invalid alignment: '{0}'. Must be one of 'left', 'center' or 'right'")]
    InvalidAlignment(String),
    #[error("invalid {what} expression: {source}")]
    InvalidExpression { what: &'static str, source: ExprError },
    #[error("invalid duration: '{0}'")]
    InvalidDuration(String),
    #[error("invalid api version: '{0}'")]
    InvalidApiVersion(String),
    #[error("invalid kind: '{0}'")]
    InvalidKind(String),
    #[error("templateFile '{0}' must be resolved by the loader")]
    UnresolvedTemplateFile(String),
}

/// A grooming failure. `path` runs from the outermost field down to the one
/// that failed; it is empty for document-level errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}{kind}", field_prefix(.path))]
pub struct GroomError {
    pub path: Vec<String>,
    #[source]
    pub kind: GroomErrorKind,
}

fn field_prefix(path: &[String]) -> String {
    if path.is_empty() { String::new() } else { format!("field '{}': ", path.join(".")) }
}

impl GroomError {
    pub fn new(kind: GroomErrorKind) -> Self { Self { path: Vec::new(), kind } }

    /// Prefix the path with the enclosing field.
    pub fn at(mut self, field: impl Into<String>) -> Self {
        self.path.insert(0, field.into());
        self
    }

    pub fn dotted_path(&self) -> String { self.path.join(".") }
}

impl From<GroomErrorKind> for GroomError {
    fn from(kind: GroomErrorKind) -> Self { Self::new(kind) }
}

pub(crate) fn check_expr(what: &'static str, expr: &str) -> Result<(), GroomError> {
    krapper_core::check_expression(expr).map_err(|source| GroomErrorKind::InvalidExpression { what, source }.into())
}

pub(crate) fn check_alignment(a: &str) -> Result<(), GroomError> {
    if krapper_core::check_alignment(a) { Ok(()) } else { Err(GroomErrorKind::InvalidAlignment(a.to_string()).into()) }
}

pub(crate) fn check_ui(kind: krapper_core::UiKind, what: &'static str, component: &str) -> Result<(), GroomError> {
    if kind.accepts(component) {
        Ok(())
    } else {
        Err(GroomErrorKind::InvalidValue { what, value: component.to_string() }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_dotted_path() {
        let e = GroomError::new(GroomErrorKind::Missing("name")).at("replicas").at("spec");
        assert_eq!(e.dotted_path(), "spec.replicas");
        assert_eq!(e.to_string(), "field 'spec.replicas': name is required");
        assert_eq!(GroomError::new(GroomErrorKind::Missing("version")).to_string(), "version is required");
        let source = std::error::Error::source(&e).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("name is required"));
    }
}
