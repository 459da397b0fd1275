//! Krapper core: small pure helpers shared by the schema engine and the store.

#![forbid(unsafe_code)]

pub mod labelize;
pub mod path;
pub mod validate;

pub use labelize::labelize;
pub use path::join_path;
pub use validate::{check_alignment, check_duration, check_expression, ExprError, UiKind};

/// `apiVersion` every wrap document must declare.
pub const API_VERSION: &str = "krapper.kubotal.io/v1alpha1";
/// `kind` every wrap document must declare.
pub const WRAP_KIND: &str = "Wrap";

pub mod prelude {
    pub use super::{join_path, labelize, API_VERSION, WRAP_KIND};
}
