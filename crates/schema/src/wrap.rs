//! The wrap document: a named, versioned UI schema bound to one resource type.

use std::collections::BTreeMap;

use krapper_core::{labelize, API_VERSION, WRAP_KIND};
use serde::{Deserialize, Serialize};

use crate::error::{GroomError, GroomErrorKind};
use crate::field::{groom_fields, Field};
use crate::raw::RawWrap;
use crate::types::Validation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuMode {
    /// Entities as a grid in the main pane.
    Grid,
    /// Entities as a sub-menu; the selected one is shown in view mode.
    SubMenu,
}

impl MenuMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "grid" => Some(MenuMode::Grid),
            "subMenu" => Some(MenuMode::SubMenu),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MenuMode::Grid => "grid",
            MenuMode::SubMenu => "subMenu",
        }
    }
}

/// The cluster resource type a wrap renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Source {
    pub api_version: String,
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub selector: BTreeMap<String, String>,
    pub cluster_scoped: bool,
}

impl Source {
    /// Namespace to list from; cluster-scoped sources ignore it.
    pub fn effective_namespace(&self) -> Option<&str> {
        if self.cluster_scoped || self.namespace.is_empty() { None } else { Some(&self.namespace) }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Operations {
    pub view: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value_path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
}

/// A groomed wrap document. Immutable once built; the store shares it behind
/// an `Arc` and replaces it wholesale when its file changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Wrap {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub version: String,
    pub label: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub menu_mode: MenuMode,
    pub source: Source,
    pub operations: Operations,
    pub schema: Schema,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub template: String,
}

/// Validate a decoded document and resolve every default.
///
/// Document-level checks run first (identity, menu mode, source), then the
/// root validation, then the field tree depth first in declaration order.
pub fn groom(raw: RawWrap) -> Result<Wrap, GroomError> {
    if raw.api_version != API_VERSION {
        return Err(GroomErrorKind::InvalidApiVersion(raw.api_version).into());
    }
    if raw.kind != WRAP_KIND {
        return Err(GroomErrorKind::InvalidKind(raw.kind).into());
    }
    if raw.name.is_empty() {
        return Err(GroomErrorKind::Missing("name").into());
    }
    if raw.version.is_empty() {
        return Err(GroomErrorKind::Missing("version").into());
    }
    let label = if raw.label.is_empty() { labelize(&raw.name) } else { raw.label };
    if raw.menu_mode.is_empty() {
        return Err(GroomErrorKind::Missing("menuMode").into());
    }
    let menu_mode = MenuMode::parse(&raw.menu_mode)
        .ok_or_else(|| GroomErrorKind::InvalidValue { what: "menuMode", value: raw.menu_mode.clone() })?;
    if raw.source.api_version.is_empty() {
        return Err(GroomErrorKind::Missing("source.apiVersion").into());
    }
    if raw.source.kind.is_empty() {
        return Err(GroomErrorKind::Missing("source.kind").into());
    }
    if !raw.template_file.is_empty() {
        return Err(GroomErrorKind::UnresolvedTemplateFile(raw.template_file).into());
    }

    let schema = raw.schema;
    if let Some(v) = schema.validation.as_ref() {
        v.groom()?;
    }
    let fields = groom_fields(schema.fields, &schema.value_path)?;

    Ok(Wrap {
        api_version: raw.api_version,
        kind: raw.kind,
        name: raw.name,
        version: raw.version,
        label,
        description: raw.description,
        menu_mode,
        source: raw.source,
        operations: raw.operations,
        schema: Schema { validation: schema.validation, value_path: schema.value_path, fields },
        template: raw.template,
    })
}
