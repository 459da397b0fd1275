//! Wrap documents as decoded from YAML, before grooming.
//!
//! Decoding is strict: unknown keys are rejected at every level. A field's
//! type variant is one of seven optional keys inlined next to the common
//! keys; choosing exactly one of them is a grooming concern so that a
//! conflict is reported with the path of the field.

use serde::Deserialize;

use crate::types::{BlockInList, FieldBoolean, FieldDuration, FieldInteger, FieldNumber, FieldString, Validation};
use crate::wrap::{Operations, Source};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct RawWrap {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub version: String,
    pub label: String,
    pub description: String,
    pub menu_mode: String,
    pub source: Source,
    pub operations: Operations,
    pub schema: RawSchema,
    pub template: String,
    /// Path of a file holding the template, relative to the document.
    pub template_file: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct RawSchema {
    pub validation: Option<Validation>,
    pub value_path: String,
    pub fields: Vec<RawField>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct RawField {
    pub name: String,
    pub label: String,
    pub tooltip: String,
    pub required: bool,
    pub validation: Option<Validation>,
    pub condition: String,
    pub read_only: String,
    pub array: Option<RawArray>,
    pub boolean: Option<FieldBoolean>,
    pub duration: Option<FieldDuration>,
    pub integer: Option<FieldInteger>,
    pub number: Option<FieldNumber>,
    pub object: Option<RawObject>,
    pub string: Option<FieldString>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct RawArray {
    pub item: RawItem,
    #[serde(rename = "inList", alias = "inlist")]
    pub in_list: Option<BlockInList>,
}

/// Array element schema: an optional validation plus one type variant.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct RawItem {
    pub validation: Option<Validation>,
    pub array: Option<Box<RawArray>>,
    pub boolean: Option<FieldBoolean>,
    pub duration: Option<FieldDuration>,
    pub integer: Option<FieldInteger>,
    pub number: Option<FieldNumber>,
    pub object: Option<RawObject>,
    pub string: Option<FieldString>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct RawObject {
    pub base_path: String,
    pub fields: Vec<RawField>,
    pub ui_component: String,
    #[serde(rename = "inList", alias = "inlist")]
    pub in_list: Option<BlockInList>,
}

/// The seven variant slots of a field or array item, detached from the
/// surrounding keys.
#[derive(Debug, Default)]
pub(crate) struct TypeSlots {
    pub array: Option<RawArray>,
    pub boolean: Option<FieldBoolean>,
    pub duration: Option<FieldDuration>,
    pub integer: Option<FieldInteger>,
    pub number: Option<FieldNumber>,
    pub object: Option<RawObject>,
    pub string: Option<FieldString>,
}

impl RawField {
    pub(crate) fn split(self) -> (RawFieldCommon, TypeSlots) {
        let RawField { name, label, tooltip, required, validation, condition, read_only, array, boolean, duration, integer, number, object, string } = self;
        (
            RawFieldCommon { name, label, tooltip, required, validation, condition, read_only },
            TypeSlots { array, boolean, duration, integer, number, object, string },
        )
    }
}

impl RawItem {
    pub(crate) fn split(self) -> (Option<Validation>, TypeSlots) {
        let RawItem { validation, array, boolean, duration, integer, number, object, string } = self;
        (validation, TypeSlots { array: array.map(|a| *a), boolean, duration, integer, number, object, string })
    }
}

pub(crate) struct RawFieldCommon {
    pub name: String,
    pub label: String,
    pub tooltip: String,
    pub required: bool,
    pub validation: Option<Validation>,
    pub condition: String,
    pub read_only: String,
}
