//! Field tree: named nodes carrying one type variant each, nested through
//! object fields and array items.

use krapper_core::{join_path, labelize};
use serde::Serialize;

use crate::error::{check_expr, check_ui, GroomError, GroomErrorKind};
use crate::raw::{RawArray, RawField, RawObject, TypeSlots};
use crate::types::{
    FieldArray, FieldBoolean, FieldDuration, FieldInteger, FieldNumber, FieldObject, FieldString, Validation,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub label: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tooltip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
    pub required: bool,
    /// Visibility gate.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub condition: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub read_only: String,
    #[serde(flatten)]
    pub kind: FieldType,
}

/// Exactly one type variant, serialized inline as `<variant>: {...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    Array(FieldArray),
    Boolean(FieldBoolean),
    Duration(FieldDuration),
    Integer(FieldInteger),
    Number(FieldNumber),
    Object(FieldObject),
    String(FieldString),
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Array(_) => "array",
            FieldType::Boolean(_) => "boolean",
            FieldType::Duration(_) => "duration",
            FieldType::Integer(_) => "integer",
            FieldType::Number(_) => "number",
            FieldType::Object(_) => "object",
            FieldType::String(_) => "string",
        }
    }

    /// Value expression the UI reads this field from.
    pub fn value(&self) -> Option<&str> {
        match self {
            FieldType::Boolean(f) => Some(&f.value),
            FieldType::Duration(f) => Some(&f.value),
            FieldType::Integer(f) => Some(&f.value),
            FieldType::Number(f) => Some(&f.value),
            FieldType::String(f) => Some(&f.value),
            FieldType::Object(f) => Some(&f.base_path),
            FieldType::Array(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
    #[serde(flatten)]
    pub kind: Box<FieldType>,
}

/// Groom a field list under `parent_path`, in declaration order.
/// Errors are prefixed with the failing field's name (or `[index]` when the
/// name itself is missing).
pub(crate) fn groom_fields(fields: Vec<RawField>, parent_path: &str) -> Result<Vec<Field>, GroomError> {
    fields
        .into_iter()
        .enumerate()
        .map(|(idx, raw)| {
            let tag = if raw.name.is_empty() { format!("[{idx}]") } else { raw.name.clone() };
            raw.groom(parent_path).map_err(|e| e.at(tag))
        })
        .collect()
}

impl RawField {
    pub(crate) fn groom(self, parent_path: &str) -> Result<Field, GroomError> {
        let (common, slots) = self.split();
        if common.name.is_empty() {
            return Err(GroomErrorKind::Missing("field name").into());
        }
        let label = if common.label.is_empty() { labelize(&common.name) } else { common.label };
        if let Some(v) = common.validation.as_ref() {
            v.groom()?;
        }
        check_expr("condition", &common.condition)?;
        check_expr("readOnly", &common.read_only)?;
        let default_value = join_path(parent_path, &common.name);
        let kind = slots.groom(&default_value, &label)?;
        Ok(Field {
            name: common.name,
            label,
            tooltip: common.tooltip,
            validation: common.validation,
            required: common.required,
            condition: common.condition,
            read_only: common.read_only,
            kind,
        })
    }
}

impl TypeSlots {
    fn set(&self) -> Vec<&'static str> {
        [
            ("array", self.array.is_some()),
            ("boolean", self.boolean.is_some()),
            ("duration", self.duration.is_some()),
            ("integer", self.integer.is_some()),
            ("number", self.number.is_some()),
            ("object", self.object.is_some()),
            ("string", self.string.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }

    /// Select the single variant and groom it. No variant at all means string.
    pub(crate) fn groom(self, default_value: &str, label: &str) -> Result<FieldType, GroomError> {
        let set = self.set();
        if let [first, second, ..] = set.as_slice() {
            return Err(GroomErrorKind::Conflict { first: *first, second: *second }.into());
        }
        let kind = match self {
            TypeSlots { array: Some(a), .. } => FieldType::Array(a.groom(default_value, label)?),
            TypeSlots { boolean: Some(mut b), .. } => {
                b.groom(default_value, label)?;
                FieldType::Boolean(b)
            }
            TypeSlots { duration: Some(mut d), .. } => {
                d.groom(default_value, label)?;
                FieldType::Duration(d)
            }
            TypeSlots { integer: Some(mut i), .. } => {
                i.groom(default_value, label)?;
                FieldType::Integer(i)
            }
            TypeSlots { number: Some(mut n), .. } => {
                n.groom(default_value, label)?;
                FieldType::Number(n)
            }
            TypeSlots { object: Some(o), .. } => FieldType::Object(o.groom(default_value, label)?),
            TypeSlots { string, .. } => {
                let mut s = string.unwrap_or_default();
                s.groom(default_value, label)?;
                FieldType::String(s)
            }
        };
        Ok(kind)
    }
}

impl RawArray {
    fn groom(self, default_value: &str, label: &str) -> Result<FieldArray, GroomError> {
        let (validation, slots) = self.item.split();
        if let Some(v) = validation.as_ref() {
            v.groom()?;
        }
        let kind = slots.groom(default_value, label)?;
        let mut in_list = self.in_list;
        if let Some(il) = in_list.as_mut() {
            il.groom_array(label)?;
        }
        Ok(FieldArray { item: ArrayItem { validation, kind: Box::new(kind) }, in_list })
    }
}

impl RawObject {
    fn groom(self, default_value: &str, label: &str) -> Result<FieldObject, GroomError> {
        let base_path = if self.base_path.is_empty() { default_value.to_string() } else { self.base_path };
        let fields = groom_fields(self.fields, &base_path)?;
        let ui_component = if self.ui_component.is_empty() { "fieldSet".to_string() } else { self.ui_component };
        check_ui(krapper_core::UiKind::ObjectCard, "uiComponent", &ui_component)?;
        let mut in_list = self.in_list;
        if let Some(il) = in_list.as_mut() {
            il.groom_object(label)?;
        }
        Ok(FieldObject { base_path, fields, ui_component, in_list })
    }
}
