//! Field type variants and their in-list projections.
//!
//! Each variant grooms itself from the default value expression and label its
//! field derived. Empty strings and zero sizes mean "not set" in the decoded
//! document; after grooming they hold the resolved defaults.

use krapper_core::UiKind;
use serde::{Deserialize, Serialize};

use crate::error::{check_alignment, check_expr, check_ui, GroomError, GroomErrorKind};
use crate::field::{ArrayItem, Field};

fn is_false(b: &bool) -> bool { !*b }
fn is_zero(n: &u32) -> bool { *n == 0 }

fn fill(slot: &mut String, with: &str) {
    if slot.is_empty() { *slot = with.to_string(); }
}

fn fill_size(slot: &mut u32, with: u32) {
    if *slot == 0 { *slot = with; }
}

/// A `test` expression that must hold, with the message shown when it does not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Validation {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub test: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl Validation {
    pub(crate) fn groom(&self) -> Result<(), GroomError> { check_expr("validation", &self.test) }
}

// ---- boolean ----

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldBoolean {
    #[serde(default, skip_serializing_if = "is_false")]
    pub default: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ui_component: String,
    #[serde(default, rename = "inList", alias = "inlist", skip_serializing_if = "Option::is_none")]
    pub in_list: Option<BooleanInList>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BooleanInList {
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub header: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ui_component: String,
}

impl FieldBoolean {
    pub(crate) fn groom(&mut self, default_value: &str, label: &str) -> Result<(), GroomError> {
        fill(&mut self.value, default_value);
        check_expr("value", &self.value)?;
        fill(&mut self.ui_component, "checkbox");
        check_ui(UiKind::Boolean, "uiComponent", &self.ui_component)?;
        if let Some(il) = self.in_list.as_mut() {
            fill(&mut il.header, label);
            fill(&mut il.ui_component, &self.ui_component);
            check_ui(UiKind::Boolean, "inList uiComponent", &il.ui_component)?;
        }
        Ok(())
    }
}

// ---- duration / integer share the same in-list shape ----

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScalarInList {
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub header: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ui_component: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alignment: String,
}

impl ScalarInList {
    fn groom(&mut self, kind: UiKind, label: &str, ui_component: &str) -> Result<(), GroomError> {
        fill(&mut self.header, label);
        fill(&mut self.ui_component, ui_component);
        check_ui(kind, "inList uiComponent", &self.ui_component)?;
        fill(&mut self.alignment, "left");
        check_alignment(&self.alignment)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldDuration {
    /// Go-style duration text, e.g. `30s` or `1h30m`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ui_component: String,
    #[serde(default, rename = "inList", alias = "inlist", skip_serializing_if = "Option::is_none")]
    pub in_list: Option<ScalarInList>,
}

impl FieldDuration {
    pub(crate) fn groom(&mut self, default_value: &str, label: &str) -> Result<(), GroomError> {
        if let Some(d) = self.default.as_deref() {
            if krapper_core::check_duration(d).is_none() {
                return Err(GroomErrorKind::InvalidDuration(d.to_string()).into());
            }
        }
        fill(&mut self.value, default_value);
        check_expr("value", &self.value)?;
        fill(&mut self.ui_component, "raw");
        check_ui(UiKind::Duration, "uiComponent", &self.ui_component)?;
        if let Some(il) = self.in_list.as_mut() {
            il.groom(UiKind::Duration, label, &self.ui_component)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldInteger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<i64>,
    #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<i64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ui_component: String,
    #[serde(default, rename = "inList", alias = "inlist", skip_serializing_if = "Option::is_none")]
    pub in_list: Option<ScalarInList>,
}

impl FieldInteger {
    pub(crate) fn groom(&mut self, default_value: &str, label: &str) -> Result<(), GroomError> {
        if let Some(d) = self.default {
            if !self.enum_values.is_empty() && !self.enum_values.contains(&d) {
                return Err(GroomErrorKind::InvalidValue { what: "default (not in enum)", value: d.to_string() }.into());
            }
        }
        fill(&mut self.value, default_value);
        check_expr("value", &self.value)?;
        fill(&mut self.ui_component, "raw");
        check_ui(UiKind::Integer, "uiComponent", &self.ui_component)?;
        if let Some(il) = self.in_list.as_mut() {
            il.groom(UiKind::Integer, label, &self.ui_component)?;
        }
        Ok(())
    }
}

// ---- number ----

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldNumber {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<f64>,
    #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<f64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ui_component: String,
    /// printf-style format applied by the UI.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
    #[serde(default, rename = "inList", alias = "inlist", skip_serializing_if = "Option::is_none")]
    pub in_list: Option<NumberInList>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NumberInList {
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub header: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ui_component: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alignment: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
}

impl FieldNumber {
    pub(crate) fn groom(&mut self, default_value: &str, label: &str) -> Result<(), GroomError> {
        if let Some(d) = self.default {
            if !self.enum_values.is_empty() && !self.enum_values.contains(&d) {
                return Err(GroomErrorKind::InvalidValue { what: "default (not in enum)", value: d.to_string() }.into());
            }
        }
        fill(&mut self.value, default_value);
        check_expr("value", &self.value)?;
        fill(&mut self.ui_component, "raw");
        check_ui(UiKind::Number, "uiComponent", &self.ui_component)?;
        fill(&mut self.format, "%f");
        if let Some(il) = self.in_list.as_mut() {
            fill(&mut il.header, label);
            fill(&mut il.ui_component, &self.ui_component);
            check_ui(UiKind::Number, "inList uiComponent", &il.ui_component)?;
            fill(&mut il.alignment, "left");
            check_alignment(&il.alignment)?;
            fill(&mut il.format, &self.format);
        }
        Ok(())
    }
}

// ---- string ----

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldString {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default: String,
    #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ui_component: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub width: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub height: u32,
    #[serde(default, rename = "inList", alias = "inlist", skip_serializing_if = "Option::is_none")]
    pub in_list: Option<StringInList>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StringInList {
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub header: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ui_component: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alignment: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub width: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub height: u32,
}

impl FieldString {
    pub(crate) fn groom(&mut self, default_value: &str, label: &str) -> Result<(), GroomError> {
        if !self.default.is_empty() && !self.enum_values.is_empty() && !self.enum_values.contains(&self.default) {
            return Err(GroomErrorKind::InvalidValue { what: "default (not in enum)", value: self.default.clone() }.into());
        }
        fill(&mut self.value, default_value);
        check_expr("value", &self.value)?;
        fill_size(&mut self.width, 30);
        fill_size(&mut self.height, 1);
        let component = if self.height == 1 { "input" } else { "textarea" };
        fill(&mut self.ui_component, component);
        check_ui(UiKind::String, "uiComponent", &self.ui_component)?;
        if let Some(il) = self.in_list.as_mut() {
            fill(&mut il.header, label);
            fill(&mut il.ui_component, &self.ui_component);
            check_ui(UiKind::String, "inList uiComponent", &il.ui_component)?;
            fill(&mut il.alignment, "left");
            check_alignment(&il.alignment)?;
            fill(&mut il.value, &self.value);
            check_expr("inList value", &il.value)?;
            fill_size(&mut il.width, self.width);
            fill_size(&mut il.height, 1);
        }
        Ok(())
    }
}

// ---- object ----

/// Resolved object variant. Nested fields take `base_path` as their parent
/// value path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldObject {
    pub base_path: String,
    pub fields: Vec<Field>,
    pub ui_component: String,
    #[serde(rename = "inList", skip_serializing_if = "Option::is_none")]
    pub in_list: Option<BlockInList>,
}

/// In-list projection for the composite variants (object and array).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BlockInList {
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub header: String,
    /// Object in-list component.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ui_component: String,
    /// Array in-list component.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alignment: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub width: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub height: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
}

impl BlockInList {
    pub(crate) fn groom_object(&mut self, label: &str) -> Result<(), GroomError> {
        if !self.display.is_empty() {
            return Err(GroomErrorKind::InvalidValue { what: "inList key for object", value: "display".into() }.into());
        }
        fill(&mut self.header, label);
        fill(&mut self.ui_component, "raw");
        check_ui(UiKind::ObjectList, "inList uiComponent", &self.ui_component)?;
        fill(&mut self.alignment, "left");
        check_alignment(&self.alignment)?;
        fill(&mut self.value, "'{...}'");
        check_expr("inList value", &self.value)
    }

    pub(crate) fn groom_array(&mut self, label: &str) -> Result<(), GroomError> {
        if !self.ui_component.is_empty() {
            return Err(GroomErrorKind::InvalidValue { what: "inList key for array", value: "uiComponent".into() }.into());
        }
        fill(&mut self.header, label);
        fill(&mut self.display, "raw");
        check_ui(UiKind::ArrayList, "inList display", &self.display)?;
        fill_size(&mut self.height, 1);
        fill(&mut self.value, "'[...]'");
        check_expr("inList value", &self.value)?;
        fill(&mut self.alignment, "left");
        check_alignment(&self.alignment)
    }
}

// ---- array ----

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldArray {
    pub item: ArrayItem,
    #[serde(rename = "inList", skip_serializing_if = "Option::is_none")]
    pub in_list: Option<BlockInList>,
}
