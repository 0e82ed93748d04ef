//! Field descriptors for metadata-driven property editing
//!
//! Every component exposes a static table of field descriptors generated by
//! `#[derive(Fields)]`. The editor walks the table and renders a widget per
//! tag; reads and writes go through `get_field`/`set_field` by member name.

use glam::{Vec2, Vec3};

/// A value that can be displayed and edited in the property grid
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Bool(bool),
    /// Variant name of an enum field
    Enum(String),
    /// Name of a registered resource, or None when unassigned
    Resource(Option<String>),
    /// For types that don't map to a standard widget
    Unsupported,
}

/// Widget tag for a field, dispatched on by the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTag {
    Str,
    Int,
    Float,
    Vec2,
    Vec3,
    Bool,
    Enum,
    Resource,
    Unsupported,
}

/// Static descriptor for one exposed member of a component type
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Declared member name, used as the access key
    pub name: &'static str,
    /// Display-label override from `#[field(label = "...")]`
    pub custom_label: Option<&'static str>,
    pub tag: FieldTag,
    pub read_only: bool,
}

impl FieldSpec {
    /// Display label: the override if given, else the humanized member name
    pub fn label(&self) -> String {
        match self.custom_label {
            Some(label) => label.to_string(),
            None => humanize(self.name),
        }
    }
}

/// Errors from field access
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("field `{0}` is read-only")]
    ReadOnly(String),

    #[error("no field named `{0}`")]
    Unknown(String),

    #[error("value type does not match field `{0}`")]
    TypeMismatch(String),
}

/// Trait implemented (via derive) by every component with exposed fields
pub trait FieldAccess {
    /// Static descriptor table, in declaration order
    fn fields(&self) -> &'static [FieldSpec];

    /// Read a field by member name
    fn get_field(&self, name: &str) -> Result<FieldValue, FieldError>;

    /// Write a field by member name. Writes to read-only fields are
    /// rejected with `FieldError::ReadOnly` and leave the value untouched.
    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), FieldError>;
}

/// Enum types editable through the choice widget
pub trait FieldEnum: Sized {
    fn variants() -> &'static [&'static str];
    fn variant_name(&self) -> &'static str;
    fn from_variant_name(name: &str) -> Option<Self>;
}

/// Turn a member identifier into a display label: underscores become
/// spaces, a space is inserted before each internal capital, and only the
/// first character of the result stays capitalized.
/// `EulerRotation` and `euler_rotation` both become `Euler rotation`.
pub fn humanize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);

    for (i, c) in name.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else if c == '_' {
            out.push(' ');
        } else if c.is_uppercase() {
            out.push(' ');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec2(&self) -> Option<Vec2> {
        match self {
            FieldValue::Vec2(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            FieldValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}
