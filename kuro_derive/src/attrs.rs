//! `#[field(...)]` attribute parsing for the Fields derive macro

use syn::{Field, LitStr, Visibility};

/// Parsed markers from a `#[field(...)]` attribute
#[derive(Debug, Default, Clone)]
pub struct FieldAttrs {
    /// Force-exclude the member from the field table
    pub hidden: bool,
    /// Force-include a private member
    pub visible: bool,
    /// Reject writes
    pub readonly: bool,
    /// Display-label override
    pub label: Option<String>,
    /// Treat an `Option<String>` member as a resource reference
    pub resource: bool,
    /// Treat the member as an enum choice (type must implement FieldEnum)
    pub choice: bool,
}

/// Value kind a field maps to, mirroring the editor's widget set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    /// Integer field; carries the declared type ident for write-back casts
    Int(syn::Ident),
    F32,
    F64,
    Vec2,
    Vec3,
    Bool,
    Enum,
    Resource,
    /// No widget mapping; shown read-only with no editable value
    Unsupported,
}

pub fn parse_field_attributes(field: &Field) -> FieldAttrs {
    let mut attrs = FieldAttrs::default();

    for attr in &field.attrs {
        if !attr.path().is_ident("field") {
            continue;
        }
        let result = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("hidden") {
                attrs.hidden = true;
            } else if meta.path.is_ident("visible") {
                attrs.visible = true;
            } else if meta.path.is_ident("readonly") {
                attrs.readonly = true;
            } else if meta.path.is_ident("resource") {
                attrs.resource = true;
            } else if meta.path.is_ident("choice") {
                attrs.choice = true;
            } else if meta.path.is_ident("label") {
                let value = meta.value()?;
                let lit: LitStr = value.parse()?;
                attrs.label = Some(lit.value());
            } else {
                return Err(meta.error("unknown field attribute"));
            }
            Ok(())
        });
        if let Err(e) = result {
            eprintln!("Failed to parse field attribute: {e}");
        }
    }

    attrs
}

/// Inclusion precedence: a `pub` member is exposed unless hidden; a
/// non-`pub` member is exposed only when explicitly marked visible.
/// `hidden` wins over everything.
pub fn is_exposed(field: &Field, attrs: &FieldAttrs) -> bool {
    if attrs.hidden {
        return false;
    }
    match field.vis {
        Visibility::Public(_) => true,
        _ => attrs.visible,
    }
}

/// Map a declared type to its field kind
pub fn determine_tag(field_type: &syn::Type, attrs: &FieldAttrs) -> FieldKind {
    if attrs.choice {
        return FieldKind::Enum;
    }
    if attrs.resource {
        return match option_string_inner(field_type) {
            true => FieldKind::Resource,
            false => FieldKind::Unsupported,
        };
    }

    let syn::Type::Path(type_path) = field_type else {
        return FieldKind::Unsupported;
    };
    let Some(segment) = type_path.path.segments.last() else {
        return FieldKind::Unsupported;
    };

    let ident = &segment.ident;
    match ident.to_string().as_str() {
        "String" => FieldKind::Str,
        "f32" => FieldKind::F32,
        "f64" => FieldKind::F64,
        "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "u64" | "isize" | "usize" => {
            FieldKind::Int(ident.clone())
        }
        "bool" => FieldKind::Bool,
        "Vec2" => FieldKind::Vec2,
        "Vec3" => FieldKind::Vec3,
        _ => FieldKind::Unsupported,
    }
}

/// Check for exactly `Option<String>`
fn option_string_inner(field_type: &syn::Type) -> bool {
    let syn::Type::Path(type_path) = field_type else {
        return false;
    };
    let Some(segment) = type_path.path.segments.last() else {
        return false;
    };
    if segment.ident != "Option" {
        return false;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return false;
    };
    matches!(
        args.args.first(),
        Some(syn::GenericArgument::Type(syn::Type::Path(inner)))
            if inner.path.segments.last().is_some_and(|s| s.ident == "String")
    )
}
