//! Derive macros for the kuro field system
//!
//! `#[derive(Fields)]` generates the static field table and accessor
//! implementation that the editor's property grid is driven by, replacing
//! runtime member scanning with compile-time registration.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

mod attrs;
mod generator;

/// Derive macro generating a `FieldAccess` implementation.
///
/// Field-level markers are given with `#[field(...)]`:
/// - `hidden` — exclude a public field from the table
/// - `visible` — include a private field
/// - `readonly` — reject writes with `FieldError::ReadOnly`
/// - `label = "..."` — override the humanized display label
/// - `resource` — expose an `Option<String>` field as a resource reference
/// - `choice` — expose an enum field (type must implement `FieldEnum`)
///
/// A public field is included unless marked `hidden`; a private field is
/// excluded unless marked `visible`; `hidden` always wins.
#[proc_macro_derive(Fields, attributes(field))]
pub fn derive_fields(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(
                    name,
                    "Fields can only be derived for structs with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(name, "Fields can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let mut exposed = Vec::new();
    for field in named {
        let field_attrs = attrs::parse_field_attributes(field);
        if !attrs::is_exposed(field, &field_attrs) {
            continue;
        }
        let tag = attrs::determine_tag(&field.ty, &field_attrs);
        exposed.push((field, field_attrs, tag));
    }

    generator::generate_field_access_impl(name, &exposed).into()
}

/// Derive macro for enum fields edited through a choice widget.
///
/// Only unit variants are supported; the generated `FieldEnum` impl maps
/// between variants and their declared names.
#[proc_macro_derive(FieldEnum)]
pub fn derive_field_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => {
            return syn::Error::new_spanned(name, "FieldEnum can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    for variant in variants {
        if !matches!(variant.fields, Fields::Unit) {
            return syn::Error::new_spanned(
                variant,
                "FieldEnum variants must not carry data",
            )
            .to_compile_error()
            .into();
        }
    }

    let idents: Vec<_> = variants.iter().map(|v| &v.ident).collect();
    let names: Vec<String> = idents.iter().map(|i| i.to_string()).collect();

    let expanded = quote! {
        impl crate::fields::FieldEnum for #name {
            fn variants() -> &'static [&'static str] {
                &[#(#names),*]
            }

            fn variant_name(&self) -> &'static str {
                match self {
                    #(Self::#idents => #names,)*
                }
            }

            fn from_variant_name(name: &str) -> Option<Self> {
                match name {
                    #(#names => Some(Self::#idents),)*
                    _ => None,
                }
            }
        }
    };

    TokenStream::from(expanded)
}
