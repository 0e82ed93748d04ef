//! Code generation for the FieldAccess implementation

use crate::attrs::{FieldAttrs, FieldKind};
use proc_macro2::TokenStream;
use quote::quote;
use syn::Field;

pub fn generate_field_access_impl(
    type_name: &syn::Ident,
    fields: &[(&Field, FieldAttrs, FieldKind)],
) -> TokenStream {
    let specs = generate_specs(fields);
    let get_arms = generate_get_arms(fields);
    let set_arms = generate_set_arms(fields);

    quote! {
        impl crate::fields::FieldAccess for #type_name {
            fn fields(&self) -> &'static [crate::fields::FieldSpec] {
                static FIELDS: &[crate::fields::FieldSpec] = &[#(#specs),*];
                FIELDS
            }

            fn get_field(
                &self,
                name: &str,
            ) -> Result<crate::fields::FieldValue, crate::fields::FieldError> {
                use crate::fields::{FieldError, FieldValue};

                match name {
                    #(#get_arms)*
                    _ => Err(FieldError::Unknown(name.to_string())),
                }
            }

            fn set_field(
                &mut self,
                name: &str,
                value: crate::fields::FieldValue,
            ) -> Result<(), crate::fields::FieldError> {
                use crate::fields::{FieldError, FieldValue};

                match name {
                    #(#set_arms)*
                    _ => Err(FieldError::Unknown(name.to_string())),
                }
            }
        }
    }
}

fn is_read_only(attrs: &FieldAttrs, kind: &FieldKind) -> bool {
    attrs.readonly || *kind == FieldKind::Unsupported
}

fn tag_tokens(kind: &FieldKind) -> TokenStream {
    let variant = match kind {
        FieldKind::Str => quote! { Str },
        FieldKind::Int(_) => quote! { Int },
        FieldKind::F32 | FieldKind::F64 => quote! { Float },
        FieldKind::Vec2 => quote! { Vec2 },
        FieldKind::Vec3 => quote! { Vec3 },
        FieldKind::Bool => quote! { Bool },
        FieldKind::Enum => quote! { Enum },
        FieldKind::Resource => quote! { Resource },
        FieldKind::Unsupported => quote! { Unsupported },
    };
    quote! { crate::fields::FieldTag::#variant }
}

fn generate_specs(fields: &[(&Field, FieldAttrs, FieldKind)]) -> Vec<TokenStream> {
    fields
        .iter()
        .filter_map(|(field, attrs, kind)| {
            let name = field.ident.as_ref()?.to_string();
            let label = match &attrs.label {
                Some(label) => quote! { Some(#label) },
                None => quote! { None },
            };
            let tag = tag_tokens(kind);
            let read_only = is_read_only(attrs, kind);

            Some(quote! {
                crate::fields::FieldSpec {
                    name: #name,
                    custom_label: #label,
                    tag: #tag,
                    read_only: #read_only,
                }
            })
        })
        .collect()
}

fn generate_get_arms(fields: &[(&Field, FieldAttrs, FieldKind)]) -> Vec<TokenStream> {
    fields
        .iter()
        .filter_map(|(field, _, kind)| {
            let ident = field.ident.as_ref()?;
            let name = ident.to_string();

            let value = match kind {
                FieldKind::Str => quote! { FieldValue::Str(self.#ident.clone()) },
                FieldKind::Int(_) => quote! { FieldValue::Int(self.#ident as i32) },
                FieldKind::F32 => quote! { FieldValue::Float(self.#ident) },
                FieldKind::F64 => quote! { FieldValue::Float(self.#ident as f32) },
                FieldKind::Vec2 => quote! { FieldValue::Vec2(self.#ident) },
                FieldKind::Vec3 => quote! { FieldValue::Vec3(self.#ident) },
                FieldKind::Bool => quote! { FieldValue::Bool(self.#ident) },
                FieldKind::Enum => quote! {
                    FieldValue::Enum(crate::fields::FieldEnum::variant_name(&self.#ident).to_string())
                },
                FieldKind::Resource => quote! { FieldValue::Resource(self.#ident.clone()) },
                FieldKind::Unsupported => quote! { FieldValue::Unsupported },
            };

            Some(quote! {
                #name => Ok(#value),
            })
        })
        .collect()
}

fn generate_set_arms(fields: &[(&Field, FieldAttrs, FieldKind)]) -> Vec<TokenStream> {
    fields
        .iter()
        .filter_map(|(field, attrs, kind)| {
            let ident = field.ident.as_ref()?;
            let name = ident.to_string();

            if is_read_only(attrs, kind) {
                return Some(quote! {
                    #name => Err(FieldError::ReadOnly(name.to_string())),
                });
            }

            let body = match kind {
                FieldKind::Str => quote! {
                    if let FieldValue::Str(v) = value {
                        self.#ident = v;
                        Ok(())
                    } else {
                        Err(FieldError::TypeMismatch(name.to_string()))
                    }
                },
                FieldKind::Int(int_ty) => quote! {
                    if let FieldValue::Int(v) = value {
                        self.#ident = v as #int_ty;
                        Ok(())
                    } else {
                        Err(FieldError::TypeMismatch(name.to_string()))
                    }
                },
                FieldKind::F32 => quote! {
                    if let FieldValue::Float(v) = value {
                        self.#ident = v;
                        Ok(())
                    } else {
                        Err(FieldError::TypeMismatch(name.to_string()))
                    }
                },
                FieldKind::F64 => quote! {
                    if let FieldValue::Float(v) = value {
                        self.#ident = v as f64;
                        Ok(())
                    } else {
                        Err(FieldError::TypeMismatch(name.to_string()))
                    }
                },
                FieldKind::Vec2 => quote! {
                    if let FieldValue::Vec2(v) = value {
                        self.#ident = v;
                        Ok(())
                    } else {
                        Err(FieldError::TypeMismatch(name.to_string()))
                    }
                },
                FieldKind::Vec3 => quote! {
                    if let FieldValue::Vec3(v) = value {
                        self.#ident = v;
                        Ok(())
                    } else {
                        Err(FieldError::TypeMismatch(name.to_string()))
                    }
                },
                FieldKind::Bool => quote! {
                    if let FieldValue::Bool(v) = value {
                        self.#ident = v;
                        Ok(())
                    } else {
                        Err(FieldError::TypeMismatch(name.to_string()))
                    }
                },
                FieldKind::Enum => quote! {
                    if let FieldValue::Enum(v) = value {
                        match crate::fields::FieldEnum::from_variant_name(&v) {
                            Some(parsed) => {
                                self.#ident = parsed;
                                Ok(())
                            }
                            None => Err(FieldError::TypeMismatch(name.to_string())),
                        }
                    } else {
                        Err(FieldError::TypeMismatch(name.to_string()))
                    }
                },
                FieldKind::Resource => quote! {
                    if let FieldValue::Resource(v) = value {
                        self.#ident = v;
                        Ok(())
                    } else {
                        Err(FieldError::TypeMismatch(name.to_string()))
                    }
                },
                FieldKind::Unsupported => unreachable!("unsupported fields are read-only"),
            };

            Some(quote! {
                #name => { #body }
            })
        })
        .collect()
}
