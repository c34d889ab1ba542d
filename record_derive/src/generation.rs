//! Code generation for record and wrapper metadata
//!
//! Generated code refers to the runtime through `::record_mapper` paths.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{DeriveInput, Ident};

use crate::parsing::{FieldDefault, FieldInfo, RecordInfo, WrapperInfo};

pub fn generate_record_impl(
    input: &DeriveInput,
    record_info: &RecordInfo,
    fields: &[FieldInfo],
) -> TokenStream {
    let name = &input.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let field_descriptors = fields.iter().filter(|f| f.readable).map(|field| {
        let ident = &field.ident;
        let key = &field.key;
        let ty = &field.ty;
        let has_default = field.default.is_present();
        quote! {
            ::record_mapper::FieldDescriptor::<Self>::new(
                #key,
                <#ty as ::record_mapper::type_mapping::Described>::descriptor(),
                #has_default,
                |record: &Self| ::record_mapper::type_mapping::Value::new(
                    ::std::clone::Clone::clone(&record.#ident)
                ),
            )
        }
    });

    let parameters: Vec<&FieldInfo> = fields.iter().filter(|f| !f.skip).collect();

    let parameter_descriptors = parameters.iter().map(|field| {
        let key = &field.key;
        let ty = &field.ty;
        let has_default = field.default.is_present();
        quote! {
            ::record_mapper::Parameter::new(
                #key,
                <#ty as ::record_mapper::type_mapping::Described>::descriptor(),
                #has_default,
            )
        }
    });

    let argument_vars: Vec<Ident> = (0..parameters.len())
        .map(|index| format_ident!("__argument_{}", index))
        .collect();

    let argument_takes = parameters.iter().zip(&argument_vars).map(|(field, var)| {
        let key = &field.key;
        let ty = &field.ty;
        let take = match &field.default {
            FieldDefault::Required => quote! { arguments.take::<#ty>(#key)? },
            FieldDefault::Trait => quote! {
                arguments.take_or_else::<#ty, _>(#key, ::std::default::Default::default)?
            },
            FieldDefault::Expr(expr) => quote! {
                arguments.take_or_else::<#ty, _>(#key, || #expr)?
            },
        };
        quote! { let #var: #ty = #take; }
    });

    let build = generate_build(record_info, fields, &parameters, &argument_vars);

    quote! {
        impl #impl_generics ::record_mapper::Record for #name #ty_generics #where_clause {
            fn type_name() -> &'static str {
                #type_name
            }

            fn fields() -> ::std::vec::Vec<::record_mapper::FieldDescriptor<Self>> {
                vec![#(#field_descriptors),*]
            }

            fn constructor() -> ::std::option::Option<::record_mapper::Constructor<Self>> {
                ::std::option::Option::Some(::record_mapper::Constructor::<Self>::new(
                    vec![#(#parameter_descriptors),*],
                    |arguments: &mut ::record_mapper::Arguments| {
                        #(#argument_takes)*
                        #build
                    },
                ))
            }
        }
    }
}

fn generate_build(
    record_info: &RecordInfo,
    fields: &[FieldInfo],
    parameters: &[&FieldInfo],
    argument_vars: &[Ident],
) -> TokenStream {
    if let Some(constructor) = &record_info.constructor {
        // User constructors receive the parameters positionally
        return quote! {
            #constructor(#(#argument_vars),*).map_err(::record_mapper::MapperError::user)
        };
    }

    let inits = fields.iter().map(|field| {
        let ident = &field.ident;
        if field.skip {
            let value = match &field.default {
                FieldDefault::Expr(expr) => quote! { #expr },
                _ => quote! { ::std::default::Default::default() },
            };
            return quote! { #ident: #value };
        }
        let index = parameters
            .iter()
            .position(|parameter| parameter.ident == field.ident)
            .unwrap_or_default();
        let var = &argument_vars[index];
        quote! { #ident: #var }
    });

    quote! {
        ::std::result::Result::Ok(Self { #(#inits),* })
    }
}

pub fn generate_wrapper_impl(input: &DeriveInput, wrapper_info: &WrapperInfo) -> TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let member = &wrapper_info.member;
    let ty = &wrapper_info.ty;

    let from_inner = match &wrapper_info.constructor {
        Some(constructor) => quote! {
            #constructor(inner).map_err(::record_mapper::type_mapping::ConvertError::user)
        },
        None => quote! {
            ::std::result::Result::Ok(Self { #member: inner })
        },
    };

    quote! {
        impl #impl_generics ::record_mapper::type_mapping::Described for #name #ty_generics #where_clause {
            fn descriptor() -> ::record_mapper::type_mapping::TypeDescriptor {
                ::record_mapper::type_mapping::TypeDescriptor::wrapper::<Self>()
            }
        }

        impl #impl_generics ::record_mapper::type_mapping::SingleField for #name #ty_generics #where_clause {
            type Inner = #ty;

            fn inner(&self) -> &Self::Inner {
                &self.#member
            }

            fn from_inner(
                inner: Self::Inner,
            ) -> ::std::result::Result<Self, ::record_mapper::type_mapping::ConvertError> {
                #from_inner
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{parse_record_attributes, parse_record_fields, parse_wrapper};
    use syn::parse_quote;

    fn expand_record(input: DeriveInput) -> String {
        let info = parse_record_attributes(&input.attrs).unwrap();
        let fields = parse_record_fields(&input.data).unwrap();
        generate_record_impl(&input, &info, &fields).to_string()
    }

    #[test]
    fn test_private_fields_are_parameters_only() {
        let expanded = expand_record(parse_quote! {
            pub struct SomeData {
                pub hello: String,
                secret: i32,
            }
        });
        assert_eq!(expanded.matches("FieldDescriptor :: < Self > :: new").count(), 1);
        assert_eq!(expanded.matches("Parameter :: new").count(), 2);
        assert!(expanded.contains("\"SomeData\""));
    }

    #[test]
    fn test_skipped_fields_use_defaults() {
        let expanded = expand_record(parse_quote! {
            pub struct Cached {
                pub id: i64,
                #[record(skip, default = "Vec::new()")]
                pub scratch: Vec<u8>,
            }
        });
        assert_eq!(expanded.matches("Parameter :: new").count(), 1);
        assert!(expanded.contains("scratch : Vec :: new ()"));
    }

    #[test]
    fn test_user_constructor_is_called_positionally() {
        let expanded = expand_record(parse_quote! {
            #[record(constructor = "Self::checked")]
            pub struct Checked {
                pub a: i32,
                pub b: i32,
            }
        });
        assert!(expanded.contains("Self :: checked (__argument_0 , __argument_1)"));
        assert!(expanded.contains("MapperError :: user"));
    }

    #[test]
    fn test_wrapper_expansion() {
        let input: DeriveInput = parse_quote! {
            pub struct Email(String);
        };
        let info = parse_wrapper(&input).unwrap();
        let expanded = generate_wrapper_impl(&input, &info).to_string();
        assert!(expanded.contains("type Inner = String"));
        assert!(expanded.contains("Self { 0 : inner }"));
    }
}
