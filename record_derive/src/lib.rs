//! Procedural macros for record mapping
//!
//! This crate provides the `Record` and `Wrapper` derives plus the `#[model]`
//! attribute. The generated code targets the `record_mapper` runtime.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod generation;
mod model_macro;
mod parsing;

use generation::{generate_record_impl, generate_wrapper_impl};
use model_macro::model_attribute;
use parsing::{parse_record_attributes, parse_record_fields, parse_wrapper};

/// Derive macro for the `Record` trait
///
/// Public fields become readable fields. Every field that is not skipped is a
/// parameter of the generated canonical constructor.
///
/// ```ignore
/// use record_mapper::Record;
///
/// #[derive(Debug, Clone, Record)]
/// pub struct Customer {
///     pub id: i64,
///     #[record(rename = "name")]
///     pub display_name: String,
///     #[record(default = "vec![]")]
///     pub tags: Vec<String>,
///     #[record(skip)]
///     pub cached_score: Option<f64>,
/// }
/// ```
///
/// A struct-level `#[record(constructor = "Self::new_checked")]` routes
/// construction through a fallible function taking the parameters in
/// declaration order.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let record_info = match parse_record_attributes(&input.attrs) {
        Ok(info) => info,
        Err(e) => return e.to_compile_error().into(),
    };

    let fields = match parse_record_fields(&input.data) {
        Ok(fields) => fields,
        Err(e) => return e.to_compile_error().into(),
    };

    TokenStream::from(generate_record_impl(&input, &record_info, &fields))
}

/// Derive macro for single-field wrapper types
///
/// ```ignore
/// use record_mapper::Wrapper;
///
/// #[derive(Debug, Clone, Wrapper)]
/// #[wrapper(constructor = "Email::parse")]
/// pub struct Email(String);
/// ```
///
/// Without a constructor the field is set directly.
#[proc_macro_derive(Wrapper, attributes(wrapper))]
pub fn derive_wrapper(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let wrapper_info = match parse_wrapper(&input) {
        Ok(info) => info,
        Err(e) => return e.to_compile_error().into(),
    };

    TokenStream::from(generate_wrapper_impl(&input, &wrapper_info))
}

/// Convenience attribute that adds `Debug`, `Clone`, `PartialEq` and `Record`
///
/// ```ignore
/// use record_mapper::model;
///
/// #[model]
/// pub struct User {
///     pub id: i64,
///     pub name: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn model(attr: TokenStream, item: TokenStream) -> TokenStream {
    model_attribute(attr, item)
}
