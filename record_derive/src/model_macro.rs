use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, parse_quote, Data, DeriveInput, Error};

/// Adds the derives a plain record needs on top of the user's own attributes
pub fn model_attribute(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut input = parse_macro_input!(item as DeriveInput);

    if !matches!(input.data, Data::Struct(_)) {
        return Error::new_spanned(&input.ident, "model can only be used on structs")
            .to_compile_error()
            .into();
    }

    input.attrs.insert(
        0,
        parse_quote!(#[derive(Debug, Clone, PartialEq, ::record_mapper::Record)]),
    );

    TokenStream::from(quote! { #input })
}
