//! Parsing utilities for record and wrapper attributes
//!
//! This module handles the parsing of `#[record]` and `#[wrapper]` attributes
//! and validation of value map keys.

use syn::ext::IdentExt;
use syn::{
    Attribute, Data, DeriveInput, Error, Expr, Fields, Ident, LitStr, Member, Path, Result,
    Token, Type, Visibility,
};

/// Validate a value map key and return syn::Error for better proc macro error handling
pub fn validate_key_syn(name: &str, span: proc_macro2::Span) -> Result<()> {
    validate_key(name).map_err(|e| Error::new(span, format!("Invalid field name '{}': {}", name, e)))
}

fn validate_key(name: &str) -> std::result::Result<(), String> {
    let first_char = name
        .chars()
        .next()
        .ok_or_else(|| "Name cannot be empty".to_string())?;
    if !first_char.is_alphabetic() && first_char != '_' {
        return Err("must start with a letter or underscore".to_string());
    }
    if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(
            "only alphanumeric characters and underscores are allowed".to_string(),
        );
    }
    Ok(())
}

/// How a missing constructor argument is filled in
#[derive(Debug)]
pub enum FieldDefault {
    Required,
    /// `#[record(default)]`: `Default::default()`
    Trait,
    /// `#[record(default = "expr")]`
    Expr(Box<Expr>),
}

impl FieldDefault {
    pub fn is_present(&self) -> bool {
        !matches!(self, FieldDefault::Required)
    }
}

#[derive(Debug)]
pub struct RecordInfo {
    pub constructor: Option<Path>,
}

#[derive(Debug)]
pub struct FieldInfo {
    pub ident: Ident,
    /// Key in value maps (field name, or the `rename` value)
    pub key: String,
    pub ty: Type,
    pub default: FieldDefault,
    /// Public fields are readable; all non-skipped fields are constructor parameters
    pub readable: bool,
    pub skip: bool,
}

#[derive(Debug)]
pub struct WrapperInfo {
    pub member: Member,
    pub ty: Type,
    pub constructor: Option<Path>,
}

/// Parse `#[record(constructor = "path")]` on the struct
pub fn parse_record_attributes(attrs: &[Attribute]) -> Result<RecordInfo> {
    let mut constructor = None;

    for attr in attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("constructor") {
                if constructor.is_some() {
                    return Err(meta.error("duplicate constructor attribute"));
                }
                let lit: LitStr = meta.value()?.parse()?;
                constructor = Some(lit.parse::<Path>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported record attribute, expected `constructor = \"path\"`"))
            }
        })?;
    }

    Ok(RecordInfo { constructor })
}

/// Parse the named fields of a record struct with their `#[record(...)]` attributes
pub fn parse_record_fields(data: &Data) -> Result<Vec<FieldInfo>> {
    let fields_named = match data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields_named) => fields_named,
            _ => {
                return Err(Error::new(
                    proc_macro2::Span::call_site(),
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                proc_macro2::Span::call_site(),
                "Record can only be derived for structs",
            ))
        }
    };

    let mut infos: Vec<FieldInfo> = Vec::with_capacity(fields_named.named.len());
    for field in &fields_named.named {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| Error::new_spanned(field, "Field must have a name"))?;

        let mut default = FieldDefault::Required;
        let mut rename: Option<LitStr> = None;
        let mut skip = false;

        for attr in &field.attrs {
            if !attr.path().is_ident("record") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("default") {
                    if default.is_present() {
                        return Err(meta.error("duplicate default attribute"));
                    }
                    default = if meta.input.peek(Token![=]) {
                        let lit: LitStr = meta.value()?.parse()?;
                        FieldDefault::Expr(Box::new(lit.parse::<Expr>()?))
                    } else {
                        FieldDefault::Trait
                    };
                    Ok(())
                } else if meta.path.is_ident("rename") {
                    if rename.is_some() {
                        return Err(meta.error("duplicate rename attribute"));
                    }
                    rename = Some(meta.value()?.parse()?);
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else {
                    Err(meta.error("unsupported record attribute, expected `default`, `rename` or `skip`"))
                }
            })?;
        }

        let key = match &rename {
            Some(lit) => {
                validate_key_syn(&lit.value(), lit.span())?;
                lit.value()
            }
            None => ident.unraw().to_string(),
        };
        if !skip && infos.iter().any(|other| !other.skip && other.key == key) {
            return Err(Error::new(
                ident.span(),
                format!("Duplicate field name '{}'", key),
            ));
        }

        infos.push(FieldInfo {
            readable: !skip && matches!(field.vis, Visibility::Public(_)),
            ident,
            key,
            ty: field.ty.clone(),
            default,
            skip,
        });
    }

    Ok(infos)
}

/// Parse a single-field struct and its `#[wrapper(constructor = "path")]` attribute
pub fn parse_wrapper(input: &DeriveInput) -> Result<WrapperInfo> {
    let fields = match &input.data {
        Data::Struct(data_struct) => &data_struct.fields,
        _ => {
            return Err(Error::new_spanned(
                &input.ident,
                "Wrapper can only be derived for structs",
            ))
        }
    };
    if fields.len() != 1 {
        return Err(Error::new_spanned(
            &input.ident,
            "Wrapper can only be derived for structs with exactly one field",
        ));
    }

    let mut constructor = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("wrapper") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("constructor") {
                if constructor.is_some() {
                    return Err(meta.error("duplicate constructor attribute"));
                }
                let lit: LitStr = meta.value()?.parse()?;
                constructor = Some(lit.parse::<Path>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported wrapper attribute, expected `constructor = \"path\"`"))
            }
        })?;
    }

    let (member, ty) = match fields.iter().next() {
        Some(field) => {
            let member = match &field.ident {
                Some(ident) => Member::Named(ident.clone()),
                None => Member::Unnamed(0.into()),
            };
            (member, field.ty.clone())
        }
        None => {
            return Err(Error::new_spanned(
                &input.ident,
                "Wrapper requires exactly one field",
            ))
        }
    };

    Ok(WrapperInfo {
        member,
        ty,
        constructor,
    })
}
