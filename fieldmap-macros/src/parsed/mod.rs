use proc_macro2::TokenStream as TokenStream2;
use quote::{ToTokens, quote};
use syn::meta::ParseNestedMeta;
use syn::{
    Attribute, Data, DeriveInput, Error, Expr, ExprLit, Field, Fields, Generics, Ident, Lit, LitStr, Meta, Path,
    Result, Type, spanned::Spanned,
};

mod entity;
mod field;
mod model;

pub(crate) use entity::ParsedEntity;
pub(crate) use model::ParsedModel;

/// Parse `bases(A, b::B)` into the listed paths.
fn parse_paths(meta: &ParseNestedMeta<'_>, into: &mut Vec<Path>) -> Result<()> {
    meta.parse_nested_meta(|item| {
        into.push(item.path.clone());
        Ok(())
    })
}

/// Parse `name = "..."`.
fn parse_lit_str(meta: &ParseNestedMeta<'_>) -> Result<String> {
    let value: LitStr = meta.value()?.parse()?;
    Ok(value.value())
}

/// Join the `///` lines of an item into one description.
fn doc_string(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) => Some(s.value().trim().to_string()),
                _ => None,
            },
            _ => None,
        })
        .collect();

    let joined = lines.join(" ").trim().to_string();
    (!joined.is_empty()).then_some(joined)
}

/// Render a type the way it was written, without the token spacing `quote` adds.
fn type_repr(ty: &Type) -> String {
    let raw = ty.to_token_stream().to_string();
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' {
            let prev = out.chars().last();
            let next = chars.get(i + 1).copied();
            let word = |ch: Option<char>| ch.is_some_and(|ch| ch.is_alphanumeric() || ch == '_');
            if word(prev) && word(next) {
                out.push(' ');
            }
            continue;
        }
        out.push(c);
        if c == ',' {
            out.push(' ');
        }
    }
    out
}

fn named_fields<'a>(input: &'a DeriveInput, derive: &str) -> Result<Vec<&'a Field>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => Ok(named.named.iter().collect()),
            Fields::Unit => Ok(Vec::new()),
            Fields::Unnamed(_) => Err(Error::new(input.ident.span(), format!("{derive} requires named fields"))),
        },
        _ => Err(Error::new(input.ident.span(), format!("{derive} can only be derived for structs"))),
    }
}

fn reject_generics(generics: &Generics, derive: &str) -> Result<()> {
    if generics.params.is_empty() {
        Ok(())
    } else {
        Err(Error::new(generics.span(), format!("{derive} cannot be derived for generic structs")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_repr_drops_token_spacing() {
        let ty: Type = syn::parse_quote!(Option<Vec<String>>);
        assert_eq!(type_repr(&ty), "Option<Vec<String>>");
        let ty: Type = syn::parse_quote!(std::collections::HashMap<String, i64>);
        assert_eq!(type_repr(&ty), "std::collections::HashMap<String, i64>");
        let ty: Type = syn::parse_quote!(&'static str);
        assert_eq!(type_repr(&ty), "&'static str");
    }

    #[test]
    fn doc_lines_are_joined() {
        let input: DeriveInput = syn::parse_quote! {
            /// First line.
            /// Second line.
            struct Documented;
        };
        assert_eq!(doc_string(&input.attrs).as_deref(), Some("First line. Second line."));
    }
}
