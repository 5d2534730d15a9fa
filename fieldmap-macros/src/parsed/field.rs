#[allow(unused_imports)]
use super::*;

/// A struct field of a `#[derive(StructuredModel)]` model.
pub(crate) struct ParsedField {
    name: String,
    annotation: String,
    description: Option<String>,
    is_attribute: bool,
    alias: Option<String>,
    subscriptable: bool,
}

impl ParsedField {
    pub(crate) fn from_field(field: &Field) -> Result<Self> {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| Error::new(field.span(), "StructuredModel requires named fields"))?;
        let mut parsed = Self {
            name: ident.to_string().trim_start_matches("r#").to_string(),
            annotation: type_repr(&field.ty),
            description: doc_string(&field.attrs),
            is_attribute: false,
            alias: None,
            subscriptable: false,
        };

        for attr in &field.attrs {
            if attr.path().is_ident("field") {
                parsed.parse_field_attr(attr)?;
            }
        }
        Ok(parsed)
    }

    fn parse_field_attr(&mut self, attr: &Attribute) -> Result<()> {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("attribute") || meta.path.is_ident("is_attribute") {
                self.is_attribute = true;
            } else if meta.path.is_ident("subscriptable") {
                self.subscriptable = true;
            } else if meta.path.is_ident("alias") || meta.path.is_ident("database_alias") {
                if self.alias.is_some() {
                    return Err(meta.error("field alias is already set"));
                }
                self.alias = Some(parse_lit_str(&meta)?);
            } else if meta.path.is_ident("dtype") {
                self.annotation = parse_lit_str(&meta)?;
            } else if meta.path.is_ident("doc") {
                self.description = Some(parse_lit_str(&meta)?);
            } else if meta.path.is_ident("name") {
                self.name = parse_lit_str(&meta)?;
            } else {
                return Err(meta.error(
                    "unknown field option; expected attribute, subscriptable, alias, dtype, doc or name",
                ));
            }
            Ok(())
        })
    }

    /// Tokens building the `fieldmap::FieldInfo` of this field.
    pub(crate) fn emit(&self) -> TokenStream2 {
        let name = &self.name;
        let annotation = &self.annotation;
        let mut tokens = quote! {
            ::fieldmap::FieldInfo::new(#name).with_annotation(#annotation)
        };
        if let Some(description) = &self.description {
            tokens = quote! { #tokens.with_description(#description) };
        }
        if self.is_attribute {
            tokens = quote! { #tokens.attribute() };
        }
        if let Some(alias) = &self.alias {
            tokens = quote! { #tokens.alias(#alias) };
        }
        if self.subscriptable {
            tokens = quote! { #tokens.subscriptable() };
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(field: Field) -> ParsedField {
        ParsedField::from_field(&field).expect("field parses")
    }

    #[test]
    fn reads_options_and_docs() {
        let parsed = parse(syn::parse_quote! {
            /// Dictionary content.
            #[field(attribute, subscriptable)]
            value: Option<String>
        });
        assert_eq!(parsed.name, "value");
        assert_eq!(parsed.annotation, "Option<String>");
        assert_eq!(parsed.description.as_deref(), Some("Dictionary content."));
        assert!(parsed.is_attribute);
        assert!(parsed.subscriptable);
        assert!(parsed.alias.is_none());
    }

    #[test]
    fn alias_and_dtype_override() {
        let parsed = parse(syn::parse_quote! {
            #[field(alias = "id", dtype = "int")]
            pk: i64
        });
        assert_eq!(parsed.alias.as_deref(), Some("id"));
        assert_eq!(parsed.annotation, "int");
    }

    #[test]
    fn raw_identifiers_lose_their_prefix() {
        let parsed = parse(syn::parse_quote! { r#type: String });
        assert_eq!(parsed.name, "type");
    }

    #[test]
    fn unknown_options_are_errors() {
        let field: Field = syn::parse_quote! {
            #[field(sortable)]
            pk: i64
        };
        assert!(ParsedField::from_field(&field).is_err());
    }
}
