#[allow(unused_imports)]
use super::*;

use super::field::ParsedField;

pub(crate) struct ParsedModel {
    ident: Ident,
    generics: Generics,
    name: String,
    bases: Vec<Path>,
    fields: Vec<ParsedField>,
}

impl ParsedModel {
    pub(crate) fn from_input(input: &DeriveInput) -> Result<Self> {
        let mut name = input.ident.to_string();
        let mut bases = Vec::new();

        for attr in &input.attrs {
            if attr.path().is_ident("model") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("name") {
                        name = parse_lit_str(&meta)?;
                    } else if meta.path.is_ident("bases") {
                        parse_paths(&meta, &mut bases)?;
                    } else {
                        return Err(meta.error("unknown model option; expected name or bases"));
                    }
                    Ok(())
                })?;
            }
        }

        let fields = named_fields(input, "StructuredModel")?
            .into_iter()
            .map(ParsedField::from_field)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            ident: input.ident.clone(),
            generics: input.generics.clone(),
            name,
            bases,
            fields,
        })
    }

    pub(crate) fn emit(&self) -> TokenStream2 {
        let ident = &self.ident;
        let name = &self.name;
        let (impl_generics, ty_generics, where_clause) = self.generics.split_for_impl();
        let bases = &self.bases;
        let fields = self.fields.iter().map(ParsedField::emit);

        quote! {
            impl #impl_generics ::fieldmap::StructuredModel for #ident #ty_generics #where_clause {
                const NAME: &'static str = #name;

                fn model_def() -> ::fieldmap::ModelDef {
                    ::fieldmap::ModelDef::new(<Self as ::fieldmap::StructuredModel>::NAME)
                        #( .with_base(<#bases as ::fieldmap::StructuredModel>::NAME) )*
                        #( .with_field(#fields) )*
                }

                fn lineage() -> ::std::vec::Vec<::fieldmap::ModelDef> {
                    let mut defs = ::std::vec::Vec::new();
                    #( defs.extend(<#bases as ::fieldmap::StructuredModel>::lineage()); )*
                    defs.push(<Self as ::fieldmap::StructuredModel>::model_def());
                    defs
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_name_and_bases() {
        let input: DeriveInput = syn::parse_quote! {
            #[model(name = "Data.Model", bases(NodeModel, crate::SealableModel))]
            struct DataModel {
                source: String,
            }
        };
        let parsed = ParsedModel::from_input(&input).unwrap();
        assert_eq!(parsed.name, "Data.Model");
        assert_eq!(parsed.bases.len(), 2);
        assert_eq!(parsed.fields.len(), 1);

        let emitted = parsed.emit().to_string();
        assert!(emitted.contains("with_base"));
        assert!(emitted.contains("lineage"));
    }

    #[test]
    fn unit_structs_declare_no_fields() {
        let input: DeriveInput = syn::parse_quote! {
            struct EmptyModel;
        };
        let parsed = ParsedModel::from_input(&input).unwrap();
        assert_eq!(parsed.name, "EmptyModel");
        assert!(parsed.fields.is_empty());
    }

    #[test]
    fn enums_are_rejected() {
        let input: DeriveInput = syn::parse_quote! {
            enum NotAModel { A }
        };
        assert!(ParsedModel::from_input(&input).is_err());
    }
}
