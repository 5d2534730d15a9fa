#[allow(unused_imports)]
use super::*;

pub(crate) struct ParsedEntity {
    ident: Ident,
    name: String,
    bases: Vec<Path>,
    model: Option<Path>,
}

impl ParsedEntity {
    pub(crate) fn from_input(input: &DeriveInput) -> Result<Self> {
        reject_generics(&input.generics, "Entity")?;
        named_fields(input, "Entity")?;

        let mut name = input.ident.to_string();
        let mut bases = Vec::new();
        let mut model = None;

        for attr in &input.attrs {
            if attr.path().is_ident("entity") {
                Self::parse_container_attr(attr, &mut name, &mut bases, &mut model)?;
            }
        }

        Ok(Self {
            ident: input.ident.clone(),
            name,
            bases,
            model,
        })
    }

    fn parse_container_attr(
        attr: &Attribute,
        name: &mut String,
        bases: &mut Vec<Path>,
        model: &mut Option<Path>,
    ) -> Result<()> {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                *name = parse_lit_str(&meta)?;
            } else if meta.path.is_ident("bases") {
                parse_paths(&meta, bases)?;
            } else if meta.path.is_ident("model") {
                if model.is_some() {
                    return Err(meta.error("entity model is already set"));
                }
                *model = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("fields") {
                return Err(meta.error("`fields` is collected from the model and cannot be declared"));
            } else {
                return Err(meta.error("unknown entity option; expected name, bases or model"));
            }
            Ok(())
        })
    }

    pub(crate) fn emit(&self) -> TokenStream2 {
        let ident = &self.ident;
        let name = &self.name;
        let bases = &self.bases;
        let model = self.model.as_ref().map(|model| {
            quote! { .with_model_type::<#model>() }
        });

        quote! {
            impl ::fieldmap::Entity for #ident {
                const NAME: &'static str = #name;

                fn entity_def() -> ::fieldmap::EntityDef {
                    ::fieldmap::EntityDef::new(<Self as ::fieldmap::Entity>::NAME)
                        #( .with_base(<#bases as ::fieldmap::Entity>::NAME) )*
                        #model
                }
            }

            ::fieldmap::inventory::submit! {
                ::fieldmap::EntityRegistration {
                    type_name: #name,
                    entity_def: <#ident as ::fieldmap::Entity>::entity_def,
                }
            }
        }
    }
}
