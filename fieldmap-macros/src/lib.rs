use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod parsed;

use parsed::{ParsedEntity, ParsedModel};

/// Derive `fieldmap::StructuredModel` for a struct describing a model.
///
/// ```text
/// #[derive(StructuredModel)]
/// #[model(bases(NodeModel))]
/// struct DictModel {
///     /// Dictionary content.
///     #[field(attribute, subscriptable)]
///     value: serde_json::Value,
///     #[field(alias = "node_label", dtype = "str")]
///     label: String,
/// }
/// ```
///
/// Doc comments become field descriptions and the field type becomes the
/// annotation unless `dtype` overrides it.
#[proc_macro_derive(StructuredModel, attributes(model, field))]
pub fn derive_structured_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match ParsedModel::from_input(&input) {
        Ok(parsed) => parsed.emit().into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Derive `fieldmap::Entity` and register the class with the global catalog.
///
/// ```text
/// #[derive(Entity)]
/// #[entity(bases(Data, Sealable), model = SealedDataModel)]
/// struct SealedData;
/// ```
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match ParsedEntity::from_input(&input) {
        Ok(parsed) => parsed.emit().into(),
        Err(err) => err.to_compile_error().into(),
    }
}
