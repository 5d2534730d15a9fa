use anyhow::{Result, ensure};
use serde_json::json;

use crate::{EntityCatalog, EntityDef, FieldError, StructuredModel};

#[allow(dead_code)]
#[derive(StructuredModel)]
struct NodeModel {
    /// Primary key of the node.
    #[field(alias = "id")]
    pk: i64,
    /// Unique identifier of the node.
    uuid: String,
    label: String,
    #[field(subscriptable)]
    extras: serde_json::Value,
}

#[allow(dead_code)]
#[derive(StructuredModel)]
#[model(bases(NodeModel))]
struct DictModel {
    /// Dictionary content.
    #[field(attribute, subscriptable)]
    value: serde_json::Value,
}

/// Example 01 – collect the fields of a small hierarchy and build filters.
pub fn run() -> Result<()> {
    let mut catalog = EntityCatalog::new();
    catalog.define(EntityDef::new("Node").with_model_type::<NodeModel>())?;
    catalog.define(
        EntityDef::new("Dict")
            .with_base("Node")
            .with_model_type::<DictModel>(),
    )?;

    let dict = catalog
        .fields_of("Dict")
        .ok_or_else(|| anyhow::anyhow!("Dict was just defined"))?;
    ensure!(
        dict.keys().collect::<Vec<_>>() == ["extras", "label", "pk", "uuid", "value"],
        "fields are sorted by key and include inherited ones"
    );

    let pk = dict.attr("pk")?;
    ensure!(pk.query_name() == "id", "the database alias is the query name");
    ensure!(pk.doc() == "Primary key of the node.", "doc comments become field docs");

    let value = dict.attr("value")?;
    ensure!(value.query_name() == "attributes.value", "attribute fields live under `attributes`");

    // Nested keys of subscriptable fields.
    let nested = value.subscript("count")?;
    ensure!(nested.query_name() == "attributes.value.count", "subscript keeps the field kind");
    ensure!(
        matches!(dict.attr("label")?.subscript("x"), Err(FieldError::NotSubscriptable { .. })),
        "plain fields cannot be subscripted"
    );

    let filters = (pk.gt(10) & dict.attr("label")?.like("calc%")?) | nested.eq(3);
    log::info!("example01 filters: {filters}");
    ensure!(
        filters.to_json()
            == json!({"or": [
                {"and": [{"id": {">": 10}}, {"label": {"like": "calc%"}}]},
                {"attributes.value.count": {"==": 3}}
            ]}),
        "filters nest in the order they were combined"
    );

    let in_filter = dict.attr("uuid")?.in_(["a", "b", "a"])?;
    ensure!(
        in_filter.to_json() == json!({"uuid": {"in": ["a", "b"]}}),
        "membership values are deduplicated"
    );
    Ok(())
}
