use anyhow::{Context, Result, ensure};
use serde_json::json;

use crate::{FieldFilters, FilterValue, Operator, SchemaConfig};

const SCHEMA: &str = r#"
[[models]]
name = "NodeModel"
fields = [
    { name = "pk", annotation = "i64", metadata = { database_alias = "id" } },
    { name = "node_type", annotation = "String" },
]

[[models]]
name = "IntModel"
bases = ["NodeModel"]
fields = [{ name = "value", annotation = "i64", metadata = { is_attribute = true } }]

[[entities]]
name = "Int"
bases = ["Node"]
model = "IntModel"

[[entities]]
name = "Node"
model = "NodeModel"
"#;

/// Example 03 – load a schema file and combine hand-built filters.
pub fn run() -> Result<()> {
    let catalog = SchemaConfig::from_toml_str(SCHEMA)?.build()?;
    let int = catalog.fields_of("Int").context("Int is declared in the schema")?;

    let value = int.attr("value")?;
    let node_type = int.attr("node_type")?;

    // Several comparisons on one field fold into a conjunction.
    let range = FieldFilters::from_triples([
        (value, Operator::Ge, FilterValue::from(1)),
        (value, Operator::Lt, FilterValue::from(10)),
    ]);
    ensure!(
        range.to_json()
            == json!({"and": [
                {"attributes.value": {">=": 1}},
                {"attributes.value": {"<": 10}}
            ]}),
        "repeated query names are conjoined"
    );

    let filters = range & node_type.eq("data.core.int.Int.");
    log::info!("example03 filters: {filters}");
    ensure!(
        filters.to_json()
            == json!({"and": [
                {"attributes.value": {">=": 1}},
                {"attributes.value": {"<": 10}},
                {"node_type": {"==": "data.core.int.Int."}}
            ]}),
        "conjunctions extend flat"
    );
    Ok(())
}
