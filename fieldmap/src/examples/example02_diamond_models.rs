use anyhow::{Result, bail, ensure};

use crate::{EntityCatalog, EntityDef, SchemaError, StructuredModel};

#[allow(dead_code)]
#[derive(StructuredModel)]
struct NodeModel {
    #[field(alias = "id")]
    pk: i64,
}

#[allow(dead_code)]
#[derive(StructuredModel)]
#[model(bases(NodeModel))]
struct DataModel {
    source: String,
}

#[allow(dead_code)]
#[derive(StructuredModel)]
#[model(bases(NodeModel))]
struct SealableModel {
    #[field(attribute)]
    sealed: bool,
}

#[allow(dead_code)]
#[derive(StructuredModel)]
#[model(bases(DataModel, SealableModel))]
struct SealedDataModel {
    checksum: String,
}

/// A model forgetting one of the leaf models.
#[allow(dead_code)]
#[derive(StructuredModel)]
#[model(bases(DataModel))]
struct IncompleteModel {
    checksum: String,
}

fn base_catalog() -> Result<EntityCatalog> {
    let mut catalog = EntityCatalog::new();
    catalog.define(EntityDef::new("Node").with_model_type::<NodeModel>())?;
    catalog.define(EntityDef::new("Data").with_base("Node").with_model_type::<DataModel>())?;
    catalog.define(
        EntityDef::new("Sealable")
            .with_base("Node")
            .with_model_type::<SealableModel>(),
    )?;
    Ok(catalog)
}

/// Example 02 – diamond inheritance and the model base check.
pub fn run() -> Result<()> {
    let mut catalog = base_catalog()?;

    let sealed = catalog.define(
        EntityDef::new("SealedData")
            .with_base("Data")
            .with_base("Sealable")
            .with_model_type::<SealedDataModel>(),
    )?;
    ensure!(
        sealed.mro() == ["SealedData", "Data", "Sealable", "Node"],
        "classes resolve in C3 order"
    );
    ensure!(
        sealed.fields().keys().collect::<Vec<_>>() == ["checksum", "pk", "sealed", "source"],
        "shared model fields are collected once"
    );

    // A class without its own model unions the models of its leaves.
    let mixed = catalog.define(EntityDef::new("Mixed").with_base("Data").with_base("Sealable"))?;
    ensure!(mixed.declared_model().is_none(), "Mixed declares no model");
    ensure!(mixed.fields().contains("sealed") && mixed.fields().contains("source"));

    let mut catalog = base_catalog()?;
    let err = catalog.define(
        EntityDef::new("Broken")
            .with_base("Data")
            .with_base("Sealable")
            .with_model_type::<IncompleteModel>(),
    );
    match err {
        Err(SchemaError::MissingModelBases { missing, .. }) => {
            log::info!("example02 rejected Broken: missing {missing:?}");
            ensure!(
                missing == [("Sealable".to_string(), "SealableModel".to_string())],
                "only the forgotten leaf is reported"
            );
        }
        Err(other) => bail!("unexpected error: {other}"),
        Ok(_) => bail!("Broken should be rejected"),
    }
    ensure!(!catalog.contains("Broken"), "rejected classes are not added");
    Ok(())
}
