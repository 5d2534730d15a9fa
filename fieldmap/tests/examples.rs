#[test]
fn node_fields_example() {
    fieldmap::examples::example01_node_fields::run().expect("example should succeed");
}

#[test]
fn diamond_models_example() {
    fieldmap::examples::example02_diamond_models::run().expect("example should succeed");
}

#[test]
fn schema_config_example() {
    fieldmap::examples::example03_schema_config::run().expect("example should succeed");
}
