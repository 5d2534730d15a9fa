pub mod example01_node_fields;
pub mod example02_diamond_models;
pub mod example03_schema_config;
