// Draw, ticket and prize-table records plus their canonical text forms
pub mod models;
pub mod money;
pub mod normalizer;
