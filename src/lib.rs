pub mod api;
pub mod engine;
pub mod llm;
pub mod models;
pub mod store;
