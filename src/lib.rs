pub mod accounts;
pub mod auth;
pub mod config;
pub mod db;
pub mod documents;
pub mod error;
pub mod ingest;
pub mod models;
pub mod query;
pub mod routes;
pub mod schema;
pub mod state;
pub mod store;
pub mod utils;
pub mod validation;
