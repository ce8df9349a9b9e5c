pub mod adapter;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod scheduling;
pub mod store;
pub mod tenant;
