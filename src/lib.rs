pub mod app;
pub mod auth;
pub mod client;
pub mod collections;
pub mod config;
pub mod countries;
pub mod error;
pub mod extract;
pub mod quiz;
pub mod state;
pub mod users;
