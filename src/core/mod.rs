// src/core/mod.rs
//! Core services shared by the session store, the automation engines and the services

pub mod api_client;
pub mod local_store;
pub mod token;

pub use api_client::ApiClient;
pub use local_store::LocalStore;
pub use token::TokenClaims;
