pub mod auth;
pub mod envelope;
pub mod errors;
pub mod rate_limit;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;

pub use server::{ServerConfig, serve};
