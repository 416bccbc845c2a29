//! The HTTP API of the recipe application.
//!
//! Callers authenticate with the ID tokens of a Cognito user pool; their requests are
//! forwarded to the PostgREST API of a Supabase project on their behalf.

pub mod config;
pub mod error;
mod middlewares;
pub mod result;
mod routes;
pub mod start_server;
pub mod store;
pub mod telemetry;

#[cfg(test)]
mod tests;
