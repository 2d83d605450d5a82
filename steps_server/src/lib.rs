//! # Steps server
//! This crate hosts the HTTP facade for the steps engine. It is responsible for:
//! Accepting walk, shop, family and referral requests from the chat front end.
//! Owning the in-memory walk sessions and wiring them to the temperature and messaging services.
//! Translating engine errors into short, user-facing responses.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/...`: The walker-facing API. Every request must carry the `X-Api-Key` header.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
