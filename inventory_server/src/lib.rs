//! # Inventory server
//! This crate hosts the HTTP front end of the inventory engine. It is responsible for:
//! * Managing the product catalogue.
//! * Accepting orders and moving them through their lifecycle while keeping stock consistent.
//! * Listening for signed payment notifications and marking the matching orders as paid.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `GET /health`: A health check route that returns a 200 OK response.
//! * `POST /products`, `GET /products`, `GET|PUT|DELETE /products/{id}`: The product catalogue.
//! * `POST /orders`, `GET /orders`, `GET|PUT|DELETE /orders/{id}`: Orders and their lifecycle.
//! * `POST /webhooks/payment`: Signed payment notifications.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;
