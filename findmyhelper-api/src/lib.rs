//! # FindMyHelper API Server
//!
//! Axum HTTP server for the FindMyHelper marketplace: registration and
//! sessions, the service-provider approval workflow, tasks, service requests,
//! reviews, and image uploads.
//!
//! ## Module Organization
//!
//! - `app`: Application state and router
//! - `config`: Environment-driven configuration
//! - `error`: Unified `ApiError` / HTTP mapping
//! - `middleware`: Session extractors and security headers
//! - `notify`: Transactional email dispatcher
//! - `routes`: Request handlers
//! - `services`: Email and object-storage clients

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod notify;
pub mod routes;
pub mod services;
