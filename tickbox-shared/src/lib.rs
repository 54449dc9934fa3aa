//! # Tickbox Shared Library
//!
//! This crate contains the domain types, credential handling and storage
//! backends used by the Tickbox API server.
//!
//! ## Module Organization
//!
//! - `models`: User and todo records plus their input types
//! - `auth`: Password hashing, token issuance and access context
//! - `store`: Storage traits with PostgreSQL and in-memory backends
//! - `db`: PostgreSQL connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod store;
