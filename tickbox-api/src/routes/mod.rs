/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration and login
/// - `todos`: Per-user todo CRUD

pub mod auth;
pub mod health;
pub mod todos;
