//! mailtriage: command-line client and local dashboard for an email
//! classification backend.
//!
//! The backend classifies emails as productive or unproductive and suggests
//! replies. This crate submits text or files to it, keeps a browsing
//! history (in the backend, or locally when the backend is serverless) and
//! derives dashboard views from that history.

pub mod aggregate;
pub mod api;
pub mod cli;
pub mod config;
pub mod context;
pub mod environment;
pub mod error;
pub mod logging;
pub mod model;
pub mod render;
pub mod store;
pub mod submit;
pub mod web;
