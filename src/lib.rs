//! Core library surface for the language-resource search tool.
//!
//! The flow is config → connection provider → repository → service: a term
//! is validated, one SQL query runs against `resources` joined with its
//! `classes`/`exams` detail rows, and every row becomes a [`Resource`] that
//! knows how to print itself. The binary in `main.rs` only adds argument
//! parsing and exit codes on top of these pieces.
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod repository;
pub mod service;

pub use config::{Config, DatabaseConfig, Driver};
pub use db::{ConnectionProvider, ResourceStore};
pub use error::{Error, Result};
pub use models::{ClassResource, ExamKind, ExamResource, Resource, ResourceKind};
pub use repository::ResourceRepository;
pub use service::SearchService;
