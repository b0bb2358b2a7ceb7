//! Client library for the project-management backend.
//!
//! The backend stores every entity in a DynamoDB-style table behind one CRUD
//! endpoint. Responses may come back in several envelope shapes, and records
//! may still carry DynamoDB attribute-value tags. This crate normalizes both
//! ([`decode`], [`envelope`]), builds request bodies in the shape each table
//! expects ([`builder`]), and exposes typed records ([`task`], [`project`],
//! [`team`], [`schedule`]) through [`service::ApiService`].
//!
//! [`store::Store`] is a plain reducer for keeping a local copy in sync.
//! Login ([`auth`]), notification triggers ([`notify`]) and Google Calendar
//! ([`calendar`]) live next to the CRUD client and share its configuration.

pub mod auth;
pub mod builder;
pub mod calendar;
pub mod client;
pub mod config;
pub mod decode;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod fields;
pub mod notify;
pub mod project;
pub mod schedule;
pub mod service;
pub mod store;
pub mod task;
pub mod team;
pub mod tokens;
pub mod wire;

pub use config::ClientConfig;
pub use entity::EntityKind;
pub use error::{ApiError, Result, ServiceResponse};
pub use service::ApiService;
pub use store::{Action, Store};
