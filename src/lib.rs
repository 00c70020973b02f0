//! Branch time clock: an append-only attendance log that decides whether an
//! employee's next event is a check-in, check-out or transfer.

pub mod api;
pub mod attendance;
pub mod auth;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod model;
pub mod models;
pub mod routes;
