//! Room reservations over a local key-value store: a typed store adapter, the
//! reservation repository, the validation and scheduling engine, and the page
//! controllers a session drives.

pub mod adapter;
pub mod command;
pub mod config;
pub mod directory;
pub mod engine;
pub mod limits;
pub mod model;
pub mod notify;
pub mod observability;
pub mod pages;
pub mod repository;
pub mod session;
pub mod store;
