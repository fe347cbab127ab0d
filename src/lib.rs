//! Library exports for the listing catalog
//!
//! This module exposes internal components for testing and potential library usage.

pub mod config;
pub mod database;
pub mod error;
pub mod extract;
pub mod form;
pub mod handler;
pub mod media;
pub mod middleware;
pub mod model;
pub mod query;
pub mod response;
pub mod route;
