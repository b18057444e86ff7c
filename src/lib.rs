//! Mediadesk - list controllers for the media marketplace admin screens
//!
//! This library provides the client-side filter, sort and paginate pipeline
//! behind the paparazzi, radio, themes and press pack management tables,
//! together with the admin API source those tables are loaded from.

pub mod config;
pub mod list;
pub mod models;
pub mod services;
pub mod source;
