//! Fitzy Library
//!
//! Calorie intake and exercise tracking: a ledger of food and exercise
//! entries, energy-balance aggregates, and the gateways that persist and
//! look them up.

pub mod account;
pub mod auth;
pub mod build_info;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod ledger;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod tracker;
pub mod view;
