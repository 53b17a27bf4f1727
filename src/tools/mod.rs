//! Fitzy Tools module
//!
//! Status and report tool implementations behind the MCP surface.

pub mod reports;
pub mod status;
