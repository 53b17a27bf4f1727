//! MCP surface

mod server;

pub use server::FitzyService;
