//! Text2SQL Protocol
//!
//! Client-server communication over HTTP + JSON.
//!
//! # Architecture
//!
//! ```text
//! +-------------------------------------------------------------+
//! |                    Text2SQL Protocol                        |
//! +-------------------------------------------------------------+
//! |  HTTP Endpoints:                                            |
//! |    - POST /generate_sql: question -> SQL + rows             |
//! |    - POST /get_database_schema: formatted schema text       |
//! |    - GET  /health: health check                             |
//! |    - GET  /: browser UI                                     |
//! +-------------------------------------------------------------+
//! |  Wire Format: JSON                                          |
//! +-------------------------------------------------------------+
//! ```

pub mod rest;

// Protocol Constants
/// Default HTTP server port
pub const DEFAULT_PORT: u16 = 8000;

/// Default client request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
