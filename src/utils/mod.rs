//! Helper functions used across the application.
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`url_validator`] - Destination URL validation and normalization
//! - [`client_ip`] - Client IP and base-URL extraction from HTTP metadata

pub mod client_ip;
pub mod code_generator;
pub mod url_validator;
