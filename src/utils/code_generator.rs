//! Short code generation and validation.
//!
//! Provides cryptographically secure random base62 codes and validation for
//! custom user-provided codes.

use crate::error::AppError;
use serde_json::json;

/// The 62-character alphabet codes are drawn from.
const BASE62_ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Default generated code length. 62^6 gives roughly 56.8 billion codes.
pub const DEFAULT_CODE_LENGTH: usize = 6;

pub const MIN_CODE_LENGTH: usize = 4;
pub const MAX_CODE_LENGTH: usize = 32;

/// Codes that collide with service routes and cannot be used as short links.
/// Matched case-insensitively.
const RESERVED_CODES: &[&str] = &["api", "links", "health", "status", "admin", "assets"];

/// Largest byte value usable for unbiased sampling: 248 = 4 * 62.
const REJECTION_THRESHOLD: u8 = (u8::MAX / 62) * 62;

/// Generates a random short code of `length` characters, drawn uniformly
/// from the base62 alphabet using the OS CSPRNG.
///
/// Bytes at or above the rejection threshold are discarded so that the
/// modulo step cannot bias the distribution.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if `length` is outside [4, 32].
/// Returns [`AppError::Internal`] if the system random source fails.
pub fn generate_code(length: usize) -> Result<String, AppError> {
    if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&length) {
        return Err(AppError::bad_request(
            "Code length must be between 4 and 32",
            json!({ "length": length }),
        ));
    }

    let mut out = String::with_capacity(length);
    let mut buffer = [0u8; 64];

    while out.len() < length {
        getrandom::fill(&mut buffer).map_err(|e| {
            AppError::internal("Random source failure", json!({ "source": e.to_string() }))
        })?;

        for &byte in buffer.iter() {
            if byte < REJECTION_THRESHOLD {
                out.push(BASE62_ALPHABET[(byte % 62) as usize] as char);
                if out.len() == length {
                    break;
                }
            }
        }
    }

    Ok(out)
}

/// Validates a user-provided custom short code and returns its normalized
/// (trimmed) form. Never touches storage.
///
/// # Rules
///
/// - Non-empty after trimming surrounding whitespace
/// - Length 4-32 characters
/// - Base62 characters only (`0-9`, `A-Z`, `a-z`)
/// - Not a reserved route token (case-insensitive)
///
/// # Errors
///
/// Returns [`AppError::Validation`] describing the first violated rule.
pub fn validate_custom_code(input: &str) -> Result<String, AppError> {
    let code = input.trim();

    if code.is_empty() {
        return Err(AppError::bad_request("Custom code is empty", json!({})));
    }

    if code.len() < MIN_CODE_LENGTH || code.len() > MAX_CODE_LENGTH {
        return Err(AppError::bad_request(
            "Custom code must be 4-32 characters",
            json!({ "provided_length": code.len() }),
        ));
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::bad_request(
            "Custom code must be base62 (0-9, A-Z, a-z)",
            json!({ "code": code }),
        ));
    }

    if RESERVED_CODES.contains(&code.to_ascii_lowercase().as_str()) {
        return Err(AppError::bad_request(
            "This code is reserved",
            json!({ "code": code }),
        ));
    }

    Ok(code.to_string())
}
