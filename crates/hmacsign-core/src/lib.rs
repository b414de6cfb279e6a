//! Protocol constants, shared types, and configuration for hmacsign.
//!
//! This crate holds the pieces every other hmacsign crate agrees on: the wire
//! constants of the `HMAC-Authentication` protocol (version 1), the small
//! newtypes that travel inside the authentication header, and the
//! environment-driven client configuration.

mod config;
mod error;
mod types;

pub use config::HmacClientConfig;
pub use error::{CoreError, CoreResult};
pub use types::{
    HEADER_NAME, KeyId, Nonce, PROTOCOL_VERSION, ProtocolVersion, Purpose, SESSION_HEADER_NAME,
    SESSION_START_VALUE, SigningMode, URI_PARAM_NAME,
};
