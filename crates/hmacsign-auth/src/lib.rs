//! Signing primitives for the `HMAC-Authentication` protocol.
//!
//! This crate provides everything below the request orchestrator: the exact
//! byte strings that get signed, the codec for the colon-delimited
//! authentication header, and the [`CryptoEngine`] seam through which the
//! client asks for digests without knowing how they are computed.
//!
//! # Overview
//!
//! A non-session request is signed once over `method ∥ uri ∥ body` and carries
//! `version:keyId:nonce:digest`. A session-capable engine first performs a
//! handshake, after which every message carries only `version:digest` and the
//! engine rotates its per-message state after each exchange.
//!
//! # Usage
//!
//! ```rust
//! use hmacsign_auth::canonical::request_signing_input;
//! use hmacsign_auth::engine::CryptoEngine;
//! use hmacsign_auth::hmac_engine::HmacSha256Engine;
//! use hmacsign_core::{KeyId, Nonce, Purpose};
//!
//! let engine = HmacSha256Engine::with_nonce(KeyId::new("app"), b"secret", Nonce::new("n1"));
//! let input = request_signing_input("GET", "http://api.local/items", b"");
//! let digest = engine.compute_digest(&input, Purpose::Request).unwrap();
//! assert!(engine.validate(&input, &digest, Purpose::Request).is_ok());
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Canonical signing input and signed-URI construction
//! - [`engine`] - The crypto/session engine trait consumed by the client
//! - [`error`] - Authentication error types
//! - [`header`] - `HMAC-Authentication` header value codec
//! - [`hmac_engine`] - HMAC-SHA256 reference engines (single-shot and session)
//! - [`keys`] - Key provider trait and in-memory implementation

pub mod canonical;
pub mod engine;
pub mod error;
pub mod header;
pub mod hmac_engine;
pub mod keys;

pub use engine::{CryptoEngine, EngineCapability};
pub use error::AuthError;
pub use header::AuthHeaderValue;
pub use hmac_engine::{HmacSha256Engine, HmacSha256SessionEngine};
pub use keys::{KeyProvider, StaticKeyProvider};
