//! # crewchat-auth
//!
//! Bearer-token validation for CrewChat. Token issuance belongs to the
//! platform's auth service; this crate verifies the shared-secret HS256
//! tokens it mints. The encoder is kept for tests and local tooling.

pub mod jwt;

pub use jwt::claims::Claims;
pub use jwt::decoder::JwtDecoder;
pub use jwt::encoder::JwtEncoder;
