//! Credentials, tokens and the shared session store.
//!
//! The [`SessionStore`] is the only mutable state in the library. It is
//! written on successful login or refresh and cleared when recovery fails.

mod credentials;
mod store;
mod tokens;

pub use credentials::ClientCredentials;
pub use store::{Session, SessionStore};
pub use tokens::{MainToken, RefreshToken};
