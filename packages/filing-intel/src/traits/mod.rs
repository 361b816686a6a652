//! Collaborator seams: model gateway, issuer lookup, result storage.

pub mod gateway;
pub mod issuer;
pub mod store;
