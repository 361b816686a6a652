//! Issuer info providers.

mod sec;

pub use sec::{SecSubmissionsProvider, SEC_SUBMISSIONS_URL};
