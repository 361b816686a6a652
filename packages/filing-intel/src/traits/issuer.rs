//! Issuer (company) info lookup.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::metadata::IssuerInfo;

/// Optional enrichment source keyed by CIK.
///
/// `Ok(None)` means "nothing known". Callers treat errors the same way;
/// a missing lookup never blocks analysis.
#[async_trait]
pub trait IssuerInfoProvider: Send + Sync {
    async fn lookup(&self, cik: &str) -> Result<Option<IssuerInfo>>;
}

/// Provider that never knows anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIssuerInfo;

#[async_trait]
impl IssuerInfoProvider for NoIssuerInfo {
    async fn lookup(&self, _cik: &str) -> Result<Option<IssuerInfo>> {
        Ok(None)
    }
}
