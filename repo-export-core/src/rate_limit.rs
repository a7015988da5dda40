//! Quota guard: fail fast when the core API quota is spent.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::contract::{ApiRequest, RemoteClient};
use crate::error::ExportError;

#[derive(Debug, Deserialize)]
struct RateLimitResponse {
    resources: RateLimitResources,
}

#[derive(Debug, Deserialize)]
struct RateLimitResources {
    core: RateLimitResource,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RateLimitResource {
    pub limit: u64,
    pub remaining: u64,
    /// Unix epoch seconds.
    pub reset: i64,
}

/// Current core quota, or `None` when the quota endpoint itself is unusable.
pub async fn quota_status<C>(client: &C) -> Option<RateLimitResource>
where
    C: RemoteClient + ?Sized,
{
    crate::contract::get_json::<_, RateLimitResponse>(client, ApiRequest::new("/rate_limit"))
        .await
        .map(|r| r.resources.core)
}

/// `Err(QuotaExhausted)` only when remaining quota is exactly zero.
///
/// An unreachable quota endpoint is not an error: the check is advisory.
pub async fn check_quota<C>(client: &C) -> Result<(), ExportError>
where
    C: RemoteClient + ?Sized,
{
    let Some(core) = quota_status(client).await else {
        tracing::warn!("[QUOTA] Could not read quota status, continuing without check");
        return Ok(());
    };

    if core.remaining == 0 {
        let reset_at = DateTime::from_timestamp(core.reset, 0).unwrap_or_else(Utc::now);
        tracing::error!(limit = core.limit, %reset_at, "[QUOTA] API quota exhausted");
        return Err(ExportError::QuotaExhausted { reset_at });
    }

    tracing::info!(
        remaining = core.remaining,
        limit = core.limit,
        "[QUOTA] API quota available"
    );
    Ok(())
}
