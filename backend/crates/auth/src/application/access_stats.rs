//! Access Statistics Use Case
//!
//! Records frontend accesses with a best-effort geolocation. The lookup
//! is advisory: a failure is logged and the record stored without a
//! location, never surfaced to the caller.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::entity::access_record::AccessRecord;
use crate::domain::repository::{AccessStatsRepository, GeoResolver};
use crate::error::{AuthError, AuthResult};

/// Access statistics use case
pub struct AccessStatsUseCase<A, G>
where
    A: AccessStatsRepository,
    G: GeoResolver,
{
    stats_repo: Arc<A>,
    geo: Arc<G>,
}

impl<A, G> AccessStatsUseCase<A, G>
where
    A: AccessStatsRepository,
    G: GeoResolver,
{
    pub fn new(stats_repo: Arc<A>, geo: Arc<G>) -> Self {
        Self { stats_repo, geo }
    }

    /// Record one access. The geolocation lookup never blocks the write.
    pub async fn record(&self, ip: String) -> AuthResult<AccessRecord> {
        let location = match self.geo.lookup(&ip).await {
            Ok(loc) => Some(loc),
            Err(e) => {
                tracing::warn!(ip = %ip, error = %e, "Geolocation lookup failed, storing without location");
                None
            }
        };

        let record = AccessRecord::new(ip, location);
        self.stats_repo.create_access_record(&record).await?;
        Ok(record)
    }

    /// List records, optionally bounded by ISO dates or datetimes.
    pub async fn list(
        &self,
        start: Option<String>,
        end: Option<String>,
    ) -> AuthResult<Vec<AccessRecord>> {
        let start = start.map(|s| parse_bound(&s)).transpose()?;
        let end = end.map(|s| parse_bound(&s)).transpose()?;
        self.stats_repo.list_access_records(start, end).await
    }

    /// Delete every record.
    pub async fn clear(&self) -> AuthResult<u64> {
        let deleted = self.stats_repo.clear_access_records().await?;
        tracing::info!(deleted, "Access statistics cleared");
        Ok(deleted)
    }
}

/// Accepts `yyyy-mm-dd` (midnight UTC) or a full RFC 3339 datetime.
fn parse_bound(raw: &str) -> AuthResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    Err(AuthError::InvalidDate(raw.to_string()))
}
