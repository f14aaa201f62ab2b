//! Access Record Entity
//!
//! One row per recorded frontend access, with an optional geolocation.
//! The location is best-effort: a failed lookup never blocks the write.

use chrono::{DateTime, Utc};
use kernel::id::AccessRecordId;
use serde::{Deserialize, Serialize};

/// Resolved geolocation for an IP address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub country: Option<String>,
    pub city: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Access statistics record
#[derive(Debug, Clone)]
pub struct AccessRecord {
    pub id: AccessRecordId,
    pub ip: String,
    pub location: Option<GeoLocation>,
    pub recorded_at: DateTime<Utc>,
}

impl AccessRecord {
    pub fn new(ip: String, location: Option<GeoLocation>) -> Self {
        Self {
            id: AccessRecordId::new(),
            ip,
            location,
            recorded_at: Utc::now(),
        }
    }
}
