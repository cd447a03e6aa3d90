use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Inbound ping body. OwnTracks-style clients send a `_type` discriminator
/// alongside the coordinate fields; every field is optional because the same
/// endpoint also receives non-location message types that are acked and
/// dropped.
#[derive(Debug, Deserialize)]
pub struct ReportPayload {
    #[serde(rename = "_type")]
    pub msg_type: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub acc: Option<f64>,
    pub batt: Option<f64>,
    pub tst: Option<i64>,
}

impl ReportPayload {
    /// Whether this payload declares itself a location update.
    pub fn is_location(&self) -> bool {
        self.msg_type.as_deref() == Some("location")
            || (self.lat.is_some() && self.lon.is_some())
    }

    /// Builds the record that replaces the stored slot. Returns `None` for
    /// payloads that are not location updates, or that declare the location
    /// type without carrying both coordinates.
    pub fn into_record(self, now_ms: i64) -> Option<PositionRecord> {
        if !self.is_location() {
            return None;
        }
        let (lat, lon) = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => return None,
        };
        Some(PositionRecord {
            lat,
            lon,
            acc: self.acc.unwrap_or(0.0),
            batt: self.batt,
            timestamp: self.tst.map(|secs| secs * 1000).unwrap_or(now_ms),
            address: None,
        })
    }
}

/// The most recently accepted position. No coordinate range validation is
/// performed; whatever numeric pair the client reports is stored as-is.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PositionRecord {
    pub lat: f64,
    pub lon: f64,
    pub acc: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batt: Option<f64>,
    /// Epoch milliseconds; client-supplied `tst` seconds when present,
    /// otherwise ingestion wall-clock time.
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Read-side body: the stored record plus the age label, which is derived on
/// every read and never stored.
#[derive(Debug, Serialize)]
pub struct LocationSnapshot {
    #[serde(flatten)]
    pub record: PositionRecord,
    pub age: String,
}

impl LocationSnapshot {
    pub fn new(record: PositionRecord, now_ms: i64) -> Self {
        let age = age_label(now_ms.saturating_sub(record.timestamp).max(0));
        Self { record, age }
    }
}

/// "Nm ago" in whole minutes under an hour, "Nh ago" in whole hours above.
fn age_label(age_ms: i64) -> String {
    let minutes = age_ms / 60_000;
    if minutes < 60 {
        format!("{}m ago", minutes)
    } else {
        format!("{}h ago", minutes / 60)
    }
}

pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before Unix epoch")
        .as_millis() as i64
}
