use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::handlers::geocode::DynGeocoder;
use crate::models::position::PositionRecord;

/// Owner of the single "most recently accepted position" slot. Replacing the
/// record and attaching an address each happen under the mutex, so the two
/// mutation paths never interleave mid-write on a multi-threaded runtime.
#[derive(Default)]
pub struct LocationTracker {
    slot: Mutex<Slot>,
}

#[derive(Default)]
struct Slot {
    /// Bumped on every replace; enrichment tasks carry the generation they
    /// target so a superseded lookup cannot write into a newer record.
    generation: u64,
    record: Option<PositionRecord>,
}

impl LocationTracker {
    /// Replaces the stored record and kicks off a detached best-effort
    /// reverse-geocode for it. The returned handle is only awaited by tests;
    /// request handlers drop it, and the response never waits on the lookup.
    pub async fn ingest(
        self: Arc<Self>,
        record: PositionRecord,
        geocoder: DynGeocoder,
    ) -> JoinHandle<()> {
        let (lat, lon) = (record.lat, record.lon);
        let generation = self.replace(record).await;

        tokio::spawn(async move {
            if let Some(address) = geocoder.resolve(lat, lon).await {
                self.attach_address(generation, address).await;
            }
        })
    }

    async fn replace(&self, record: PositionRecord) -> u64 {
        let mut slot = self.slot.lock().await;
        slot.generation += 1;
        slot.record = Some(record);
        slot.generation
    }

    /// Writes the resolved address only if the record it was looked up for is
    /// still the stored one; a stale result is dropped silently.
    async fn attach_address(&self, generation: u64, address: String) {
        let mut slot = self.slot.lock().await;
        if slot.generation != generation {
            debug!("discarding address for superseded position");
            return;
        }
        if let Some(record) = slot.record.as_mut() {
            record.address = Some(address);
        }
    }

    pub async fn snapshot(&self) -> Option<PositionRecord> {
        self.slot.lock().await.record.clone()
    }
}
