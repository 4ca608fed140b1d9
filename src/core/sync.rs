use crate::core::model::RosterData;
use crate::core::ports::RosterStore;
use crate::utils::error::SyncError;

/// Caller-facing surface over a [`RosterStore`]. Every operation converts
/// failures into a safe default plus a log line; no error escapes. A caller
/// of `load_data` cannot tell "no data yet" apart from "backend unreachable",
/// which is the contract the UI layer expects.
pub struct SyncService<S: RosterStore> {
    store: S,
}

impl<S: RosterStore> SyncService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Fetches the current payload; an absent record and any backend failure
    /// both produce the empty default structure.
    pub async fn load_data(&self) -> RosterData {
        match self.store.load().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!("no roster record yet, returning empty payload");
                RosterData::default()
            }
            Err(e) => {
                tracing::error!("load failed: {e}");
                RosterData::default()
            }
        }
    }

    pub async fn save_data(&self, payload: &RosterData) -> bool {
        match self.store.save(payload).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("save failed: {e}");
                false
            }
        }
    }

    /// Verifies connectivity. When the table is missing, attempts the
    /// provisioning RPC once; if that also fails the table has to be created
    /// out-of-band and the result is `false`.
    pub async fn init_database(&self) -> bool {
        match self.store.probe().await {
            Ok(()) => {
                tracing::info!("✅ Supabase connected successfully");
                true
            }
            Err(SyncError::SchemaMissing) => {
                tracing::info!("📝 Table lssd_data does not exist. Creating...");
                match self.store.provision().await {
                    Ok(()) => {
                        tracing::info!("✅ Table lssd_data created");
                        true
                    }
                    Err(e) => {
                        tracing::warn!(
                            "⚠️ Could not create table ({e}); please create it manually"
                        );
                        false
                    }
                }
            }
            Err(e) => {
                tracing::error!("❌ Supabase connection failed: {e}");
                false
            }
        }
    }
}
