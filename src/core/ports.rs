use async_trait::async_trait;

use crate::core::model::RosterData;
use crate::utils::error::Result;

/// Storage port for the single roster record.
///
/// `load` distinguishes "no record yet" (`Ok(None)`) from transport and query
/// failures (`Err`); collapsing both into a default payload is the service
/// layer's job, not the store's.
#[async_trait]
pub trait RosterStore: Send + Sync {
    async fn load(&self) -> Result<Option<RosterData>>;

    /// Persists the payload at the fixed identity, inserting or overwriting
    /// as one atomic operation.
    async fn save(&self, payload: &RosterData) -> Result<()>;

    /// Lightweight existence check against the record's table. A missing
    /// table surfaces as `SyncError::SchemaMissing`.
    async fn probe(&self) -> Result<()>;

    /// Best-effort remote call that creates the table when it is absent.
    async fn provision(&self) -> Result<()>;
}
