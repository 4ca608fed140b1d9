use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;

use crate::config::SupabaseConfig;
use crate::core::model::RosterData;
use crate::core::ports::RosterStore;
use crate::utils::error::{Result, SyncError};

pub const TABLE: &str = "lssd_data";
pub const RECORD_ID: i64 = 1;

/// RPC the Supabase project may expose to create the table; absence of the
/// function simply means init reports failure and the table is created from
/// the dashboard instead.
const PROVISION_RPC: &str = "create_lssd_table";

/// Postgres error code for "relation does not exist", passed through by
/// PostgREST in the error body.
const UNDEFINED_TABLE: &str = "42P01";

/// [`RosterStore`] backed by the Supabase REST API.
pub struct PostgrestStore {
    client: Client,
    config: SupabaseConfig,
}

impl PostgrestStore {
    pub fn new(config: SupabaseConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: SupabaseConfig) -> Self {
        Self { client, config }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.config.url.trim_end_matches('/'), TABLE)
    }

    fn rpc_url(&self) -> String {
        format!(
            "{}/rest/v1/rpc/{}",
            self.config.url.trim_end_matches('/'),
            PROVISION_RPC
        )
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&self.config.anon_key)
    }
}

#[derive(Deserialize)]
struct DataRow {
    data: RosterData,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: ErrorBody = response.json().await.unwrap_or_default();
    if body.code.as_deref() == Some(UNDEFINED_TABLE) {
        return Err(SyncError::SchemaMissing);
    }

    Err(SyncError::Api {
        status,
        message: body
            .message
            .unwrap_or_else(|| "unknown backend error".to_string()),
    })
}

#[async_trait]
impl RosterStore for PostgrestStore {
    async fn load(&self) -> Result<Option<RosterData>> {
        tracing::debug!("loading roster record from {}", TABLE);
        let response = self
            .authed(self.client.get(self.table_url()))
            .query(&[
                ("select", "data".to_string()),
                ("id", format!("eq.{RECORD_ID}")),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;

        let rows: Vec<DataRow> = check(response).await?.json().await?;
        Ok(rows.into_iter().next().map(|row| row.data))
    }

    async fn save(&self, payload: &RosterData) -> Result<()> {
        // Single atomic upsert keyed on id; a concurrent writer can still be
        // overwritten (last writer wins) but no duplicate-key race exists.
        let rows = json!([{
            "id": RECORD_ID,
            "data": payload,
            "updated_at": Utc::now().to_rfc3339(),
        }]);

        let response = self
            .authed(self.client.post(self.table_url()))
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&rows)
            .send()
            .await?;

        check(response).await?;
        tracing::debug!("roster record saved");
        Ok(())
    }

    async fn probe(&self) -> Result<()> {
        let response = self
            .authed(self.client.get(self.table_url()))
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    async fn provision(&self) -> Result<()> {
        let response = self
            .authed(self.client.post(self.rpc_url()))
            .json(&json!({}))
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }
}
