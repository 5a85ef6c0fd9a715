//! Query client for the backing tabular store.
//!
//! The store exposes a PostgREST-style interface: one URL per table, filters
//! as `column=predicate` query pairs, and `Prefer: return=representation` on
//! writes so the caller can reconcile local state from the written row
//! without a second round trip.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::sync::OnceCell;
use tracing::debug;
use url::Url;

use crate::{
    Result,
    api::{APP_USER_AGENT, ApiClient},
    config::StoreConfig,
};

/// Batch size for id-set lookups. Keeps each `in.(...)` predicate well under
/// URL length limits.
pub const ID_BATCH_SIZE: usize = 40;

/// Rows that carry their own identity, so batched lookups can de-duplicate
/// results before any downstream join.
pub trait Identified {
    /// The row's primary id.
    fn id(&self) -> &str;
}

/// Column selection, filters, and ordering for one table query.
#[derive(Debug, Default, Clone)]
pub struct Select {
    columns: Option<String>,
    filters: Vec<(String, String)>,
    order: Option<String>,
}

impl Select {
    /// An unfiltered select of all columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the returned columns, e.g. `"id,title,status"`.
    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = Some(columns.to_owned());
        self
    }

    /// Equality filter on a column.
    pub fn eq(self, column: &str, value: &str) -> Self {
        self.filter(column, &format!("eq.{value}"))
    }

    /// Raw column→predicate filter, e.g. `("id", "in.(\"a\",\"b\")")`.
    pub fn filter(mut self, column: &str, predicate: &str) -> Self {
        self.filters.push((column.to_owned(), predicate.to_owned()));
        self
    }

    /// Ordering clause, e.g. `"created_at.desc"`.
    pub fn order(mut self, order: &str) -> Self {
        self.order = Some(order.to_owned());
        self
    }

    fn apply(&self, url: &mut Url) {
        let mut pairs = url.query_pairs_mut();
        if let Some(columns) = &self.columns {
            pairs.append_pair("select", columns);
        }
        for (column, predicate) in &self.filters {
            pairs.append_pair(column, predicate);
        }
        if let Some(order) = &self.order {
            pairs.append_pair("order", order);
        }
    }
}

/// Build a membership predicate for an id set: `in.("a","b")`. Empty strings
/// are skipped and duplicates collapsed; an effectively empty set yields
/// `None` (no filter to apply).
pub fn in_filter(ids: &[String]) -> Option<String> {
    let unique = unique_ids(ids);
    if unique.is_empty() {
        return None;
    }
    let payload = unique
        .iter()
        .map(|id| format!("\"{id}\""))
        .collect::<Vec<_>>()
        .join(",");
    Some(format!("in.({payload})"))
}

fn unique_ids(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

/// Client for the backing store's REST interface.
///
/// Credentials come from configuration when present; otherwise they are
/// fetched once from the application API, cached for the life of the process
/// after the first successful resolution, and re-attempted on failure.
#[derive(Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    api: ApiClient,
    fixed: Option<StoreConfig>,
    resolved: Arc<OnceCell<StoreConfig>>,
}

/// Store credentials as served by the application API.
#[derive(Deserialize)]
struct RemoteStoreConfig {
    url: Url,
    #[serde(alias = "anonKey")]
    key: String,
}

impl StoreClient {
    /// Create a store client. `fixed` short-circuits credential resolution.
    pub fn new(api: ApiClient, fixed: Option<StoreConfig>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            api,
            fixed,
            resolved: Arc::new(OnceCell::new()),
        })
    }

    async fn resolve(&self) -> Result<StoreConfig> {
        if let Some(cfg) = &self.fixed {
            return Ok(cfg.clone());
        }
        self.resolved
            .get_or_try_init(|| async {
                let remote: RemoteStoreConfig = self.api.get("/auth/store/config").await?;
                debug!("resolved backing-store credentials from the API");
                Ok(StoreConfig {
                    url: remote.url,
                    key: remote.key,
                })
            })
            .await
            .cloned()
    }

    fn table_url(cfg: &StoreConfig, table: &str) -> Result<Url> {
        let base = cfg.url.as_str().trim_end_matches('/');
        Ok(format!("{base}/rest/v1/{table}").parse()?)
    }

    /// Query rows from a table.
    pub async fn query<T: DeserializeOwned>(&self, table: &str, select: Select) -> Result<Vec<T>> {
        let cfg = self.resolve().await?;
        let mut url = Self::table_url(&cfg, table)?;
        select.apply(&mut url);
        debug!(%url, "store query");

        let res = self
            .http
            .get(url)
            .header("apikey", &cfg.key)
            .bearer_auth(&cfg.key)
            .send()
            .await?;
        crate::api::decode(res).await
    }

    /// Fetch rows matching an arbitrary-size id set, issuing one request per
    /// batch of [`ID_BATCH_SIZE`] ids and de-duplicating the concatenated
    /// results by id. A failed batch aborts the whole aggregate; partial
    /// results are discarded, not returned.
    pub async fn fetch_by_ids<T>(
        &self,
        table: &str,
        id_column: &str,
        columns: &str,
        ids: &[String],
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Identified,
    {
        let unique = unique_ids(ids);
        let mut rows: Vec<T> = Vec::with_capacity(unique.len());
        for batch in unique.chunks(ID_BATCH_SIZE) {
            if let Some(predicate) = in_filter(batch) {
                let page = self
                    .query(table, Select::new().columns(columns).filter(id_column, &predicate))
                    .await?;
                rows.extend(page);
            }
        }

        let mut seen = HashSet::new();
        rows.retain(|row| seen.insert(row.id().to_owned()));
        Ok(rows)
    }

    /// Insert one row, returning the written representation.
    pub async fn insert<T: DeserializeOwned>(
        &self,
        table: &str,
        body: &impl Serialize,
    ) -> Result<Vec<T>> {
        let cfg = self.resolve().await?;
        let url = Self::table_url(&cfg, table)?;
        debug!(%url, "store insert");

        let res = self
            .http
            .post(url)
            .header("apikey", &cfg.key)
            .bearer_auth(&cfg.key)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        crate::api::decode(res).await
    }

    /// Update the rows matched by `select`, returning the written
    /// representations.
    pub async fn update<T: DeserializeOwned>(
        &self,
        table: &str,
        select: Select,
        body: &impl Serialize,
    ) -> Result<Vec<T>> {
        let cfg = self.resolve().await?;
        let mut url = Self::table_url(&cfg, table)?;
        select.apply(&mut url);
        debug!(%url, "store update");

        let res = self
            .http
            .patch(url)
            .header("apikey", &cfg.key)
            .bearer_auth(&cfg.key)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        crate::api::decode(res).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn in_filter_quotes_and_dedupes() {
        let filter = in_filter(&ids(&["a", "b", "a", "", "c"]));
        assert_eq!(filter.as_deref(), Some(r#"in.("a","b","c")"#));
    }

    #[test]
    fn in_filter_empty_set_is_no_filter() {
        assert_eq!(in_filter(&[]), None);
        assert_eq!(in_filter(&ids(&["", ""])), None);
    }

    #[test]
    fn id_batches_respect_the_batch_size() {
        let many: Vec<String> = (0..85).map(|i| format!("id-{i}")).collect();
        let unique = unique_ids(&many);
        let batches: Vec<_> = unique.chunks(ID_BATCH_SIZE).collect();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 40);
        assert_eq!(batches[2].len(), 5);
    }

    #[test]
    fn select_builds_query_pairs_in_order() {
        let mut url: Url = "http://store.local/rest/v1/works".parse().unwrap();
        Select::new()
            .columns("id,title")
            .eq("status", "published")
            .order("created_at.desc")
            .apply(&mut url);
        assert_eq!(
            url.query(),
            Some("select=id%2Ctitle&status=eq.published&order=created_at.desc")
        );
    }
}
