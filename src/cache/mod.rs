//! Cache-aside lookups backed by the relational store.
//!
//! A lookup reads its table first and only calls the upstream API on a miss,
//! persisting the normalized result before returning the stored row. Misses
//! for the same table and key are serialized through [`InFlight`], and the
//! table is read again once the guard is held, so a miss that lost the race
//! is served the row the winner inserted.

mod in_flight;

pub use in_flight::{InFlight, InFlightGuard};

use std::fmt;

use sea_orm::DbErr;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::clients::{UpstreamClient, UpstreamError, UpstreamRequest};
use crate::models::NormalizeError;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Storage error: {0}")]
    Storage(#[from] DbErr),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// A table that can back a cache-aside lookup.
#[async_trait::async_trait]
pub trait CacheTable: Send + Sync {
    /// Value of the lookup column.
    type Key: ?Sized + fmt::Display + Send + Sync;
    /// What the normalizer produces on a miss.
    type Record: Send;
    /// What is stored and returned.
    type Row: Send;

    fn table(&self) -> &'static str;

    async fn select(&self, key: &Self::Key) -> Result<Option<Self::Row>, DbErr>;

    async fn insert(&self, key: &Self::Key, record: Self::Record) -> Result<Self::Row, DbErr>;
}

pub struct CacheAside {
    upstream: UpstreamClient,
    in_flight: InFlight,
}

impl CacheAside {
    #[must_use]
    pub fn new(upstream: UpstreamClient) -> Self {
        Self {
            upstream,
            in_flight: InFlight::default(),
        }
    }

    #[must_use]
    pub const fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }

    /// Returns the stored row for `key`, fetching and persisting it on a miss.
    pub async fn lookup<T, N>(
        &self,
        table: &T,
        key: &T::Key,
        request: UpstreamRequest,
        normalize: N,
    ) -> Result<T::Row, LookupError>
    where
        T: CacheTable,
        N: FnOnce(&Value) -> Result<T::Record, NormalizeError> + Send,
    {
        let name = table.table();

        if let Some(row) = table.select(key).await? {
            record_lookup(name, "hit");
            debug!(table = name, key = %key, "Cache hit");
            return Ok(row);
        }

        let _guard = self.in_flight.acquire(format!("{name}:{key}")).await;

        if let Some(row) = table.select(key).await? {
            record_lookup(name, "hit");
            debug!(table = name, key = %key, "Cache filled while waiting");
            return Ok(row);
        }

        record_lookup(name, "miss");
        debug!(table = name, key = %key, "Cache miss, fetching upstream");

        let raw = self.upstream.fetch(&request).await?;
        let record = normalize(&raw)?;
        let row = table.insert(key, record).await?;

        info!(table = name, key = %key, "Cached upstream result");
        Ok(row)
    }
}

fn record_lookup(table: &'static str, outcome: &'static str) {
    metrics::counter!("cache_lookups_total", "table" => table, "outcome" => outcome).increment(1);
}
