use std::collections::HashMap;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::regions::{Defaults, REGIONS};

/// Connection pools for every configured region.
///
/// A region without a pool (no DSN, or the initial connect failed) is
/// treated as unconfigured by callers, which fall back to the demo
/// simulators.
#[derive(Default)]
pub struct PoolManager {
    pools: HashMap<&'static str, PgPool>,
}

impl PoolManager {
    pub fn new() -> Self {
        PoolManager {
            pools: HashMap::new(),
        }
    }

    /// Build pools for all regions with a configured connection string.
    ///
    /// A region that fails to connect is logged and skipped; one bad
    /// region never blocks the rest.
    pub async fn initialize(&mut self, defaults: &Defaults) {
        for region in REGIONS {
            let Some(dsn) = region.dsn() else {
                tracing::info!(region = region.id, "no connection string configured");
                continue;
            };

            let pool = PgPoolOptions::new()
                .min_connections(1)
                .max_connections(10)
                .acquire_timeout(Duration::from_secs(defaults.connect_timeout_secs))
                .connect(&dsn)
                .await;

            match pool {
                Ok(pool) => {
                    tracing::info!(region = region.id, name = region.name, "connected");
                    self.pools.insert(region.id, pool);
                }
                Err(e) => {
                    tracing::warn!(region = region.id, error = %e, "failed to connect");
                }
            }
        }
    }

    /// Close all pools.
    pub async fn close(&self) {
        for (region_id, pool) in &self.pools {
            pool.close().await;
            tracing::info!(region = region_id, "closed pool");
        }
    }

    /// Pool for a region, if one was established.
    pub fn get(&self, region_id: &str) -> Option<&PgPool> {
        self.pools.get(region_id)
    }
}
