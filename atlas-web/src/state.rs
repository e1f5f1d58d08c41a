use std::sync::Arc;

use atlas_data::flags::{feature_flag_key, region_flag_key};
use atlas_data::pool::PoolManager;
use atlas_data::regions::Defaults;
use atlas_data::remote::RemoteFlagClient;
use atlas_data::FlagStore;

/// Shared application state accessible by all handlers.
pub struct AppState {
    /// Per-region connection pools; regions without a pool use simulators
    pub pools: PoolManager,
    /// In-memory feature flags
    pub flags: FlagStore,
    /// Optional pass-through to an external flag-evaluation service
    pub remote_flags: Option<RemoteFlagClient>,
    /// Fabricate probe results instead of touching real databases
    pub demo_mode: bool,
    /// Probe tunables
    pub defaults: Defaults,
}

impl AppState {
    pub fn new(pools: PoolManager, demo_mode: bool) -> Arc<Self> {
        Arc::new(AppState {
            pools,
            flags: FlagStore::new(),
            remote_flags: None,
            demo_mode,
            defaults: Defaults::default(),
        })
    }

    /// Build state from the environment: demo-mode toggle, per-region
    /// pools, and flag-service credentials. Demo mode skips both the
    /// pools and the remote flag service.
    pub async fn from_env() -> Arc<Self> {
        let demo_mode = demo_mode_from_env();
        let defaults = Defaults::default();

        let mut pools = PoolManager::new();
        if !demo_mode {
            pools.initialize(&defaults).await;
        }

        Arc::new(AppState {
            pools,
            flags: FlagStore::new(),
            remote_flags: if demo_mode {
                None
            } else {
                RemoteFlagClient::from_env()
            },
            demo_mode,
            defaults,
        })
    }

    /// Region flag check for a user, passing through to the remote
    /// service when one is configured.
    pub async fn region_enabled(&self, region_id: &str, user_key: &str) -> bool {
        let local = self.flags.is_region_enabled(region_id).await;
        self.remote_bool(&region_flag_key(region_id), user_key, local)
            .await
    }

    /// Feature flag check (health checks, load testing) for a user.
    pub async fn feature_enabled(&self, feature: &str, user_key: &str) -> bool {
        let local = self.flags.is_feature_enabled(feature).await;
        self.remote_bool(&feature_flag_key(feature), user_key, local)
            .await
    }

    /// Remote evaluation with fallback to the local store value.
    async fn remote_bool(&self, flag_key: &str, user_key: &str, local: bool) -> bool {
        let Some(client) = &self.remote_flags else {
            return local;
        };
        match client.evaluate(flag_key, user_key, local).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(flag = flag_key, error = %e, "remote flag evaluation failed");
                local
            }
        }
    }
}

/// `DEMO_MODE` env toggle; demo mode is the default.
fn demo_mode_from_env() -> bool {
    match std::env::var("DEMO_MODE") {
        Ok(v) => v.eq_ignore_ascii_case("true"),
        Err(_) => true,
    }
}
