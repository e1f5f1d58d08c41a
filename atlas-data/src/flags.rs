use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::regions::REGIONS;

/// A feature flag value: a boolean switch or an integer setting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
}

impl FlagValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlagValue::Bool(v) => Some(*v),
            FlagValue::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FlagValue::Int(v) => Some(*v),
            FlagValue::Bool(_) => None,
        }
    }
}

/// In-memory feature flag store.
///
/// Values live for the life of the process and reset on restart; there
/// is no durability guarantee.
pub struct FlagStore {
    flags: RwLock<HashMap<String, FlagValue>>,
}

impl FlagStore {
    /// Store seeded with the default flags: every region enabled, health
    /// checks and load testing on, 30s dashboard refresh.
    pub fn new() -> Self {
        let mut flags = HashMap::new();
        for region in REGIONS {
            flags.insert(region_flag_key(region.id), FlagValue::Bool(true));
        }
        flags.insert("enable-health-checks".to_string(), FlagValue::Bool(true));
        flags.insert("enable-load-testing".to_string(), FlagValue::Bool(true));
        flags.insert(
            "dashboard-refresh-seconds".to_string(),
            FlagValue::Int(30),
        );
        FlagStore {
            flags: RwLock::new(flags),
        }
    }

    pub async fn get(&self, key: &str) -> Option<FlagValue> {
        self.flags.read().await.get(key).copied()
    }

    /// Flip a boolean flag. Unknown keys and integer flags are left
    /// untouched and report false.
    pub async fn toggle(&self, key: &str) -> bool {
        let mut flags = self.flags.write().await;
        match flags.get_mut(key) {
            Some(FlagValue::Bool(v)) => {
                *v = !*v;
                true
            }
            _ => false,
        }
    }

    /// All flags sorted by key, for stable display.
    pub async fn snapshot(&self) -> Vec<(String, FlagValue)> {
        let mut entries: Vec<(String, FlagValue)> = self
            .flags
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Whether a region is enabled. Unknown regions default to enabled.
    pub async fn is_region_enabled(&self, region_id: &str) -> bool {
        self.get(&region_flag_key(region_id))
            .await
            .and_then(|v| v.as_bool())
            .unwrap_or(true)
    }

    /// Whether a feature (health checks, load testing) is enabled.
    pub async fn is_feature_enabled(&self, feature: &str) -> bool {
        self.get(&feature_flag_key(feature))
            .await
            .and_then(|v| v.as_bool())
            .unwrap_or(true)
    }

    /// Dashboard auto-refresh interval in seconds.
    pub async fn refresh_seconds(&self) -> i64 {
        self.get("dashboard-refresh-seconds")
            .await
            .and_then(|v| v.as_int())
            .unwrap_or(30)
    }
}

impl Default for FlagStore {
    fn default() -> Self {
        FlagStore::new()
    }
}

/// Flag key controlling a region, e.g. `region-us-east-enabled`.
pub fn region_flag_key(region_id: &str) -> String {
    format!("region-{region_id}-enabled")
}

/// Flag key controlling a feature, e.g. `enable-health-checks`.
pub fn feature_flag_key(feature: &str) -> String {
    format!("enable-{}", feature.replace('_', "-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults_enable_everything() {
        let store = FlagStore::new();
        assert!(store.is_region_enabled("us-east").await);
        assert!(store.is_region_enabled("eu-west").await);
        assert!(store.is_feature_enabled("health-checks").await);
        assert!(store.is_feature_enabled("load_testing").await);
        assert_eq!(store.refresh_seconds().await, 30);
    }

    #[tokio::test]
    async fn test_toggle_twice_round_trips() {
        let store = FlagStore::new();
        let key = region_flag_key("us-east");
        let before = store.get(&key).await;

        assert!(store.toggle(&key).await);
        assert_ne!(store.get(&key).await, before);

        assert!(store.toggle(&key).await);
        assert_eq!(store.get(&key).await, before);
    }

    #[tokio::test]
    async fn test_toggle_unknown_flag_reports_false() {
        let store = FlagStore::new();
        assert!(!store.toggle("no-such-flag").await);
    }

    #[tokio::test]
    async fn test_toggle_integer_flag_is_refused() {
        let store = FlagStore::new();
        assert!(!store.toggle("dashboard-refresh-seconds").await);
        assert_eq!(store.refresh_seconds().await, 30);
    }

    #[tokio::test]
    async fn test_disabled_region_reads_false() {
        let store = FlagStore::new();
        store.toggle(&region_flag_key("eu-west")).await;
        assert!(!store.is_region_enabled("eu-west").await);
        assert!(store.is_region_enabled("us-east").await);
    }

    #[tokio::test]
    async fn test_unknown_region_defaults_to_enabled() {
        let store = FlagStore::new();
        assert!(store.is_region_enabled("mars-north").await);
    }

    #[tokio::test]
    async fn test_snapshot_is_sorted_by_key() {
        let store = FlagStore::new();
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.len(), REGIONS.len() + 3);
        let keys: Vec<&str> = snapshot.iter().map(|(k, _)| k.as_str()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_feature_key_replaces_underscores() {
        assert_eq!(feature_flag_key("health_checks"), "enable-health-checks");
        assert_eq!(feature_flag_key("load-testing"), "enable-load-testing");
    }

    #[test]
    fn test_flag_value_serializes_untagged() {
        let json = serde_json::to_string(&FlagValue::Bool(true)).unwrap();
        assert_eq!(json, "true");
        let json = serde_json::to_string(&FlagValue::Int(30)).unwrap();
        assert_eq!(json, "30");
    }
}
