use serde::Serialize;

/// Role a region's database plays in the fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Primary,
    Replica,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Primary => "PRIMARY",
            Role::Replica => "REPLICA",
        }
    }
}

/// Configuration for a single database region.
///
/// The registry is fixed at compile time; only the connection string is
/// resolved from the environment.
#[derive(Debug, Clone, Serialize)]
pub struct Region {
    /// Stable identifier used in routes and flag keys
    pub id: &'static str,
    /// Human-readable name
    pub name: &'static str,
    pub role: Role,
    /// Environment variable holding the connection string
    pub env_key: &'static str,
    /// UI color for the region card
    pub color: &'static str,
}

impl Region {
    /// Connection string from the environment, if configured.
    pub fn dsn(&self) -> Option<String> {
        std::env::var(self.env_key).ok().filter(|v| !v.is_empty())
    }
}

/// Region registry. Add regions here.
pub const REGIONS: &[Region] = &[
    Region {
        id: "us-east",
        name: "US East (Virginia)",
        role: Role::Primary,
        env_key: "ATLAS_PG_US_EAST",
        color: "#10b981",
    },
    Region {
        id: "eu-west",
        name: "EU West (Ireland)",
        role: Role::Replica,
        env_key: "ATLAS_PG_EU_WEST",
        color: "#3b82f6",
    },
    Region {
        id: "asia-pacific",
        name: "Asia Pacific (Singapore)",
        role: Role::Replica,
        env_key: "ATLAS_PG_ASIA_PACIFIC",
        color: "#f59e0b",
    },
];

/// Look up a region by its identifier.
pub fn find(region_id: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|r| r.id == region_id)
}

/// Probe tunables shared by the pool manager and the dashboard.
#[derive(Debug, Clone, Copy)]
pub struct Defaults {
    /// Seconds to wait when acquiring a connection
    pub connect_timeout_secs: u64,
    /// Number of concurrent calls in a load test
    pub load_test_concurrency: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            connect_timeout_secs: 10,
            load_test_concurrency: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_known_regions() {
        for id in ["us-east", "eu-west", "asia-pacific"] {
            let region = find(id).unwrap();
            assert_eq!(region.id, id);
        }
    }

    #[test]
    fn test_find_unknown_region_returns_none() {
        assert!(find("mars-north").is_none());
    }

    #[test]
    fn test_exactly_one_primary() {
        let primaries = REGIONS.iter().filter(|r| r.role == Role::Primary).count();
        assert_eq!(primaries, 1);
    }

    #[test]
    fn test_dsn_resolves_from_environment() {
        // Use a region's real env key; tests that touch the environment
        // use a value unique to this test to avoid interference.
        let region = Region {
            id: "test-region",
            name: "Test Region",
            role: Role::Replica,
            env_key: "ATLAS_PG_DSN_RESOLUTION_TEST",
            color: "#000000",
        };
        assert!(region.dsn().is_none());

        std::env::set_var(region.env_key, "postgres://localhost/test");
        assert_eq!(region.dsn().as_deref(), Some("postgres://localhost/test"));

        std::env::set_var(region.env_key, "");
        assert!(region.dsn().is_none(), "empty value counts as unconfigured");
        std::env::remove_var(region.env_key);
    }

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::Primary.as_str(), "PRIMARY");
        assert_eq!(Role::Replica.as_str(), "REPLICA");
    }
}
