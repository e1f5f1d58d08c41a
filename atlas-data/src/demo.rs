//! Demo-mode simulators.
//!
//! Pure functions that fabricate plausible probe results when no real
//! database is configured or demo mode is active. Latency centers on a
//! per-region baseline with bounded jitter.

use rand::Rng;

use crate::probe::{round2, ConnectionResult, HealthMetrics, LoadTestResult};

/// Baseline latency in milliseconds for a region's simulated probes.
pub fn baseline_latency_ms(region_id: &str) -> f64 {
    match region_id {
        "us-east" => 25.0,
        "eu-west" => 120.0,
        "asia-pacific" => 180.0,
        _ => 100.0,
    }
}

/// Jitter band applied to the baseline, in milliseconds.
pub const JITTER_MS: (f64, f64) = (-10.0, 20.0);

/// Fabricate a connection result.
pub fn simulate_connection(region_id: &str) -> ConnectionResult {
    let mut rng = rand::thread_rng();
    let base = baseline_latency_ms(region_id);
    ConnectionResult {
        success: true,
        latency_ms: round2(base + rng.gen_range(JITTER_MS.0..JITTER_MS.1)),
        server_ip: format!(
            "10.{}.{}.{}",
            rng.gen_range(1..=255),
            rng.gen_range(1..=255),
            rng.gen_range(1..=255)
        ),
        server_port: 6543,
        backend_pid: rng.gen_range(10_000..50_000),
        database: "defaultdb".to_string(),
        server_version: "PostgreSQL 16.2".to_string(),
        error: None,
    }
}

/// Fabricate health metrics.
pub fn simulate_health() -> HealthMetrics {
    let mut rng = rand::thread_rng();
    HealthMetrics {
        cache_hit_ratio: round2(95.0 + rng.gen_range(0.0..4.5)),
        active_connections: rng.gen_range(5..=25),
        max_connections: 100,
        db_size_mb: round2(rng.gen_range(100.0..500.0)),
    }
}

/// Fabricate a load test: samples ramp up slightly with call index, the
/// way queued work behaves against a warm pool.
pub fn simulate_load_test(region_id: &str, concurrent: usize) -> LoadTestResult {
    let mut rng = rand::thread_rng();
    let base = baseline_latency_ms(region_id);
    let samples: Vec<f64> = (0..concurrent)
        .map(|i| round2(base + rng.gen_range(-5.0..30.0) + i as f64 * 1.5))
        .collect();

    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let avg = samples.iter().sum::<f64>() / samples.len().max(1) as f64;

    LoadTestResult {
        concurrent,
        min_ms: round2(min),
        max_ms: round2(max),
        avg_ms: round2(avg),
        samples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_connection_succeeds_within_jitter_band() {
        for region_id in ["us-east", "eu-west", "asia-pacific", "unknown"] {
            let base = baseline_latency_ms(region_id);
            for _ in 0..100 {
                let result = simulate_connection(region_id);
                assert!(result.success);
                assert!(result.error.is_none());
                assert!(result.latency_ms >= base + JITTER_MS.0);
                // rounding to 2 decimals can land exactly on the bound
                assert!(result.latency_ms <= base + JITTER_MS.1);
            }
        }
    }

    #[test]
    fn test_simulated_connection_shape() {
        let result = simulate_connection("us-east");
        assert!(result.server_ip.starts_with("10."));
        assert_eq!(result.server_port, 6543);
        assert_eq!(result.database, "defaultdb");
        assert!(result.server_version.starts_with("PostgreSQL"));
    }

    #[test]
    fn test_simulated_health_is_bounded() {
        for _ in 0..100 {
            let metrics = simulate_health();
            assert!(metrics.cache_hit_ratio >= 95.0 && metrics.cache_hit_ratio <= 99.5);
            assert!((5..=25).contains(&metrics.active_connections));
            assert_eq!(metrics.max_connections, 100);
            assert!(metrics.db_size_mb >= 100.0 && metrics.db_size_mb <= 500.0);
        }
    }

    #[test]
    fn test_simulated_load_test_sample_count() {
        let result = simulate_load_test("eu-west", 10);
        assert_eq!(result.concurrent, 10);
        assert_eq!(result.samples.len(), 10);
        assert!(result.min_ms <= result.avg_ms && result.avg_ms <= result.max_ms);
    }

    #[test]
    fn test_unknown_region_uses_default_baseline() {
        assert_eq!(baseline_latency_ms("nowhere"), 100.0);
    }
}
