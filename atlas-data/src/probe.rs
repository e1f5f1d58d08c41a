//! Probe operations against a region's database.
//!
//! Every probe folds failure into its result type instead of returning
//! an error: the dashboard renders whatever comes back, and one broken
//! region must never take a request down with it.

use std::time::Instant;

use futures::future::join_all;
use serde::Serialize;
use sqlx::{PgPool, Row};

/// Result of a single connection test.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionResult {
    pub success: bool,
    pub latency_ms: f64,
    pub server_ip: String,
    pub server_port: i32,
    pub backend_pid: i32,
    pub database: String,
    pub server_version: String,
    pub error: Option<String>,
}

impl ConnectionResult {
    /// Failed test carrying only an error message.
    pub fn failure(error: impl Into<String>) -> Self {
        ConnectionResult {
            success: false,
            latency_ms: 0.0,
            server_ip: String::new(),
            server_port: 0,
            backend_pid: 0,
            database: String::new(),
            server_version: String::new(),
            error: Some(error.into()),
        }
    }
}

/// Health metrics sampled from one database.
#[derive(Debug, Clone, Serialize)]
pub struct HealthMetrics {
    /// Buffer cache hit ratio, percent
    pub cache_hit_ratio: f64,
    pub active_connections: i64,
    pub max_connections: i64,
    pub db_size_mb: f64,
}

/// Aggregate of a concurrent load test.
#[derive(Debug, Clone, Serialize)]
pub struct LoadTestResult {
    pub concurrent: usize,
    pub min_ms: f64,
    pub max_ms: f64,
    pub avg_ms: f64,
    /// Latencies of the calls that survived, in completion order
    pub samples: Vec<f64>,
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Test connectivity and measure round-trip latency.
///
/// Times the full acquire-and-query cycle with a monotonic clock.
pub async fn test_connection(pool: &PgPool) -> ConnectionResult {
    let start = Instant::now();

    let row = sqlx::query(
        "SELECT host(inet_server_addr())::text AS server_ip, \
                inet_server_port() AS server_port, \
                pg_backend_pid() AS backend_pid, \
                current_database() AS database, \
                version() AS server_version",
    )
    .fetch_one(pool)
    .await;

    let row = match row {
        Ok(row) => row,
        Err(e) => return ConnectionResult::failure(e.to_string()),
    };

    let latency_ms = round2(start.elapsed().as_secs_f64() * 1000.0);

    ConnectionResult {
        success: true,
        latency_ms,
        server_ip: row
            .try_get::<Option<String>, _>("server_ip")
            .ok()
            .flatten()
            .unwrap_or_default(),
        server_port: row
            .try_get::<Option<i32>, _>("server_port")
            .ok()
            .flatten()
            .unwrap_or(0),
        backend_pid: row.try_get("backend_pid").unwrap_or(0),
        database: row.try_get("database").unwrap_or_default(),
        server_version: row.try_get("server_version").unwrap_or_default(),
        error: None,
    }
}

/// Fetch health metrics for a region.
///
/// Returns `None` on any failure; never a partial record.
pub async fn fetch_health(pool: &PgPool) -> Option<HealthMetrics> {
    match health_queries(pool).await {
        Ok(metrics) => Some(metrics),
        Err(e) => {
            tracing::warn!(error = %e, "health metrics fetch failed");
            None
        }
    }
}

/// Three independent samples over a single acquired connection.
async fn health_queries(pool: &PgPool) -> Result<HealthMetrics, sqlx::Error> {
    let mut conn = pool.acquire().await?;

    let cache_hit_ratio: f64 = sqlx::query(
        "SELECT CASE \
                    WHEN blks_hit + blks_read = 0 THEN 0 \
                    ELSE round(100.0 * blks_hit / (blks_hit + blks_read), 2) \
                END::float8 AS cache_hit_ratio \
           FROM pg_stat_database \
          WHERE datname = current_database()",
    )
    .fetch_one(&mut *conn)
    .await?
    .try_get::<Option<f64>, _>("cache_hit_ratio")?
    .unwrap_or(0.0);

    let counts = sqlx::query(
        "SELECT (SELECT count(*) FROM pg_stat_activity) AS active_connections, \
                (SELECT setting::bigint FROM pg_settings WHERE name = 'max_connections') AS max_connections",
    )
    .fetch_one(&mut *conn)
    .await?;
    let active_connections: i64 = counts
        .try_get::<Option<i64>, _>("active_connections")?
        .unwrap_or(0);
    let max_connections: i64 = counts
        .try_get::<Option<i64>, _>("max_connections")?
        .unwrap_or(0);

    let db_size_mb: f64 = sqlx::query(
        "SELECT (pg_database_size(current_database()) / 1024.0 / 1024.0)::float8 AS db_size_mb",
    )
    .fetch_one(&mut *conn)
    .await?
    .try_get::<Option<f64>, _>("db_size_mb")?
    .unwrap_or(0.0);

    Ok(HealthMetrics {
        cache_hit_ratio,
        active_connections,
        max_connections,
        db_size_mb: round2(db_size_mb),
    })
}

/// Run `concurrent` trivial queries against the pool at once.
///
/// Failed calls are discarded; `None` when every call failed.
pub async fn run_load_test(pool: &PgPool, concurrent: usize) -> Option<LoadTestResult> {
    let calls = (0..concurrent).map(|_| async move {
        let start = Instant::now();
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(pool)
            .await
            .ok()
            .map(|_| round2(start.elapsed().as_secs_f64() * 1000.0))
    });

    let samples: Vec<f64> = join_all(calls).await.into_iter().flatten().collect();
    summarize(concurrent, samples)
}

/// Fold surviving samples into a load test summary.
pub fn summarize(concurrent: usize, samples: Vec<f64>) -> Option<LoadTestResult> {
    if samples.is_empty() {
        return None;
    }
    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let avg = samples.iter().sum::<f64>() / samples.len() as f64;
    Some(LoadTestResult {
        concurrent,
        min_ms: round2(min),
        max_ms: round2(max),
        avg_ms: round2(avg),
        samples,
    })
}

/// Order fan-out results by ascending latency; failed tests sort last.
pub fn sort_by_latency<T>(results: &mut [(T, ConnectionResult)]) {
    fn key(result: &ConnectionResult) -> f64 {
        if result.success {
            result.latency_ms
        } else {
            f64::INFINITY
        }
    }
    results.sort_by(|a, b| {
        key(&a.1)
            .partial_cmp(&key(&b.1))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
