//! Fragment endpoints (htmx API).
//!
//! Every handler returns an HTML fragment that the client swaps into the
//! DOM. Failures become fragments too; nothing here returns an error
//! status for a probe that went wrong.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Html;
use futures::future::join_all;
use rand::Rng;

use atlas_data::demo;
use atlas_data::probe::{self, ConnectionResult, HealthMetrics, LoadTestResult};
use atlas_data::regions::{self, Region, REGIONS};

use crate::render;
use crate::state::AppState;

/// User key from the `X-User-ID` header; flag evaluation is per-user.
pub(crate) fn user_key(headers: &HeaderMap) -> String {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("anonymous")
        .to_string()
}

/// Sleep for a base duration plus random jitter, so demo responses feel
/// like real round trips.
async fn simulated_delay(base_secs: f64, jitter_secs: f64) {
    let extra: f64 = rand::thread_rng().gen_range(0.0..jitter_secs);
    tokio::time::sleep(Duration::from_secs_f64(base_secs + extra)).await;
}

/// Connection test for one region: real probe when a pool exists and
/// demo mode is off, simulator otherwise.
async fn connection_result_for(state: &AppState, region: &Region) -> ConnectionResult {
    match state.pools.get(region.id) {
        Some(pool) if !state.demo_mode => probe::test_connection(pool).await,
        _ => demo::simulate_connection(region.id),
    }
}

async fn health_for(state: &AppState, region: &Region) -> Option<HealthMetrics> {
    match state.pools.get(region.id) {
        Some(pool) if !state.demo_mode => probe::fetch_health(pool).await,
        _ => Some(demo::simulate_health()),
    }
}

async fn load_test_for(
    state: &AppState,
    region: &Region,
    concurrent: usize,
) -> Option<LoadTestResult> {
    match state.pools.get(region.id) {
        Some(pool) if !state.demo_mode => probe::run_load_test(pool, concurrent).await,
        _ => Some(demo::simulate_load_test(region.id, concurrent)),
    }
}

/// POST /api/regions/{region_id}/test
pub async fn test_region(
    State(state): State<Arc<AppState>>,
    Path(region_id): Path<String>,
    headers: HeaderMap,
) -> Html<String> {
    let user_key = user_key(&headers);

    let Some(region) = regions::find(&region_id) else {
        return Html(render::error_line("Unknown region"));
    };
    if !state.region_enabled(&region_id, &user_key).await {
        return Html(render::region_disabled(region));
    }

    simulated_delay(0.3, 0.4).await;

    let result = connection_result_for(&state, region).await;
    if !result.success {
        tracing::warn!(region = region.id, error = ?result.error, "connection test failed");
    }
    Html(render::connection_result(region, &result))
}

/// POST /api/regions/test-all
///
/// Tests every enabled region concurrently, then presents the results
/// sorted by latency with failures last.
pub async fn test_all_regions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Html<String> {
    let user_key = user_key(&headers);

    let mut enabled = Vec::new();
    for region in REGIONS {
        if state.region_enabled(region.id, &user_key).await {
            enabled.push(region);
        }
    }
    if enabled.is_empty() {
        return Html(render::warn_line("No regions enabled"));
    }

    simulated_delay(0.5, 0.5).await;

    let tests = enabled.into_iter().map(|region| {
        let state = state.clone();
        async move { (region, connection_result_for(&state, region).await) }
    });
    let mut results: Vec<(&Region, ConnectionResult)> = join_all(tests).await;
    probe::sort_by_latency(&mut results);

    Html(render::all_results(&results))
}

/// POST /api/regions/{region_id}/health
pub async fn region_health(
    State(state): State<Arc<AppState>>,
    Path(region_id): Path<String>,
    headers: HeaderMap,
) -> Html<String> {
    let user_key = user_key(&headers);

    let Some(region) = regions::find(&region_id) else {
        return Html(render::error_line("Unknown region"));
    };
    if !state.feature_enabled("health-checks", &user_key).await {
        return Html(render::warn_line("Health checks disabled"));
    }
    if !state.region_enabled(&region_id, &user_key).await {
        return Html(render::warn_line("Region disabled"));
    }

    simulated_delay(0.2, 0.2).await;

    match health_for(&state, region).await {
        Some(metrics) => Html(render::health_metrics(region, &metrics)),
        None => Html(render::error_line("Failed to fetch metrics")),
    }
}

/// POST /api/regions/{region_id}/load-test
pub async fn load_test(
    State(state): State<Arc<AppState>>,
    Path(region_id): Path<String>,
    headers: HeaderMap,
) -> Html<String> {
    let user_key = user_key(&headers);

    let Some(region) = regions::find(&region_id) else {
        return Html(render::error_line("Unknown region"));
    };
    if !state.feature_enabled("load-testing", &user_key).await {
        return Html(render::warn_line("Load testing disabled"));
    }
    if !state.region_enabled(&region_id, &user_key).await {
        return Html(render::warn_line("Region disabled"));
    }

    let concurrent = state.defaults.load_test_concurrency;

    // longest delay of the bunch, a load test is real work
    simulated_delay(1.5, 0.5).await;

    match load_test_for(&state, region, concurrent).await {
        Some(result) => Html(render::load_test_result(region, &result)),
        None => Html(render::error_line("Load test failed")),
    }
}

/// POST /api/flags/{flag_key}/toggle
pub async fn toggle_flag(
    State(state): State<Arc<AppState>>,
    Path(flag_key): Path<String>,
) -> Html<String> {
    if !state.demo_mode {
        return Html(render::error_line("Not in demo mode"));
    }

    if !state.flags.toggle(&flag_key).await {
        tracing::debug!(flag = %flag_key, "toggle ignored for unknown or non-boolean flag");
    }

    Html(render::flag_panel(&state.flags.snapshot().await))
}

/// GET /api/flags (also served as /api/flag-panel)
pub async fn list_flags(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render::flag_panel(&state.flags.snapshot().await))
}
