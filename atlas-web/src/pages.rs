//! Full-page routes. Everything under /api returns fragments; these
//! render the pages users navigate to directly.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;

use atlas_data::regions::REGIONS;

use crate::api::user_key;
use crate::render::{self, RegionCard};
use crate::state::AppState;

/// GET / — the dashboard, with one card per region reflecting the
/// current flag and configuration state.
pub async fn dashboard(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Html<String> {
    let user_key = user_key(&headers);

    let mut cards = Vec::with_capacity(REGIONS.len());
    for region in REGIONS {
        cards.push(RegionCard {
            region,
            enabled: state.region_enabled(region.id, &user_key).await,
            configured: region.dsn().is_some(),
        });
    }

    let flags = if state.demo_mode {
        state.flags.snapshot().await
    } else {
        Vec::new()
    };

    Html(render::index(
        &cards,
        state.demo_mode,
        state.flags.refresh_seconds().await,
        &flags,
        state.feature_enabled("health-checks", &user_key).await,
        state.feature_enabled("load-testing", &user_key).await,
    ))
}
