//! HTML rendering for pages and fragments.
//!
//! The dashboard swaps these fragments into the DOM via htmx; every
//! endpoint returns markup, never JSON. Fragments are small enough to
//! build with format! — no templating engine.

use atlas_data::probe::{ConnectionResult, HealthMetrics, LoadTestResult};
use atlas_data::regions::Region;
use atlas_data::FlagValue;

/// View model for one dashboard region card.
pub struct RegionCard<'a> {
    pub region: &'a Region,
    pub enabled: bool,
    pub configured: bool,
}

/// Escape text interpolated from outside the process (error messages,
/// server-reported strings).
fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn error_line(message: &str) -> String {
    format!(r#"<div class="text-red-400">❌ {}</div>"#, escape(message))
}

pub fn warn_line(message: &str) -> String {
    format!(r#"<div class="text-amber-400">⚠️ {}</div>"#, escape(message))
}

/// Fragment shown when a region's flag is off.
pub fn region_disabled(region: &Region) -> String {
    format!(
        r#"<div class="rounded border border-amber-500/40 p-3">
  <div class="font-semibold" style="color: {color}">{name}</div>
  <div class="text-amber-400">⚠️ Region disabled via feature flag</div>
</div>"#,
        color = region.color,
        name = region.name,
    )
}

/// Result card for a single connection test.
pub fn connection_result(region: &Region, result: &ConnectionResult) -> String {
    if !result.success {
        let error = result.error.as_deref().unwrap_or("unknown error");
        return format!(
            r#"<div class="rounded border border-red-500/40 p-3">
  <div class="font-semibold" style="color: {color}">{name}</div>
  <div class="text-red-400">❌ Connection failed: {error}</div>
</div>"#,
            color = region.color,
            name = region.name,
            error = escape(error),
        );
    }

    format!(
        r#"<div class="rounded border border-emerald-500/40 p-3">
  <div class="flex justify-between">
    <span class="font-semibold" style="color: {color}">{name}</span>
    <span class="text-xs text-slate-400">{role}</span>
  </div>
  <div class="text-2xl font-mono">{latency:.2} ms</div>
  <dl class="text-xs text-slate-400">
    <div><dt>Server</dt><dd>{ip}:{port}</dd></div>
    <div><dt>Backend PID</dt><dd>{pid}</dd></div>
    <div><dt>Database</dt><dd>{database}</dd></div>
    <div><dt>Version</dt><dd>{version}</dd></div>
  </dl>
</div>"#,
        color = region.color,
        name = region.name,
        role = region.role.as_str(),
        latency = result.latency_ms,
        ip = escape(&result.server_ip),
        port = result.server_port,
        pid = result.backend_pid,
        database = escape(&result.database),
        version = escape(&result.server_version),
    )
}

/// Ranked list of fan-out results, fastest first. Rows carry the sort
/// key so the client can animate reorders.
pub fn all_results(results: &[(&Region, ConnectionResult)]) -> String {
    let mut rows = String::new();
    for (rank, (region, result)) in results.iter().enumerate() {
        let status = if result.success {
            format!("{:.2} ms", result.latency_ms)
        } else {
            format!(
                "failed: {}",
                escape(result.error.as_deref().unwrap_or("unknown error"))
            )
        };
        rows.push_str(&format!(
            r#"  <li class="flex justify-between" data-region="{id}" data-latency="{latency:.2}">
    <span><span class="text-slate-500">#{rank}</span> <span style="color: {color}">{name}</span></span>
    <span class="font-mono">{status}</span>
  </li>
"#,
            id = region.id,
            latency = if result.success { result.latency_ms } else { -1.0 },
            rank = rank + 1,
            color = region.color,
            name = region.name,
            status = status,
        ));
    }

    format!(
        "<ol class=\"space-y-1\">\n{rows}</ol>\n<div class=\"text-xs text-slate-500\">fastest first</div>"
    )
}

/// Health metrics card.
pub fn health_metrics(region: &Region, metrics: &HealthMetrics) -> String {
    format!(
        r#"<div class="rounded border border-slate-700 p-3">
  <div class="font-semibold" style="color: {color}">{name} health</div>
  <dl class="grid grid-cols-2 gap-1 text-sm">
    <dt>Cache hit ratio</dt><dd class="font-mono">{cache:.2}%</dd>
    <dt>Connections</dt><dd class="font-mono">{active} / {max}</dd>
    <dt>Database size</dt><dd class="font-mono">{size:.2} MB</dd>
  </dl>
</div>"#,
        color = region.color,
        name = region.name,
        cache = metrics.cache_hit_ratio,
        active = metrics.active_connections,
        max = metrics.max_connections,
        size = metrics.db_size_mb,
    )
}

/// Load test summary card.
pub fn load_test_result(region: &Region, result: &LoadTestResult) -> String {
    format!(
        r#"<div class="rounded border border-slate-700 p-3">
  <div class="font-semibold" style="color: {color}">{name} load test</div>
  <div class="text-sm">{concurrent} concurrent · {count} completed</div>
  <dl class="grid grid-cols-3 gap-1 text-sm font-mono">
    <dt>min</dt><dd>{min:.2} ms</dd>
    <dt>avg</dt><dd>{avg:.2} ms</dd>
    <dt>max</dt><dd>{max:.2} ms</dd>
  </dl>
</div>"#,
        color = region.color,
        name = region.name,
        concurrent = result.concurrent,
        count = result.samples.len(),
        min = result.min_ms,
        avg = result.avg_ms,
        max = result.max_ms,
    )
}

/// The flag panel: every flag with its value, boolean flags toggleable.
pub fn flag_panel(flags: &[(String, FlagValue)]) -> String {
    let mut rows = String::new();
    for (key, value) in flags {
        let key = escape(key);
        match value {
            FlagValue::Bool(on) => {
                let label = if *on { "ON" } else { "OFF" };
                let tone = if *on { "text-emerald-400" } else { "text-slate-500" };
                rows.push_str(&format!(
                    r##"  <li class="flex justify-between">
    <span class="font-mono text-sm">{key}</span>
    <button class="{tone}" hx-post="/api/flags/{key}/toggle" hx-target="#flag-panel" hx-swap="innerHTML">{label}</button>
  </li>
"##,
                ));
            }
            FlagValue::Int(v) => {
                rows.push_str(&format!(
                    r#"  <li class="flex justify-between">
    <span class="font-mono text-sm">{key}</span>
    <span class="text-slate-400">{v}</span>
  </li>
"#,
                ));
            }
        }
    }

    format!("<ul class=\"space-y-1\">\n{rows}</ul>")
}

/// Full dashboard page.
pub fn index(
    cards: &[RegionCard<'_>],
    demo_mode: bool,
    refresh_seconds: i64,
    flags: &[(String, FlagValue)],
    health_checks_enabled: bool,
    load_testing_enabled: bool,
) -> String {
    let mut card_html = String::new();
    for card in cards {
        let region = card.region;
        let badge = if !card.enabled {
            r#"<span class="text-amber-400 text-xs">disabled</span>"#
        } else if card.configured {
            r#"<span class="text-emerald-400 text-xs">configured</span>"#
        } else {
            r#"<span class="text-slate-500 text-xs">demo</span>"#
        };

        let mut buttons = format!(
            r##"      <button hx-post="/api/regions/{id}/test" hx-target="#result-{id}" hx-swap="innerHTML">Test</button>
"##,
            id = region.id,
        );
        if health_checks_enabled {
            buttons.push_str(&format!(
                r##"      <button hx-post="/api/regions/{id}/health" hx-target="#result-{id}" hx-swap="innerHTML">Health</button>
"##,
                id = region.id,
            ));
        }
        if load_testing_enabled {
            buttons.push_str(&format!(
                r##"      <button hx-post="/api/regions/{id}/load-test" hx-target="#result-{id}" hx-swap="innerHTML">Load</button>
"##,
                id = region.id,
            ));
        }

        card_html.push_str(&format!(
            r#"    <section class="rounded border border-slate-700 p-4" id="region-{id}">
      <header class="flex justify-between">
        <h2 class="font-semibold" style="color: {color}">{name}</h2>
        <span class="text-xs text-slate-400">{role}</span>
      </header>
      {badge}
      <div class="flex gap-2 my-2">
{buttons}      </div>
      <div id="result-{id}"></div>
    </section>
"#,
            id = region.id,
            color = region.color,
            name = region.name,
            role = region.role.as_str(),
            badge = badge,
        ));
    }

    let demo_badge = if demo_mode {
        r#"<span class="text-amber-400 text-sm">demo mode</span>"#
    } else {
        ""
    };

    format!(
        r##"<!doctype html>
<html lang="en" class="dark">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Atlas Multi-Region Dashboard</title>
  <script src="https://unpkg.com/htmx.org@1.9.12"></script>
  <link rel="stylesheet" href="/static/app.css">
</head>
<body class="bg-slate-900 text-slate-100">
  <main class="max-w-5xl mx-auto p-6">
    <header class="flex justify-between items-baseline mb-6">
      <h1 class="text-xl font-bold">Atlas Multi-Region Dashboard</h1>
      {demo_badge}
    </header>

    <div class="mb-4">
      <button hx-post="/api/regions/test-all" hx-target="#all-results" hx-swap="innerHTML">Test All Regions</button>
    </div>
    <div id="all-results" hx-get="/api/all-results" hx-trigger="every {refresh_seconds}s"></div>

    <div class="grid grid-cols-1 md:grid-cols-3 gap-4 my-6">
{card_html}    </div>

    <section class="rounded border border-slate-700 p-4">
      <h2 class="font-semibold mb-2">Feature flags</h2>
      <div id="flag-panel">
{flag_panel}      </div>
    </section>
  </main>
</body>
</html>"##,
        demo_badge = demo_badge,
        refresh_seconds = refresh_seconds,
        card_html = card_html,
        flag_panel = flag_panel(flags),
    )
}
