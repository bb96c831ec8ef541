use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::cache::QuoteCache;
use crate::errors::ScreenerError;
use crate::models::{ScreenOutcome, ScreeningRequest};
use crate::requests::YahooFinance;
use crate::screener::run_screen;

struct AppState {
    provider: YahooFinance,
    // Holding the lock across a whole screen keeps one logical request in
    // flight at a time; the cache is the only cross-request state.
    cache: Mutex<QuoteCache>,
}

/// Entry point for the `dashboard` subcommand.
pub async fn serve(host: &str, port: u16) -> Result<()> {
    let state = Arc::new(AppState {
        provider: YahooFinance::new()?,
        cache: Mutex::new(QuoteCache::new()),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(index))
        .route("/health", get(|| async { "ok" }))
        .route("/api/screen", post(api_screen))
        .layer(cors)
        .with_state(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "dashboard listening");
    println!("Dashboard running at http://{addr}");
    axum::serve(listener, app).await.context("serving dashboard")?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

async fn api_screen(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScreeningRequest>,
) -> Result<Json<ScreenOutcome>, ApiError> {
    let mut cache = state.cache.lock().await;
    let outcome = run_screen(&state.provider, &mut *cache, &request).await?;
    Ok(Json(outcome))
}

enum ApiError {
    BadRequest(String),
    Upstream(String),
}

impl From<ScreenerError> for ApiError {
    fn from(error: ScreenerError) -> Self {
        match error {
            ScreenerError::Validation(_) => ApiError::BadRequest(error.to_string()),
            _ => ApiError::Upstream(format!("{:#}", anyhow::Error::from(error))),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
            ApiError::Upstream(message) => (StatusCode::BAD_GATEWAY, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

const DASHBOARD_HTML: &str = r##"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Options Screener</title>
<script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
<style>
  body { font-family: Helvetica, Arial, sans-serif; margin: 0; background: #1a1a2e; color: #eee; }
  header { padding: 16px 24px; border-bottom: 1px solid #333; }
  header h1 { margin: 0; font-size: 20px; }
  main { padding: 24px; max-width: 1200px; margin: 0 auto; }
  form { display: flex; flex-wrap: wrap; gap: 12px; align-items: end; margin-bottom: 20px; }
  label { display: flex; flex-direction: column; font-size: 12px; color: #aaa; gap: 4px; }
  input, select { background: #16213e; color: #eee; border: 1px solid #444; border-radius: 4px; padding: 6px 8px; width: 110px; }
  button { background: #0f3460; color: #fff; border: 0; border-radius: 4px; padding: 9px 18px; cursor: pointer; }
  button:disabled { opacity: 0.5; }
  #error { color: #e94560; margin: 8px 0; white-space: pre-wrap; }
  .tiles { display: flex; gap: 16px; margin-bottom: 20px; }
  .tile { background: #16213e; border-radius: 6px; padding: 12px 20px; min-width: 130px; }
  .tile .k { font-size: 12px; color: #aaa; }
  .tile .v { font-size: 20px; margin-top: 4px; }
  table { border-collapse: collapse; width: 100%; font-size: 13px; margin-bottom: 24px; }
  th, td { padding: 6px 10px; text-align: right; border-bottom: 1px solid #2a2a40; }
  th:first-child, td:first-child { text-align: left; }
  th { color: #aaa; font-weight: normal; }
  .charts { display: grid; grid-template-columns: 1fr 1fr; gap: 16px; }
  .chart { background: #16213e; border-radius: 6px; min-height: 320px; }
  #scatter { grid-column: 1 / -1; }
  .note { font-size: 11px; color: #888; margin: 8px 0 16px; }
</style>
</head>
<body>
<header><h1>Options-Selling Screener</h1></header>
<main>
  <form id="controls">
    <label>Ticker <input id="ticker" value="DPST"></label>
    <label>Strategy
      <select id="strategy">
        <option value="cash_secured_put">Cash-secured put</option>
        <option value="covered_call">Covered call</option>
      </select>
    </label>
    <label>Min DTE <input id="min_dte" type="number" min="1" max="90" value="30"></label>
    <label>Max DTE <input id="max_dte" type="number" min="1" max="90" value="45"></label>
    <label>Min OTM <input id="min_otm" type="number" step="0.01" min="0.01" max="0.30" value="0.05"></label>
    <label>Max OTM <input id="max_otm" type="number" step="0.01" min="0.01" max="0.30" value="0.15"></label>
    <button id="go" type="submit">Screen</button>
  </form>
  <div id="error"></div>
  <div class="tiles">
    <div class="tile"><div class="k">Ticker</div><div class="v" id="t-ticker">-</div></div>
    <div class="tile"><div class="k">Price</div><div class="v" id="t-price">-</div></div>
    <div class="tile"><div class="k">Strategy</div><div class="v" id="t-strategy">-</div></div>
    <div class="tile"><div class="k">Opportunities</div><div class="v" id="t-count">-</div></div>
  </div>
  <div id="results" style="display:none">
    <table>
      <thead><tr>
        <th>Contract</th><th>DTE</th><th>Strike</th><th>Premium</th><th>Risk</th>
        <th>Volume</th><th>Open interest</th><th>Annualized return</th>
      </tr></thead>
      <tbody id="rows"></tbody>
    </table>
    <div class="note">Risk is |delta| when the data source supplies it; otherwise
      |strike - spot| / spot, a distance heuristic rather than an option Greek.</div>
    <div class="charts">
      <div id="bar" class="chart"></div>
      <div id="hist" class="chart"></div>
      <div id="scatter" class="chart"></div>
    </div>
  </div>
  <div id="empty" style="display:none">No opportunities found. Try widening the bands.</div>
</main>
<script>
const layout = {
  paper_bgcolor: '#16213e', plot_bgcolor: '#16213e',
  font: { color: '#ccc', size: 11 }, margin: { t: 40, r: 20, b: 40, l: 50 },
};
const fmtUsd = v => '$' + v.toFixed(2);
const fmtPct = v => (v * 100).toFixed(2) + '%';

document.getElementById('controls').addEventListener('submit', async (event) => {
  event.preventDefault();
  const go = document.getElementById('go');
  const error = document.getElementById('error');
  go.disabled = true;
  error.textContent = '';
  try {
    const body = {
      ticker: document.getElementById('ticker').value,
      strategy: document.getElementById('strategy').value,
      min_dte: parseInt(document.getElementById('min_dte').value, 10),
      max_dte: parseInt(document.getElementById('max_dte').value, 10),
      min_otm: parseFloat(document.getElementById('min_otm').value),
      max_otm: parseFloat(document.getElementById('max_otm').value),
    };
    const response = await fetch('/api/screen', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(body),
    });
    const payload = await response.json();
    if (!response.ok) throw new Error(payload.error || response.statusText);
    render(payload, body.strategy);
  } catch (err) {
    error.textContent = err.message;
  } finally {
    go.disabled = false;
  }
});

function render(outcome, strategy) {
  const rows = outcome.opportunities;
  document.getElementById('t-ticker').textContent = outcome.ticker;
  document.getElementById('t-price').textContent = fmtUsd(outcome.spot);
  document.getElementById('t-strategy').textContent =
    strategy === 'cash_secured_put' ? 'CSP' : 'CC';
  document.getElementById('t-count').textContent = rows.length;
  document.getElementById('results').style.display = rows.length ? '' : 'none';
  document.getElementById('empty').style.display = rows.length ? 'none' : '';
  if (!rows.length) return;

  document.getElementById('rows').innerHTML = rows.map(r => `<tr>
    <td>${r.contract_symbol}</td><td>${r.dte}</td><td>${fmtUsd(r.strike)}</td>
    <td>${fmtUsd(r.premium)}</td><td>${r.risk_proxy.toFixed(3)}</td>
    <td>${r.volume ?? '-'}</td><td>${r.open_interest ?? '-'}</td>
    <td>${fmtPct(r.annualized_return)}</td></tr>`).join('');

  const top = rows.slice(0, 10);
  Plotly.newPlot('bar', [{
    type: 'bar', x: top.map(r => r.strike.toFixed(2)), y: top.map(r => r.annualized_return),
    marker: { color: '#0f3460' },
  }], { ...layout, title: 'Top 10 by annualized return', yaxis: { tickformat: '.1%' },
        xaxis: { title: 'Strike', type: 'category' } });

  Plotly.newPlot('hist', [{
    type: 'histogram', x: rows.map(r => r.dte), marker: { color: '#533483' },
  }], { ...layout, title: 'Days-to-expiration distribution', xaxis: { title: 'DTE' } });

  const sized = rows.filter(r => (r.volume ?? 0) > 0);
  Plotly.newPlot('scatter', [{
    type: 'scatter', mode: 'markers',
    x: sized.map(r => r.risk_proxy), y: sized.map(r => r.annualized_return),
    text: sized.map(r => r.contract_symbol),
    marker: {
      color: '#e94560',
      size: sized.map(r => Math.min(30, 4 + Math.sqrt(r.volume))),
    },
  }], { ...layout, title: 'Return vs risk (sized by volume)',
        xaxis: { title: 'Risk proxy' }, yaxis: { tickformat: '.1%' } });
}
</script>
</body>
</html>
"##;
