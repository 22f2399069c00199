// =============================================================================
// REST API Endpoints: Axum 0.8
// =============================================================================
//
// All endpoints live under `/api/v1/`. Reads are public; favorites mutations
// require the admin Bearer token via the `AuthBearer` extractor. Errors are
// JSON `{"error": "..."}` bodies; insight endpoints return text/plain.
//
// CORS is configured permissively for the dashboard front end.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::analysis::{chart, insight, metrics_table};
use crate::analysis::engine::rsi_series;
use crate::analysis::{compute_extended, compute_indicators, ExtendedMetrics, IndicatorSet, TickerSignals};
use crate::api::auth::AuthBearer;
use crate::app_state::AppState;
use crate::calculators::{self, DividendRecord};
use crate::favorites::FavoritesError;
use crate::market_data::{normalize_ticker, QuoteSource, SeriesLookup};
use crate::regime::{detect_regime, BollingerRegime, REGIME_UNAVAILABLE};
use crate::types::PriceSeries;

type SharedState<S> = State<Arc<AppState<S>>>;

// =============================================================================
// Router construction
// =============================================================================

pub fn router<S: QuoteSource>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health::<S>))
        // ── Tickers ─────────────────────────────────────────────────
        .route("/api/v1/tickers/{ticker}/indicators", get(indicators::<S>))
        .route("/api/v1/tickers/{ticker}/signals", get(signals::<S>))
        .route("/api/v1/tickers/{ticker}/insight", get(ticker_insight::<S>))
        .route("/api/v1/tickers/{ticker}/regime", get(regime::<S>))
        .route("/api/v1/tickers/{ticker}/rsi", get(rsi_history::<S>))
        // ── Favorites ───────────────────────────────────────────────
        .route("/api/v1/groups", get(list_groups::<S>).post(create_group::<S>))
        .route("/api/v1/groups/{group}", delete(delete_group::<S>))
        .route("/api/v1/groups/{group}/tickers", post(add_ticker::<S>))
        .route(
            "/api/v1/groups/{group}/tickers/{ticker}",
            delete(remove_ticker::<S>),
        )
        .route("/api/v1/groups/{group}/metrics", get(group_metrics::<S>))
        .route("/api/v1/groups/{group}/insights", get(group_insights::<S>))
        .route("/api/v1/groups/{group}/chart", get(group_chart::<S>))
        // ── Calculators ─────────────────────────────────────────────
        .route("/api/v1/calc/exchange", post(calc_exchange::<S>))
        .route("/api/v1/calc/max-shares", post(calc_max_shares::<S>))
        .route("/api/v1/calc/average-down", post(calc_average_down::<S>))
        .route("/api/v1/calc/dividends", post(calc_dividends::<S>))
        // ── Middleware & State ───────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

impl From<FavoritesError> for ApiError {
    fn from(err: FavoritesError) -> Self {
        let status = match &err {
            FavoritesError::UnknownGroup(_) | FavoritesError::UnknownTicker { .. } => {
                StatusCode::NOT_FOUND
            }
            FavoritesError::DuplicateGroup(_)
            | FavoritesError::DuplicateTicker { .. }
            | FavoritesError::GroupFull { .. } => StatusCode::CONFLICT,
            FavoritesError::EmptyGroupName
            | FavoritesError::EmptyTicker
            | FavoritesError::InvalidTicker(_) => StatusCode::BAD_REQUEST,
            FavoritesError::Storage(e) => {
                error!(error = %e, "favorites storage failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}

async fn ticker_series<S: QuoteSource>(
    state: &AppState<S>,
    ticker: &str,
) -> Result<PriceSeries, ApiError> {
    match state.provider.lookup(ticker).await {
        SeriesLookup::Ready(series) => Ok(series),
        SeriesLookup::Unavailable { reason } => Err(ApiError::not_found(format!(
            "no data for {}: {}",
            normalize_ticker(ticker),
            reason
        ))),
    }
}

async fn latest_close<S: QuoteSource>(state: &AppState<S>, ticker: &str) -> Result<f64, ApiError> {
    let series = ticker_series(state, ticker).await?;
    series
        .last()
        .map(|p| p.close)
        .ok_or_else(|| ApiError::not_found(format!("no price for {ticker}")))
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    today: NaiveDate,
    uptime_secs: u64,
    server_time: i64,
}

async fn health<S: QuoteSource>(State(state): SharedState<S>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        today: state.provider.today(),
        uptime_secs: state.uptime_secs(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Tickers
// =============================================================================

#[derive(Serialize)]
struct IndicatorsResponse {
    indicators: IndicatorSet,
    extended: ExtendedMetrics,
}

async fn indicators<S: QuoteSource>(
    State(state): SharedState<S>,
    Path(ticker): Path<String>,
) -> Result<Json<IndicatorsResponse>, ApiError> {
    let series = ticker_series(&state, &ticker).await?;
    let indicators = compute_indicators(&series)
        .ok_or_else(|| ApiError::not_found(format!("no data for {ticker}")))?;
    Ok(Json(IndicatorsResponse {
        indicators,
        extended: compute_extended(&series),
    }))
}

async fn signals<S: QuoteSource>(
    State(state): SharedState<S>,
    Path(ticker): Path<String>,
) -> Result<Json<TickerSignals>, ApiError> {
    let series = ticker_series(&state, &ticker).await?;
    let set = compute_indicators(&series)
        .ok_or_else(|| ApiError::not_found(format!("no data for {ticker}")))?;
    Ok(Json(TickerSignals::from_set(&set)))
}

async fn ticker_insight<S: QuoteSource>(
    State(state): SharedState<S>,
    Path(ticker): Path<String>,
) -> Result<String, ApiError> {
    let series = ticker_series(&state, &ticker).await?;
    insight::compose_insight(&series)
        .ok_or_else(|| ApiError::not_found(format!("no data for {ticker}")))
}

#[derive(Serialize)]
struct RegimeResponse {
    ticker: String,
    regime: Option<BollingerRegime>,
    description: String,
}

async fn regime<S: QuoteSource>(
    State(state): SharedState<S>,
    Path(ticker): Path<String>,
) -> Result<Json<RegimeResponse>, ApiError> {
    let series = ticker_series(&state, &ticker).await?;
    let regime = detect_regime(&series);
    let description = match &regime {
        Some(r) => r.to_string(),
        None => REGIME_UNAVAILABLE.to_string(),
    };
    Ok(Json(RegimeResponse {
        ticker: series.ticker().to_string(),
        regime,
        description,
    }))
}

#[derive(Serialize)]
struct RsiPoint {
    date: NaiveDate,
    rsi: Option<f64>,
}

async fn rsi_history<S: QuoteSource>(
    State(state): SharedState<S>,
    Path(ticker): Path<String>,
) -> Result<Json<Vec<RsiPoint>>, ApiError> {
    let series = ticker_series(&state, &ticker).await?;
    let points = series
        .points()
        .iter()
        .zip(rsi_series(&series))
        .map(|(p, rsi)| RsiPoint { date: p.date, rsi })
        .collect();
    Ok(Json(points))
}

// =============================================================================
// Favorites
// =============================================================================

#[derive(Deserialize)]
struct GroupRequest {
    name: String,
}

#[derive(Deserialize)]
struct TickerRequest {
    ticker: String,
}

async fn list_groups<S: QuoteSource>(State(state): SharedState<S>) -> impl IntoResponse {
    Json(state.favorites.load())
}

async fn create_group<S: QuoteSource>(
    _auth: AuthBearer,
    State(state): SharedState<S>,
    Json(req): Json<GroupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let favorites = state.favorites.add_group(&req.name)?;
    info!(group = %req.name.trim(), "group created");
    Ok((StatusCode::CREATED, Json(favorites)))
}

async fn delete_group<S: QuoteSource>(
    _auth: AuthBearer,
    State(state): SharedState<S>,
    Path(group): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let favorites = state.favorites.remove_group(&group)?;
    info!(group = %group, "group deleted");
    Ok(Json(favorites))
}

async fn add_ticker<S: QuoteSource>(
    _auth: AuthBearer,
    State(state): SharedState<S>,
    Path(group): Path<String>,
    Json(req): Json<TickerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let favorites = state.favorites.add_ticker(&group, &req.ticker)?;
    info!(group = %group, ticker = %normalize_ticker(&req.ticker), "ticker added");
    Ok((StatusCode::CREATED, Json(favorites)))
}

async fn remove_ticker<S: QuoteSource>(
    _auth: AuthBearer,
    State(state): SharedState<S>,
    Path((group, ticker)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let favorites = state.favorites.remove_ticker(&group, &ticker)?;
    info!(group = %group, ticker = %ticker, "ticker removed");
    Ok(Json(favorites))
}

async fn group_metrics<S: QuoteSource>(
    State(state): SharedState<S>,
    Path(group): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let tickers = state.favorites.group(&group)?;
    let rows = metrics_table::group_metrics(&state.provider, &state.insight_log, &tickers).await;
    Ok(Json(rows))
}

async fn group_insights<S: QuoteSource>(
    State(state): SharedState<S>,
    Path(group): Path<String>,
) -> Result<String, ApiError> {
    let tickers = state.favorites.group(&group)?;
    Ok(insight::group_insights(&state.provider, &tickers).await)
}

#[derive(Deserialize)]
struct ChartQuery {
    days: Option<usize>,
}

#[derive(Serialize)]
struct ChartResponse {
    days: usize,
    lines: Vec<chart::ChartLine>,
}

async fn group_chart<S: QuoteSource>(
    State(state): SharedState<S>,
    Path(group): Path<String>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ChartResponse>, ApiError> {
    let days = query.days.unwrap_or(chart::DEFAULT_CHART_PERIOD);
    if !chart::CHART_PERIODS.contains(&days) {
        return Err(ApiError::bad_request(format!(
            "days must be one of {:?}",
            chart::CHART_PERIODS
        )));
    }
    let tickers = state.favorites.group(&group)?;
    let lines = chart::group_chart(&state.provider, &tickers, days).await;
    Ok(Json(ChartResponse { days, lines }))
}

// =============================================================================
// Calculators
// =============================================================================

#[derive(Deserialize)]
struct ExchangeRequest {
    ticker: String,
    shares: u64,
    /// USD/KRW override; the configured FX symbol's last close otherwise.
    #[serde(default)]
    rate: Option<f64>,
}

async fn calc_exchange<S: QuoteSource>(
    State(state): SharedState<S>,
    Json(req): Json<ExchangeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let price = latest_close(&state, &req.ticker).await?;
    let rate = match req.rate {
        Some(rate) => rate,
        None => latest_close(&state, &state.config.fx_ticker).await?,
    };
    let quote = calculators::exchange_amount(price, req.shares, rate)
        .ok_or_else(|| ApiError::unprocessable("price and rate must be positive"))?;
    Ok(Json(quote))
}

#[derive(Deserialize)]
struct MaxSharesRequest {
    ticker: String,
    cash: f64,
}

#[derive(Serialize)]
struct MaxSharesResponse {
    price: f64,
    #[serde(flatten)]
    result: calculators::MaxShares,
}

async fn calc_max_shares<S: QuoteSource>(
    State(state): SharedState<S>,
    Json(req): Json<MaxSharesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let price = latest_close(&state, &req.ticker).await?;
    let result = calculators::max_shares(req.cash, price)
        .ok_or_else(|| ApiError::unprocessable("cash must be non-negative"))?;
    Ok(Json(MaxSharesResponse { price, result }))
}

#[derive(Deserialize)]
struct AverageDownRequest {
    ticker: String,
    average_price: f64,
    quantity: u64,
    add_quantity: u64,
}

#[derive(Serialize)]
struct AverageDownResponse {
    price: f64,
    new_average: f64,
}

async fn calc_average_down<S: QuoteSource>(
    State(state): SharedState<S>,
    Json(req): Json<AverageDownRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let price = latest_close(&state, &req.ticker).await?;
    let new_average =
        calculators::average_down(req.average_price, req.quantity, price, req.add_quantity)
            .ok_or_else(|| ApiError::unprocessable("total quantity must be positive"))?;
    Ok(Json(AverageDownResponse { price, new_average }))
}

#[derive(Deserialize)]
struct DividendsRequest {
    ticker: String,
    dividends: Vec<DividendRecord>,
    #[serde(default)]
    average_price: Option<f64>,
}

async fn calc_dividends<S: QuoteSource>(
    State(state): SharedState<S>,
    Json(req): Json<DividendsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let series = ticker_series(&state, &req.ticker).await?;
    let summary = calculators::dividend_summary(
        &req.dividends,
        &series,
        state.provider.today(),
        req.average_price,
    );
    Ok(Json(summary))
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::engine::tests::uptrend_with_drop;
    use crate::config::AppConfig;
    use crate::market_data::provider::tests::FakeSource;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use tower::ServiceExt;

    const TOKEN: &str = "s3cret";

    fn app(source: FakeSource) -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.data_dir = dir.path().to_path_buf();
        config.as_of = NaiveDate::from_ymd_opt(2024, 5, 10);
        let state = AppState::new(config, source, Some(TOKEN.to_string()));
        (router(Arc::new(state)), dir)
    }

    fn default_source() -> FakeSource {
        FakeSource::default()
            .with("SPY", &uptrend_with_drop(260, 249))
            .with("TINY", &[10.0, 11.0, 12.0])
            .with("KRW=X", &[1381.4])
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, String) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: Method, uri: &str, body: serde_json::Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn authed(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
            .body(Body::empty())
            .unwrap()
    }

    fn parse(body: &str) -> serde_json::Value {
        serde_json::from_str(body).unwrap()
    }

    #[tokio::test]
    async fn health_reports_pinned_date() {
        let (app, _dir) = app(default_source());
        let (status, body) = send(&app, get("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        let json = parse(&body);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["today"], "2024-05-10");
    }

    #[tokio::test]
    async fn indicators_for_known_ticker() {
        let (app, _dir) = app(default_source());
        let (status, body) = send(&app, get("/api/v1/tickers/spy/indicators")).await;
        assert_eq!(status, StatusCode::OK);
        let json = parse(&body);
        assert_eq!(json["indicators"]["ticker"], "SPY");
        assert!(json["indicators"]["gap_short"].as_f64().unwrap() <= -5.0);
        assert!(json["indicators"]["ma200"].is_number());
        assert!(json["extended"]["macd"]["line"].is_number());
    }

    #[tokio::test]
    async fn unknown_ticker_is_404_with_error_body() {
        let (app, _dir) = app(default_source());
        let (status, body) = send(&app, get("/api/v1/tickers/NOPE/indicators")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(parse(&body)["error"].as_str().unwrap().contains("NOPE"));
    }

    #[tokio::test]
    async fn signals_expose_both_gap_policies() {
        let (app, _dir) = app(default_source());
        let (status, body) = send(&app, get("/api/v1/tickers/SPY/signals")).await;
        assert_eq!(status, StatusCode::OK);
        let json = parse(&body);
        assert_eq!(json["gap_horizon_scaled"][0]["category"], "Buy");
        assert_eq!(json["gap_quick_cue"][0]["category"], "Sell");
        assert_eq!(json["gap_quick_cue"][0]["cue"], "blue");
        assert_eq!(json["oscillator_trade_action"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn insight_is_plain_text() {
        let (app, _dir) = app(default_source());
        let (status, body) = send(&app, get("/api/v1/tickers/SPY/insight")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("Ticker: SPY  Price: "));
        assert!(body.contains("[Gap signals] Short: Buy ("));
        assert!(body.contains("[Bollinger] "));
    }

    #[tokio::test]
    async fn regime_falls_back_on_short_history() {
        let (app, _dir) = app(default_source());
        let (status, body) = send(&app, get("/api/v1/tickers/TINY/regime")).await;
        assert_eq!(status, StatusCode::OK);
        let json = parse(&body);
        assert!(json["regime"].is_null());
        assert_eq!(json["description"], REGIME_UNAVAILABLE);

        let (_, body) = send(&app, get("/api/v1/tickers/SPY/regime")).await;
        assert_eq!(parse(&body)["regime"]["center"], "below");
    }

    #[tokio::test]
    async fn rsi_history_is_aligned_with_closes() {
        let (app, _dir) = app(default_source());
        let (status, body) = send(&app, get("/api/v1/tickers/SPY/rsi")).await;
        assert_eq!(status, StatusCode::OK);
        let json = parse(&body);
        let points = json.as_array().unwrap();
        assert_eq!(points.len(), 260);
        assert!(points[13]["rsi"].is_null());
        assert_eq!(points[14]["rsi"], 100.0);
        assert_eq!(points[0]["date"], "2023-01-02");
    }

    #[tokio::test]
    async fn group_mutations_require_token() {
        let (app, _dir) = app(default_source());
        let body = serde_json::json!({ "name": "Core" });

        let (status, _) = send(&app, json_request(Method::POST, "/api/v1/groups", body.clone(), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) =
            send(&app, json_request(Method::POST, "/api/v1/groups", body.clone(), Some("wrong"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) =
            send(&app, json_request(Method::POST, "/api/v1/groups", body, Some(TOKEN))).await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, listed) = send(&app, get("/api/v1/groups")).await;
        assert_eq!(parse(&listed), serde_json::json!({ "Core": [] }));
    }

    #[tokio::test]
    async fn group_workflow() {
        let (app, dir) = app(default_source());
        let new_group = serde_json::json!({ "name": "Core" });
        send(&app, json_request(Method::POST, "/api/v1/groups", new_group, Some(TOKEN))).await;

        for ticker in ["spy", "TINY", "GONE"] {
            let (status, _) = send(
                &app,
                json_request(
                    Method::POST,
                    "/api/v1/groups/Core/tickers",
                    serde_json::json!({ "ticker": ticker }),
                    Some(TOKEN),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, _) = send(
            &app,
            json_request(
                Method::POST,
                "/api/v1/groups/Core/tickers",
                serde_json::json!({ "ticker": "SPY" }),
                Some(TOKEN),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send(&app, get("/api/v1/groups/Core/metrics")).await;
        assert_eq!(status, StatusCode::OK);
        let rows = parse(&body);
        assert_eq!(rows.as_array().unwrap().len(), 2);
        assert_eq!(rows[0]["ticker"], "SPY");
        assert!(dir.path().join("stock_insight/SPY_20240510.csv").exists());

        let (_, text) = send(&app, get("/api/v1/groups/Core/insights")).await;
        let blocks: Vec<&str> = text.split("\n\n").collect();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], "Ticker: GONE  no data");
        assert!(blocks[1].starts_with("Ticker: SPY"));

        let (status, _) = send(&app, authed(Method::DELETE, "/api/v1/groups/Core/tickers/gone")).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, authed(Method::DELETE, "/api/v1/groups/Core")).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, get("/api/v1/groups/Core/metrics")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn chart_validates_period() {
        let (app, _dir) = app(default_source());
        let new_group = serde_json::json!({ "name": "G" });
        send(&app, json_request(Method::POST, "/api/v1/groups", new_group, Some(TOKEN))).await;
        for ticker in ["SPY", "TINY"] {
            send(
                &app,
                json_request(
                    Method::POST,
                    "/api/v1/groups/G/tickers",
                    serde_json::json!({ "ticker": ticker }),
                    Some(TOKEN),
                ),
            )
            .await;
        }

        let (status, _) = send(&app, get("/api/v1/groups/G/chart?days=45")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, get("/api/v1/groups/G/chart?days=30")).await;
        assert_eq!(status, StatusCode::OK);
        let json = parse(&body);
        let lines = json["lines"].as_array().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["points"].as_array().unwrap().len(), 30);
        assert_eq!(lines[0]["points"][0]["change"], 0.0);
    }

    #[tokio::test]
    async fn calculators_use_latest_close() {
        let (app, _dir) = app(default_source());

        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/api/v1/calc/exchange",
                serde_json::json!({ "ticker": "TINY", "shares": 10 }),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let json = parse(&body);
        assert_eq!(json["applied_rate"], 1390.0);
        assert_eq!(json["total_usd"], 120.0);

        let (_, body) = send(
            &app,
            json_request(
                Method::POST,
                "/api/v1/calc/max-shares",
                serde_json::json!({ "ticker": "TINY", "cash": 50.0 }),
                None,
            ),
        )
        .await;
        let json = parse(&body);
        assert_eq!(json["shares"], 4);
        assert_eq!(json["price"], 12.0);

        let (status, _) = send(
            &app,
            json_request(
                Method::POST,
                "/api/v1/calc/average-down",
                serde_json::json!({ "ticker": "TINY", "average_price": 0.0, "quantity": 0, "add_quantity": 0 }),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/api/v1/calc/dividends",
                serde_json::json!({
                    "ticker": "TINY",
                    "dividends": [{ "ex_date": "2024-03-01", "cash_amount": 0.6 }],
                    "average_price": 6.0
                }),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let json = parse(&body);
        assert!((json["ttm_yield_pct"].as_f64().unwrap() - 5.0).abs() < 1e-9);
        assert!((json["yield_on_cost_pct"].as_f64().unwrap() - 10.0).abs() < 1e-9);
    }
}
