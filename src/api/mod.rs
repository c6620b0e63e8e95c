use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

use crate::core::{
    AnswerInsight, AnswerMap, Category, ExpenseAdjustments, ExpertAdvice, GoalSummary,
    GuideProfile, HORIZON_AGE, PlanInputs, SimulationInputs, SummaryMetrics, YearlyData,
    adjusted_monthly_expense, adjustment_tip, answer_insights, answer_number, build_advices,
    compound_savings_future_value, derive_plan_inputs, final_guide_comment, goal_summary,
    guide_profile, primary_advice, project, result_guide_comment, simulation_guide_comment,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

/// Hook-level defaults applied when a plan run does not specify them.
const PLAN_SAVINGS_RATE: f64 = 100.0;
const PLAN_INFLATION_RATE: f64 = 2.5;

const BASE_YEAR_MIN: i32 = 1900;
const BASE_YEAR_MAX: i32 = 2200;

/// One trillion KRW; keeps downstream whole-KRW arithmetic far from i64
/// overflow.
const MAX_CURRENCY_AMOUNT: i64 = 1_000_000_000_000;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    initial_net_worth: Option<i64>,
    monthly_income: Option<i64>,
    monthly_expense: Option<i64>,
    savings_rate: Option<f64>,
    investment_return_rate: Option<f64>,
    inflation_rate: Option<f64>,
    retirement_age: Option<u32>,
    current_age: Option<u32>,
    target_monthly_expense: Option<i64>,
    base_year: Option<i32>,

    coffee_cut: Option<i64>,
    delivery_cut: Option<i64>,
    subscription_cut: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    category_id: Option<String>,
    answers: Option<AnswerMap>,
    base_year: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CompoundQuery {
    daily_amount: Option<i64>,
    annual_rate: Option<f64>,
}

#[derive(Parser, Debug)]
#[command(
    name = "finpass",
    about = "Deterministic financial-wellness projection (compound net worth + 4% rule)"
)]
struct Cli {
    #[arg(long, default_value_t = 29, help = "Current age")]
    current_age: u32,
    #[arg(long, default_value_t = 50_000_000, help = "Current net worth in KRW")]
    initial_net_worth: i64,
    #[arg(long, default_value_t = 3_000_000, help = "After-tax monthly income in KRW")]
    monthly_income: i64,
    #[arg(long, default_value_t = 1_500_000, help = "Monthly spending in KRW")]
    monthly_expense: i64,
    #[arg(
        long,
        default_value_t = 100.0,
        help = "Share of (income - expense) invested, in percent"
    )]
    savings_rate: f64,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Expected annual investment return in percent"
    )]
    investment_return_rate: f64,
    #[arg(
        long,
        default_value_t = 2.5,
        help = "Assumed annual inflation in percent"
    )]
    inflation_rate: f64,
    #[arg(long, default_value_t = 60, help = "Target retirement age")]
    retirement_age: u32,
    #[arg(
        long,
        default_value_t = 2_000_000,
        help = "Desired post-retirement monthly spend in today's KRW"
    )]
    target_monthly_expense: i64,
    #[arg(
        long,
        help = "Calendar year of the first simulated record; defaults to the current year"
    )]
    base_year: Option<i32>,
}

#[derive(Debug)]
struct ApiRequest {
    inputs: SimulationInputs,
    adjustments: ExpenseAdjustments,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    inputs: SimulationInputs,
    total_adjustment: i64,
    adjustment_tip: String,
    data: Vec<YearlyData>,
    final_net_worth: i64,
    financial_independence_age: Option<u32>,
    summary: GoalSummary,
    advices: Vec<ExpertAdvice>,
    primary_advice: Option<ExpertAdvice>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanResponse {
    category_id: &'static str,
    guide: GuideProfile,
    plan_inputs: PlanInputs,
    insights: Vec<AnswerInsight>,
    result_comment: String,
    simulation_comment: String,
    final_comment: String,
    simulation: SimulateResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompoundResponse {
    daily_amount: i64,
    annual_rate: f64,
    ten_year: i64,
    twenty_year: i64,
    thirty_year: i64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn default_base_year() -> i32 {
    jiff::Zoned::now().year() as i32
}

fn build_inputs(cli: Cli) -> Result<SimulationInputs, String> {
    if cli.current_age > HORIZON_AGE {
        return Err(format!("--current-age must be <= {HORIZON_AGE}"));
    }

    for (name, amount) in [
        ("--initial-net-worth", cli.initial_net_worth),
        ("--monthly-income", cli.monthly_income),
        ("--monthly-expense", cli.monthly_expense),
        ("--target-monthly-expense", cli.target_monthly_expense),
    ] {
        if !(0..=MAX_CURRENCY_AMOUNT).contains(&amount) {
            return Err(format!(
                "{name} must be between 0 and {MAX_CURRENCY_AMOUNT}"
            ));
        }
    }

    if !(0.0..=100.0).contains(&cli.savings_rate) {
        return Err("--savings-rate must be between 0 and 100".to_string());
    }

    if !cli.investment_return_rate.is_finite() {
        return Err("--investment-return-rate must be finite".to_string());
    }

    if !cli.inflation_rate.is_finite() {
        return Err("--inflation-rate must be finite".to_string());
    }

    if let Some(year) = cli.base_year {
        if !(BASE_YEAR_MIN..=BASE_YEAR_MAX).contains(&year) {
            return Err(format!(
                "--base-year must be between {BASE_YEAR_MIN} and {BASE_YEAR_MAX}"
            ));
        }
    }

    Ok(SimulationInputs {
        initial_net_worth: cli.initial_net_worth,
        monthly_income: cli.monthly_income,
        monthly_expense: cli.monthly_expense,
        savings_rate: cli.savings_rate,
        investment_return_rate: cli.investment_return_rate,
        inflation_rate: cli.inflation_rate,
        retirement_age: cli.retirement_age,
        current_age: cli.current_age,
        target_monthly_expense: cli.target_monthly_expense,
        base_year: cli.base_year.unwrap_or_else(default_base_year),
    })
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route("/api/plan", post(plan_post_handler))
        .route("/api/compound", get(compound_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("finpass HTTP API listening on http://{addr}");
    info!("local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match simulate_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    json_response(
        StatusCode::OK,
        build_simulate_response(&request.inputs, request.adjustments),
    )
}

async fn plan_post_handler(Json(payload): Json<PlanPayload>) -> Response {
    match build_plan_response(payload) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn compound_handler(Query(query): Query<CompoundQuery>) -> Response {
    match build_compound_response(query) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    tracing::debug!("rejected request: {msg}");
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn simulate_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    simulate_request_from_payload(payload)
}

fn simulate_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.current_age {
        cli.current_age = v;
    }
    if let Some(v) = payload.initial_net_worth {
        cli.initial_net_worth = v;
    }
    if let Some(v) = payload.monthly_income {
        cli.monthly_income = v;
    }
    if let Some(v) = payload.monthly_expense {
        cli.monthly_expense = v;
    }
    if let Some(v) = payload.savings_rate {
        cli.savings_rate = v;
    }
    if let Some(v) = payload.investment_return_rate {
        cli.investment_return_rate = v;
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = v;
    }
    if let Some(v) = payload.retirement_age {
        cli.retirement_age = v;
    }
    if let Some(v) = payload.target_monthly_expense {
        cli.target_monthly_expense = v;
    }
    if let Some(v) = payload.base_year {
        cli.base_year = Some(v);
    }

    let adjustments = ExpenseAdjustments {
        coffee: payload.coffee_cut.unwrap_or(0),
        delivery: payload.delivery_cut.unwrap_or(0),
        subscription: payload.subscription_cut.unwrap_or(0),
    };
    for (name, cut) in [
        ("coffeeCut", adjustments.coffee),
        ("deliveryCut", adjustments.delivery),
        ("subscriptionCut", adjustments.subscription),
    ] {
        if cut < 0 {
            return Err(format!("{name} must be >= 0"));
        }
    }

    let mut inputs = build_inputs(cli)?;
    inputs.monthly_expense = adjusted_monthly_expense(inputs.monthly_expense, adjustments);

    Ok(ApiRequest {
        inputs,
        adjustments,
    })
}

fn default_cli_for_api() -> Cli {
    Cli {
        current_age: 29,
        initial_net_worth: 50_000_000,
        monthly_income: 3_000_000,
        monthly_expense: 1_500_000,
        savings_rate: 100.0,
        investment_return_rate: 7.0,
        inflation_rate: 2.5,
        retirement_age: 60,
        target_monthly_expense: 2_000_000,
        base_year: None,
    }
}

fn build_simulate_response(
    inputs: &SimulationInputs,
    adjustments: ExpenseAdjustments,
) -> SimulateResponse {
    let result = project(inputs);
    let summary = goal_summary(inputs);
    let advices = build_advices(inputs, result.financial_independence_age);
    let primary = primary_advice(&advices).cloned();

    SimulateResponse {
        inputs: inputs.clone(),
        total_adjustment: adjustments.clamped().total(),
        adjustment_tip: adjustment_tip(adjustments).to_string(),
        data: result.data,
        final_net_worth: result.final_net_worth,
        financial_independence_age: result.financial_independence_age,
        summary,
        advices,
        primary_advice: primary,
    }
}

fn build_plan_response(payload: PlanPayload) -> Result<PlanResponse, String> {
    let answers = payload.answers.unwrap_or_default();
    let category_id = payload.category_id.unwrap_or_default();
    let category = Category::from_id(&category_id).unwrap_or(Category::RealEstate);

    let base_year = match payload.base_year {
        Some(year) if !(BASE_YEAR_MIN..=BASE_YEAR_MAX).contains(&year) => {
            return Err(format!(
                "baseYear must be between {BASE_YEAR_MIN} and {BASE_YEAR_MAX}"
            ));
        }
        Some(year) => year,
        None => default_base_year(),
    };

    let plan = derive_plan_inputs(&category_id, &answers);
    let current_age = answer_number(&answers, "c2", 29.0).clamp(0.0, 120.0).round() as u32;

    let inputs = SimulationInputs {
        initial_net_worth: plan.initial_net_worth,
        monthly_income: plan.monthly_income,
        monthly_expense: plan.monthly_expense,
        savings_rate: PLAN_SAVINGS_RATE,
        investment_return_rate: plan.investment_return_rate,
        inflation_rate: PLAN_INFLATION_RATE,
        retirement_age: plan.retirement_age,
        current_age,
        target_monthly_expense: plan.target_monthly_expense,
        base_year,
    };
    let simulation = build_simulate_response(&inputs, ExpenseAdjustments::default());

    let metrics = SummaryMetrics {
        achievement_rate: simulation.summary.achievement_rate,
        fi_age: simulation.financial_independence_age,
        current_age,
        target_asset: simulation.summary.target_asset,
    };

    Ok(PlanResponse {
        category_id: category.as_id(),
        guide: guide_profile(category),
        plan_inputs: plan,
        insights: answer_insights(&answers, 6),
        result_comment: result_guide_comment(category, &answers),
        simulation_comment: simulation_guide_comment(category, &answers, &metrics),
        final_comment: final_guide_comment(category, &answers),
        simulation,
    })
}

fn build_compound_response(query: CompoundQuery) -> Result<CompoundResponse, String> {
    let daily_amount = query.daily_amount.unwrap_or(10_000);
    let annual_rate = query.annual_rate.unwrap_or(7.0);

    if daily_amount < 0 {
        return Err("dailyAmount must be >= 0".to_string());
    }
    if !(0.0..=100.0).contains(&annual_rate) {
        return Err("annualRate must be between 0 and 100".to_string());
    }

    let fv = |years| compound_savings_future_value(daily_amount, annual_rate, years).round() as i64;
    Ok(CompoundResponse {
        daily_amount,
        annual_rate,
        ten_year: fv(10),
        twenty_year: fv(20),
        thirty_year: fv(30),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_cli() -> Cli {
        default_cli_for_api()
    }

    #[test]
    fn build_inputs_accepts_the_defaults() {
        let inputs = build_inputs(sample_cli()).expect("valid inputs");
        assert_eq!(inputs.initial_net_worth, 50_000_000);
        assert_eq!(inputs.current_age, 29);
        assert!((BASE_YEAR_MIN..=BASE_YEAR_MAX).contains(&inputs.base_year));
    }

    #[test]
    fn build_inputs_rejects_negative_currency() {
        let mut cli = sample_cli();
        cli.monthly_expense = -1;
        let err = build_inputs(cli).expect_err("must reject negative expense");
        assert!(err.contains("--monthly-expense"));
    }

    #[test]
    fn build_inputs_rejects_out_of_range_savings_rate() {
        let mut cli = sample_cli();
        cli.savings_rate = 101.0;
        let err = build_inputs(cli).expect_err("must reject rate > 100");
        assert!(err.contains("--savings-rate"));
    }

    #[test]
    fn build_inputs_rejects_ages_past_the_horizon() {
        let mut cli = sample_cli();
        cli.current_age = 91;
        let err = build_inputs(cli).expect_err("must reject age > 90");
        assert!(err.contains("--current-age"));
    }

    #[test]
    fn build_inputs_rejects_absurd_base_years() {
        let mut cli = sample_cli();
        cli.base_year = Some(1600);
        let err = build_inputs(cli).expect_err("must reject out-of-range year");
        assert!(err.contains("--base-year"));
    }

    #[test]
    fn simulate_request_parses_web_keys_and_applies_cuts() {
        let json = r#"{
          "currentAge": 31,
          "initialNetWorth": 80000000,
          "monthlyIncome": 4000000,
          "monthlyExpense": 2000000,
          "investmentReturnRate": 6.5,
          "baseYear": 2025,
          "coffeeCut": 50000,
          "deliveryCut": 100000
        }"#;
        let request = simulate_request_from_json(json).expect("json should parse");
        let inputs = request.inputs;

        assert_eq!(inputs.current_age, 31);
        assert_eq!(inputs.initial_net_worth, 80_000_000);
        assert_eq!(inputs.monthly_income, 4_000_000);
        assert_eq!(inputs.monthly_expense, 1_850_000);
        assert_eq!(inputs.investment_return_rate, 6.5);
        assert_eq!(inputs.base_year, 2025);
        assert_eq!(request.adjustments.total(), 150_000);
    }

    #[test]
    fn simulate_request_caps_cuts_at_their_slider_maxima() {
        let json = r#"{ "monthlyExpense": 1500000, "coffeeCut": 999999 }"#;
        let request = simulate_request_from_json(json).expect("json should parse");
        assert_eq!(request.inputs.monthly_expense, 1_400_000);
    }

    #[test]
    fn simulate_request_rejects_negative_cuts() {
        let json = r#"{ "deliveryCut": -1 }"#;
        let err = simulate_request_from_json(json).expect_err("must reject negative cut");
        assert!(err.contains("deliveryCut"));
    }

    #[test]
    fn simulate_response_serialization_contains_expected_fields() {
        let json = r#"{ "baseYear": 2025 }"#;
        let request = simulate_request_from_json(json).expect("json should parse");
        let response = build_simulate_response(&request.inputs, request.adjustments);
        let body = serde_json::to_string(&response).expect("response should serialize");

        assert!(body.contains("\"finalNetWorth\""));
        assert!(body.contains("\"financialIndependenceAge\""));
        assert!(body.contains("\"achievementRate\""));
        assert!(body.contains("\"primaryAdvice\""));
        assert!(body.contains("\"isRetired\""));
        assert!(body.contains("\"adjustmentTip\""));
    }

    #[test]
    fn simulate_response_matches_the_reference_projection() {
        let json = r#"{ "baseYear": 2025 }"#;
        let request = simulate_request_from_json(json).expect("json should parse");
        let response = build_simulate_response(&request.inputs, request.adjustments);

        assert_eq!(response.final_net_worth, 28_869_361_885);
        assert_eq!(response.financial_independence_age, Some(46));
        assert_eq!(response.data.len(), 62);
        assert_eq!(response.summary.target_asset, 600_000_000);
        let primary = response.primary_advice.expect("advice expected");
        assert_eq!(primary.id, "good-savings");
    }

    #[test]
    fn plan_response_reflects_high_risk_stock_answers() {
        let payload = PlanPayload {
            category_id: Some("stock".to_string()),
            answers: Some(
                [
                    ("c2".to_string(), json!(30)),
                    ("s2".to_string(), json!("높음")),
                    ("s5".to_string(), json!("배당")),
                ]
                .into_iter()
                .collect(),
            ),
            base_year: Some(2025),
        };
        let response = build_plan_response(payload).expect("plan should build");

        assert_eq!(response.category_id, "stock");
        assert_eq!(response.guide.key, "choi");
        assert_eq!(response.plan_inputs.investment_return_rate, 10.0);
        assert_eq!(response.simulation.inputs.current_age, 30);
        assert_eq!(response.simulation.inputs.savings_rate, PLAN_SAVINGS_RATE);
        assert_eq!(response.simulation.financial_independence_age, Some(44));
        assert!(response.simulation_comment.starts_with("배당"));
        assert_eq!(response.insights.len(), 3);
    }

    #[test]
    fn plan_response_falls_back_to_real_estate() {
        let payload = PlanPayload {
            category_id: Some("crypto".to_string()),
            answers: None,
            base_year: Some(2025),
        };
        let response = build_plan_response(payload).expect("plan should build");
        assert_eq!(response.category_id, "real-estate");
        assert_eq!(response.guide.key, "han");
        assert_eq!(response.plan_inputs.initial_net_worth, 150_000_000);
        assert!(response.insights.is_empty());
    }

    #[test]
    fn plan_response_rejects_out_of_range_base_year() {
        let payload = PlanPayload {
            category_id: Some("stock".to_string()),
            answers: None,
            base_year: Some(9999),
        };
        let err = build_plan_response(payload).expect_err("must reject year");
        assert!(err.contains("baseYear"));
    }

    #[test]
    fn compound_defaults_match_the_savings_card() {
        let response = build_compound_response(CompoundQuery::default()).expect("valid query");
        assert_eq!(response.daily_amount, 10_000);
        assert_eq!(response.ten_year, 51_925_442);
        assert!(response.twenty_year > response.ten_year);
        assert!(response.thirty_year > response.twenty_year);
    }

    #[test]
    fn compound_zero_rate_is_the_plain_sum() {
        let query = CompoundQuery {
            daily_amount: Some(10_000),
            annual_rate: Some(0.0),
        };
        let response = build_compound_response(query).expect("valid query");
        assert_eq!(response.ten_year, 36_000_000);
        assert_eq!(response.thirty_year, 108_000_000);
    }

    #[test]
    fn compound_rejects_negative_amounts() {
        let query = CompoundQuery {
            daily_amount: Some(-5),
            annual_rate: None,
        };
        let err = build_compound_response(query).expect_err("must reject amount");
        assert!(err.contains("dailyAmount"));
    }
}
