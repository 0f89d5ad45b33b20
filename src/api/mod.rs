use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    BreakEvenRent, Inputs, SimulationResult, Verdict, YearSummary, simulate,
    solve_break_even_rent, yearly_summary,
};

const MAX_LOAN_TERM_YEARS: u32 = 100;
const MAX_AMOUNT: f64 = 1e12;
const MAX_PERCENT: f64 = 1_000.0;

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("{flag} must be a finite number >= 0")]
    NotNonNegative { flag: &'static str },
    #[error("--loan-term-years must be between 1 and {max}")]
    LoanTermOutOfRange { max: u32 },
    #[error("{flag} must be <= {max}")]
    AboveLimit { flag: &'static str, max: f64 },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Args(#[from] clap::Error),
    #[error(transparent)]
    Input(#[from] InputError),
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "rentbuy",
    about = "Compare the cumulative cost of buying with a loan against renting"
)]
struct Cli {
    #[arg(
        long,
        allow_negative_numbers = true,
        default_value_t = 300_000.0,
        help = "Property value"
    )]
    property_value: f64,
    #[arg(
        long,
        allow_negative_numbers = true,
        default_value_t = 60_000.0,
        help = "Down payment paid up front"
    )]
    down_payment: f64,
    #[arg(
        long,
        allow_negative_numbers = true,
        default_value_t = 8.0,
        help = "Annual loan interest rate in percent, compounded monthly via the twelfth root"
    )]
    annual_interest_rate: f64,
    #[arg(long, default_value_t = 30, help = "Loan term in years")]
    loan_term_years: u32,
    #[arg(
        long,
        allow_negative_numbers = true,
        default_value_t = 1_500.0,
        help = "Starting monthly rent"
    )]
    monthly_rent: f64,
    #[arg(
        long,
        allow_negative_numbers = true,
        default_value_t = 5.0,
        help = "Annual rent increase in percent, applied at the start of each year"
    )]
    annual_rent_increase: f64,
    #[arg(
        long,
        allow_negative_numbers = true,
        default_value_t = 6.0,
        help = "Annual return in percent earned by the down payment if invested instead"
    )]
    investment_return: f64,
    #[arg(long, help = "Print a year-by-year table after the summary")]
    yearly: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    property_value: Option<f64>,
    down_payment: Option<f64>,
    annual_interest_rate: Option<f64>,
    loan_term_years: Option<u32>,
    monthly_rent: Option<f64>,
    annual_rent_increase: Option<f64>,
    investment_return: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    month_index: Vec<u32>,
    years: Vec<f64>,
    monthly_payment: f64,
    financed_amount: f64,
    total_interest_paid: f64,
    cumulative_ownership_cost: Vec<f64>,
    monthly_rent: Vec<f64>,
    cumulative_rent_cost: Vec<f64>,
    invested_down_payment_value: Vec<f64>,
    final_ownership_cost: f64,
    final_rent_cost: f64,
    difference: f64,
    verdict: Verdict,
    message: String,
    break_even: BreakEvenRent,
    yearly: Vec<YearSummary>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: &Cli) -> Result<Inputs, InputError> {
    if cli.loan_term_years == 0 || cli.loan_term_years > MAX_LOAN_TERM_YEARS {
        return Err(InputError::LoanTermOutOfRange {
            max: MAX_LOAN_TERM_YEARS,
        });
    }

    for (flag, value, max) in [
        ("--property-value", cli.property_value, MAX_AMOUNT),
        ("--down-payment", cli.down_payment, MAX_AMOUNT),
        ("--annual-interest-rate", cli.annual_interest_rate, MAX_PERCENT),
        ("--monthly-rent", cli.monthly_rent, MAX_AMOUNT),
        ("--annual-rent-increase", cli.annual_rent_increase, MAX_PERCENT),
        ("--investment-return", cli.investment_return, MAX_PERCENT),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(InputError::NotNonNegative { flag });
        }
        if value > max {
            return Err(InputError::AboveLimit { flag, max });
        }
    }

    if cli.down_payment > cli.property_value {
        warn!(
            property_value = cli.property_value,
            down_payment = cli.down_payment,
            "down payment exceeds property value; financed amount and payment will be negative"
        );
    }

    Ok(Inputs {
        property_value: cli.property_value,
        down_payment: cli.down_payment,
        annual_interest_rate: cli.annual_interest_rate / 100.0,
        loan_term_years: cli.loan_term_years,
        monthly_rent: cli.monthly_rent,
        annual_rent_increase: cli.annual_rent_increase / 100.0,
        annual_investment_return: cli.investment_return / 100.0,
    })
}

/// Parses command-line flags, runs one simulation and renders the text report.
pub fn run_cli<I, T>(args: I) -> Result<String, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;
    let inputs = build_inputs(&cli)?;
    let result = simulate(&inputs);
    info!(
        months = result.month_index.len(),
        monthly_payment = result.monthly_payment,
        difference = result.comparison.difference,
        "simulation complete"
    );
    Ok(render_report(&inputs, &result, cli.yearly))
}

fn app() -> Router {
    Router::new()
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "rent vs buy HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, app()).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(
    payload: Result<Query<SimulatePayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => simulate_handler_impl(payload).await,
        Err(rejection) => rejected_payload_response(&rejection.body_text()),
    }
}

async fn simulate_post_handler(
    payload: Result<Json<SimulatePayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => simulate_handler_impl(payload).await,
        Err(rejection) => rejected_payload_response(&rejection.body_text()),
    }
}

fn rejected_payload_response(reason: &str) -> Response {
    warn!(reason, "unreadable simulate payload");
    error_response(StatusCode::BAD_REQUEST, reason)
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    debug!(?payload, "simulate request");
    let inputs = match inputs_from_payload(payload) {
        Ok(inputs) => inputs,
        Err(err) => {
            warn!(error = %err, "rejected simulate request");
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };

    let result = simulate(&inputs);
    info!(
        months = result.month_index.len(),
        monthly_payment = result.monthly_payment,
        difference = result.comparison.difference,
        "simulation complete"
    );
    json_response(StatusCode::OK, build_simulate_response(&inputs, result))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn inputs_from_payload(payload: SimulatePayload) -> Result<Inputs, InputError> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.property_value {
        cli.property_value = v;
    }
    if let Some(v) = payload.down_payment {
        cli.down_payment = v;
    }
    if let Some(v) = payload.annual_interest_rate {
        cli.annual_interest_rate = v;
    }
    if let Some(v) = payload.loan_term_years {
        cli.loan_term_years = v;
    }
    if let Some(v) = payload.monthly_rent {
        cli.monthly_rent = v;
    }
    if let Some(v) = payload.annual_rent_increase {
        cli.annual_rent_increase = v;
    }
    if let Some(v) = payload.investment_return {
        cli.investment_return = v;
    }

    build_inputs(&cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        property_value: 300_000.0,
        down_payment: 60_000.0,
        annual_interest_rate: 8.0,
        loan_term_years: 30,
        monthly_rent: 1_500.0,
        annual_rent_increase: 5.0,
        investment_return: 6.0,
        yearly: false,
    }
}

fn build_simulate_response(inputs: &Inputs, result: SimulationResult) -> SimulateResponse {
    let financed_amount = inputs.financed_amount();
    let total_interest_paid =
        result.monthly_payment * result.month_index.len() as f64 - financed_amount;
    let yearly = yearly_summary(&result);
    let comparison = result.comparison;

    SimulateResponse {
        years: result.month_index.iter().map(|m| *m as f64 / 12.0).collect(),
        month_index: result.month_index,
        monthly_payment: result.monthly_payment,
        financed_amount,
        total_interest_paid,
        cumulative_ownership_cost: result.cumulative_ownership_cost,
        monthly_rent: result.monthly_rent,
        cumulative_rent_cost: result.cumulative_rent_cost,
        invested_down_payment_value: result.invested_down_payment_value,
        final_ownership_cost: comparison.final_ownership_cost,
        final_rent_cost: comparison.final_rent_cost,
        difference: comparison.difference,
        verdict: comparison.verdict,
        message: verdict_message(comparison.verdict),
        break_even: solve_break_even_rent(inputs),
        yearly,
    }
}

fn verdict_message(verdict: Verdict) -> String {
    match verdict {
        Verdict::Renting { savings } => format!(
            "Renting is financially favorable, saving {}",
            format_currency(savings)
        ),
        Verdict::Owning { savings } => format!(
            "Owning is financially favorable, saving {}",
            format_currency(savings)
        ),
    }
}

/// Two decimals with comma thousands separators, e.g. `1,234,567.89`.
fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let is_zero = whole.bytes().all(|b| b == b'0') && cents.bytes().all(|b| b == b'0');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };
    format!("{sign}{grouped}.{cents}")
}

fn render_report(inputs: &Inputs, result: &SimulationResult, yearly: bool) -> String {
    let comparison = &result.comparison;
    let break_even = solve_break_even_rent(inputs);
    let invested = result
        .invested_down_payment_value
        .last()
        .copied()
        .unwrap_or(inputs.down_payment);

    let mut out = String::new();
    let rows = [
        ("Monthly loan payment", result.monthly_payment),
        ("Total paid owning", comparison.final_ownership_cost),
        ("Total paid renting", comparison.final_rent_cost),
        ("Down payment if invested", invested),
        ("Break-even monthly rent", break_even.monthly_rent),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "{label:<26}{:>18}", format_currency(value));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", verdict_message(comparison.verdict));

    if yearly {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:>4} {:>14} {:>18} {:>18} {:>18}",
            "year", "rent/month", "owning total", "renting total", "invested"
        );
        for row in yearly_summary(result) {
            let _ = writeln!(
                out,
                "{:>4} {:>14} {:>18} {:>18} {:>18}",
                row.year,
                format_currency(row.monthly_rent),
                format_currency(row.cumulative_ownership_cost),
                format_currency(row.cumulative_rent_cost),
                format_currency(row.invested_down_payment_value),
            );
        }
    }

    out
}
