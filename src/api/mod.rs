use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    FilingProfile, FilingStatus, OneTimeExpense, RothConversion, SimulationInputs,
    SimulationResult, SpouseProfile, bracket_ceiling, project,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliFilingStatus {
    Single,
    MarriedJoint,
    MarriedSeparate,
    HeadOfHousehold,
}

impl From<CliFilingStatus> for FilingStatus {
    fn from(value: CliFilingStatus) -> Self {
        match value {
            CliFilingStatus::Single => FilingStatus::Single,
            CliFilingStatus::MarriedJoint => FilingStatus::MarriedJoint,
            CliFilingStatus::MarriedSeparate => FilingStatus::MarriedSeparate,
            CliFilingStatus::HeadOfHousehold => FilingStatus::HeadOfHousehold,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliRothStrategy {
    None,
    FillBracket,
    FixedAmount,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiFilingStatus {
    Single,
    #[serde(alias = "marriedJoint", alias = "married_joint")]
    MarriedJoint,
    #[serde(alias = "marriedSeparate", alias = "married_separate")]
    MarriedSeparate,
    #[serde(alias = "headOfHousehold", alias = "head_of_household")]
    HeadOfHousehold,
}

impl From<ApiFilingStatus> for CliFilingStatus {
    fn from(value: ApiFilingStatus) -> Self {
        match value {
            ApiFilingStatus::Single => CliFilingStatus::Single,
            ApiFilingStatus::MarriedJoint => CliFilingStatus::MarriedJoint,
            ApiFilingStatus::MarriedSeparate => CliFilingStatus::MarriedSeparate,
            ApiFilingStatus::HeadOfHousehold => CliFilingStatus::HeadOfHousehold,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiRothStrategy {
    None,
    #[serde(alias = "fillBracket", alias = "fill_bracket")]
    FillBracket,
    #[serde(alias = "fixedAmount", alias = "fixed_amount")]
    FixedAmount,
}

impl From<ApiRothStrategy> for CliRothStrategy {
    fn from(value: ApiRothStrategy) -> Self {
        match value {
            ApiRothStrategy::None => CliRothStrategy::None,
            ApiRothStrategy::FillBracket => CliRothStrategy::FillBracket,
            ApiRothStrategy::FixedAmount => CliRothStrategy::FixedAmount,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayloadOneTimeExpense {
    year: i32,
    amount: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    life_expectancy: Option<u32>,
    plan_start_year: Option<i32>,
    filing_status: Option<ApiFilingStatus>,
    #[serde(alias = "state")]
    state_of_residence: Option<String>,

    current_salary: Option<f64>,
    salary_growth_rate: Option<f64>,
    taxable_start: Option<f64>,
    deferred_start: Option<f64>,
    roth_start: Option<f64>,
    ss_start_age: Option<u32>,
    ss_monthly_amount: Option<f64>,
    pension_monthly_amount: Option<f64>,
    pension_cola: Option<bool>,
    passive_income: Option<f64>,

    taxable_contribution: Option<f64>,
    deferred_contribution: Option<f64>,
    roth_contribution: Option<f64>,
    employer_match_rate: Option<f64>,
    savings_escalator: Option<f64>,
    contribution_stop_age: Option<u32>,

    current_expenses: Option<f64>,
    retirement_ratio: Option<f64>,
    general_inflation: Option<f64>,
    medical_inflation: Option<f64>,
    pre_retirement_return: Option<f64>,
    post_retirement_return: Option<f64>,
    one_time_expenses: Option<Vec<PayloadOneTimeExpense>>,

    roth_conversion: Option<ApiRothStrategy>,
    conversion_target_rate: Option<f64>,
    conversion_amount: Option<f64>,
    rmd_reinvestment: Option<bool>,
    legacy_goal: Option<f64>,

    spouse_current_age: Option<u32>,
    spouse_retirement_age: Option<u32>,
    spouse_salary: Option<f64>,
    spouse_salary_growth_rate: Option<f64>,
    spouse_ss_start_age: Option<u32>,
    spouse_ss_monthly_amount: Option<f64>,
    spouse_pension_monthly_amount: Option<f64>,
    spouse_pension_cola: Option<bool>,
}

fn parse_one_time_expense(raw: &str) -> Result<OneTimeExpense, String> {
    let (year, amount) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected YEAR:AMOUNT, got '{raw}'"))?;
    let year = year
        .trim()
        .parse::<i32>()
        .map_err(|_| format!("invalid year in '{raw}'"))?;
    let amount = amount
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid amount in '{raw}'"))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(format!("amount must be >= 0 in '{raw}'"));
    }
    Ok(OneTimeExpense { year, amount })
}

#[derive(Parser, Debug)]
#[command(
    name = "glidepath",
    about = "Deterministic household retirement projection (taxes + RMDs + Roth conversions)"
)]
struct Cli {
    #[arg(long)]
    current_age: u32,
    #[arg(long)]
    retirement_age: u32,
    #[arg(long)]
    life_expectancy: u32,
    #[arg(long, default_value_t = 2025)]
    plan_start_year: i32,
    #[arg(long, value_enum, default_value_t = CliFilingStatus::Single)]
    filing_status: CliFilingStatus,
    #[arg(
        long,
        default_value = "CA",
        help = "Two-letter state code; unlisted states use a flat default rate"
    )]
    state: String,

    #[arg(long)]
    current_salary: f64,
    #[arg(long, default_value_t = 3.0, help = "Annual salary growth in percent")]
    salary_growth_rate: f64,
    #[arg(long, default_value_t = 0.0)]
    taxable_start: f64,
    #[arg(long, default_value_t = 0.0)]
    deferred_start: f64,
    #[arg(long, default_value_t = 0.0)]
    roth_start: f64,
    #[arg(long, default_value_t = 67, help = "Social Security claiming age")]
    ss_start_age: u32,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Monthly benefit at full retirement age"
    )]
    ss_monthly_amount: f64,
    #[arg(long, default_value_t = 0.0)]
    pension_monthly_amount: f64,
    #[arg(long, default_value_t = false, help = "Inflation-adjust the pension")]
    pension_cola: bool,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Annual passive income (rent, royalties)"
    )]
    passive_income: f64,

    #[arg(long, default_value_t = 0.0, help = "Annual taxable contribution cap")]
    taxable_contribution: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Annual tax-deferred contribution cap"
    )]
    deferred_contribution: f64,
    #[arg(long, default_value_t = 0.0, help = "Annual Roth contribution cap")]
    roth_contribution: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Employer match as percent of work income"
    )]
    employer_match_rate: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Annual growth of all contribution caps in percent"
    )]
    savings_escalator: f64,
    #[arg(long, help = "Age when contributions stop; defaults to retirement age")]
    contribution_stop_age: Option<u32>,

    #[arg(long)]
    current_expenses: f64,
    #[arg(
        long,
        default_value_t = 80.0,
        help = "Retirement spending as percent of working-life spending"
    )]
    retirement_ratio: f64,
    #[arg(long, default_value_t = 2.5, help = "General inflation in percent")]
    general_inflation: f64,
    #[arg(long, default_value_t = 5.0, help = "Medical inflation in percent")]
    medical_inflation: f64,
    #[arg(long, default_value_t = 7.0, help = "Pre-retirement return in percent")]
    pre_retirement_return: f64,
    #[arg(long, default_value_t = 5.0, help = "Post-retirement return in percent")]
    post_retirement_return: f64,
    #[arg(
        long = "one-time-expense",
        value_parser = parse_one_time_expense,
        help = "Lump expense as YEAR:AMOUNT; repeatable"
    )]
    one_time_expense: Vec<OneTimeExpense>,

    #[arg(long, value_enum, default_value_t = CliRothStrategy::None)]
    roth_conversion: CliRothStrategy,
    #[arg(
        long,
        default_value_t = 22.0,
        help = "Target marginal bracket for fill-bracket conversions, in percent"
    )]
    conversion_target_rate: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Annual amount for fixed-amount conversions"
    )]
    conversion_amount: f64,
    #[arg(
        long,
        default_value_t = false,
        help = "Reinvest the after-tax share of RMDs into the taxable account"
    )]
    rmd_reinvestment: bool,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Target estate value at end of plan"
    )]
    legacy_goal: f64,

    #[arg(long, help = "Required when --filing-status=married-joint")]
    spouse_current_age: Option<u32>,
    #[arg(long, help = "Required when --filing-status=married-joint")]
    spouse_retirement_age: Option<u32>,
    #[arg(long, default_value_t = 0.0)]
    spouse_salary: f64,
    #[arg(long, default_value_t = 0.0, help = "Spouse salary growth in percent")]
    spouse_salary_growth_rate: f64,
    #[arg(long, default_value_t = 67)]
    spouse_ss_start_age: u32,
    #[arg(long, default_value_t = 0.0)]
    spouse_ss_monthly_amount: f64,
    #[arg(long, default_value_t = 0.0)]
    spouse_pension_monthly_amount: f64,
    #[arg(long, default_value_t = false)]
    spouse_pension_cola: bool,
}

#[derive(Debug, Deserialize)]
struct ComparePayload {
    baseline: SimulatePayload,
    variant: SimulatePayload,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct YearDelta {
    year: i32,
    total_portfolio_delta: f64,
    total_tax_delta: f64,
    total_expenses_delta: f64,
    unfunded_need_delta: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareResponse {
    baseline: SimulationResult,
    variant: SimulationResult,
    success_probability_delta: f64,
    total_legacy_delta: f64,
    financial_independence_age_delta: i64,
    year_deltas: Vec<YearDelta>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: Cli) -> Result<SimulationInputs, String> {
    if cli.life_expectancy < cli.current_age {
        return Err("--life-expectancy must be >= --current-age".to_string());
    }

    for (name, value) in [
        ("--current-salary", cli.current_salary),
        ("--current-expenses", cli.current_expenses),
        ("--taxable-start", cli.taxable_start),
        ("--deferred-start", cli.deferred_start),
        ("--roth-start", cli.roth_start),
        ("--ss-monthly-amount", cli.ss_monthly_amount),
        ("--pension-monthly-amount", cli.pension_monthly_amount),
        ("--passive-income", cli.passive_income),
        ("--taxable-contribution", cli.taxable_contribution),
        ("--deferred-contribution", cli.deferred_contribution),
        ("--roth-contribution", cli.roth_contribution),
        ("--conversion-amount", cli.conversion_amount),
        ("--legacy-goal", cli.legacy_goal),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }

    if !(0.0..=100.0).contains(&cli.employer_match_rate) {
        return Err("--employer-match-rate must be between 0 and 100".to_string());
    }

    if !(0.0..=300.0).contains(&cli.retirement_ratio) {
        return Err("--retirement-ratio must be between 0 and 300".to_string());
    }

    for (name, rate) in [
        ("--salary-growth-rate", cli.salary_growth_rate),
        ("--savings-escalator", cli.savings_escalator),
        ("--general-inflation", cli.general_inflation),
        ("--medical-inflation", cli.medical_inflation),
        ("--pre-retirement-return", cli.pre_retirement_return),
        ("--post-retirement-return", cli.post_retirement_return),
        ("--spouse-salary-growth-rate", cli.spouse_salary_growth_rate),
    ] {
        if !rate.is_finite() || rate <= -100.0 {
            return Err(format!("{name} must be > -100"));
        }
    }

    if !(62..=70).contains(&cli.ss_start_age) {
        return Err("--ss-start-age must be between 62 and 70".to_string());
    }

    let filing_status: FilingStatus = cli.filing_status.into();
    let filing = if filing_status == FilingStatus::MarriedJoint {
        let Some(spouse_current_age) = cli.spouse_current_age else {
            return Err(
                "--spouse-current-age is required when --filing-status=married-joint".to_string(),
            );
        };
        let Some(spouse_retirement_age) = cli.spouse_retirement_age else {
            return Err(
                "--spouse-retirement-age is required when --filing-status=married-joint"
                    .to_string(),
            );
        };
        if !(62..=70).contains(&cli.spouse_ss_start_age) {
            return Err("--spouse-ss-start-age must be between 62 and 70".to_string());
        }
        for (name, value) in [
            ("--spouse-salary", cli.spouse_salary),
            ("--spouse-ss-monthly-amount", cli.spouse_ss_monthly_amount),
            (
                "--spouse-pension-monthly-amount",
                cli.spouse_pension_monthly_amount,
            ),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be >= 0"));
            }
        }
        FilingProfile::MarriedJoint {
            spouse: SpouseProfile {
                current_age: spouse_current_age,
                retirement_age: spouse_retirement_age,
                current_salary: cli.spouse_salary,
                salary_growth_rate: cli.spouse_salary_growth_rate / 100.0,
                ss_start_age: cli.spouse_ss_start_age,
                ss_monthly_amount: cli.spouse_ss_monthly_amount,
                pension_monthly_amount: cli.spouse_pension_monthly_amount,
                pension_cola: cli.spouse_pension_cola,
            },
        }
    } else {
        if cli.spouse_current_age.is_some() || cli.spouse_retirement_age.is_some() {
            return Err("spouse arguments require --filing-status=married-joint".to_string());
        }
        match filing_status {
            FilingStatus::Single => FilingProfile::Single,
            FilingStatus::MarriedSeparate => FilingProfile::MarriedSeparate,
            FilingStatus::HeadOfHousehold => FilingProfile::HeadOfHousehold,
            FilingStatus::MarriedJoint => unreachable!("handled above"),
        }
    };

    let roth_conversion = match cli.roth_conversion {
        CliRothStrategy::None => RothConversion::None,
        CliRothStrategy::FillBracket => {
            let target_rate = cli.conversion_target_rate / 100.0;
            if bracket_ceiling(filing_status, target_rate).is_none() {
                return Err(
                    "--conversion-target-rate must name a bounded federal bracket".to_string()
                );
            }
            RothConversion::FillBracket { target_rate }
        }
        CliRothStrategy::FixedAmount => RothConversion::FixedAmount {
            amount: cli.conversion_amount,
        },
    };

    Ok(SimulationInputs {
        current_age: cli.current_age,
        retirement_age: cli.retirement_age,
        life_expectancy: cli.life_expectancy,
        plan_start_year: cli.plan_start_year,
        filing,
        state_of_residence: cli.state,
        current_salary: cli.current_salary,
        salary_growth_rate: cli.salary_growth_rate / 100.0,
        taxable_start: cli.taxable_start,
        deferred_start: cli.deferred_start,
        roth_start: cli.roth_start,
        ss_start_age: cli.ss_start_age,
        ss_monthly_amount: cli.ss_monthly_amount,
        pension_monthly_amount: cli.pension_monthly_amount,
        pension_cola: cli.pension_cola,
        passive_income: cli.passive_income,
        taxable_contribution: cli.taxable_contribution,
        deferred_contribution: cli.deferred_contribution,
        roth_contribution: cli.roth_contribution,
        employer_match_rate: cli.employer_match_rate / 100.0,
        savings_escalator: cli.savings_escalator / 100.0,
        contribution_stop_age: cli.contribution_stop_age.unwrap_or(cli.retirement_age),
        current_expenses: cli.current_expenses,
        retirement_ratio: cli.retirement_ratio / 100.0,
        general_inflation: cli.general_inflation / 100.0,
        medical_inflation: cli.medical_inflation / 100.0,
        pre_retirement_return: cli.pre_retirement_return / 100.0,
        post_retirement_return: cli.post_retirement_return / 100.0,
        one_time_expenses: cli.one_time_expense,
        roth_conversion,
        rmd_reinvestment: cli.rmd_reinvestment,
        legacy_goal: cli.legacy_goal,
    })
}

/// One-shot mode: parse the full CLI, validate, project, and return the
/// result as pretty JSON.
pub fn run_cli_projection() -> Result<String, String> {
    let cli = Cli::parse();
    let inputs = build_inputs(cli)?;
    let result = project(&inputs);
    serde_json::to_string_pretty(&result).map_err(|e| e.to_string())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route("/api/compare", post(compare_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("glidepath HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/api/project");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    project_handler_impl(payload)
}

async fn project_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    project_handler_impl(payload)
}

fn project_handler_impl(payload: SimulatePayload) -> Response {
    match inputs_from_payload(payload) {
        Ok(inputs) => json_response(StatusCode::OK, project(&inputs)),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn compare_handler(Json(payload): Json<ComparePayload>) -> Response {
    let baseline = match inputs_from_payload(payload.baseline) {
        Ok(inputs) => inputs,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &format!("baseline: {msg}")),
    };
    let variant = match inputs_from_payload(payload.variant) {
        Ok(inputs) => inputs,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &format!("variant: {msg}")),
    };

    json_response(
        StatusCode::OK,
        build_compare_response(project(&baseline), project(&variant)),
    )
}

fn build_compare_response(
    baseline: SimulationResult,
    variant: SimulationResult,
) -> CompareResponse {
    // Deltas cover the overlapping horizon; differing life expectancies
    // simply truncate the comparison.
    let year_deltas = baseline
        .years
        .iter()
        .zip(variant.years.iter())
        .map(|(b, v)| YearDelta {
            year: b.year,
            total_portfolio_delta: v.total_portfolio - b.total_portfolio,
            total_tax_delta: v.total_tax - b.total_tax,
            total_expenses_delta: v.total_expenses - b.total_expenses,
            unfunded_need_delta: v.unfunded_need - b.unfunded_need,
        })
        .collect();

    CompareResponse {
        success_probability_delta: variant.success_probability - baseline.success_probability,
        total_legacy_delta: variant.total_legacy - baseline.total_legacy,
        financial_independence_age_delta: variant.financial_independence_age as i64
            - baseline.financial_independence_age as i64,
        year_deltas,
        baseline,
        variant,
    }
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
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn inputs_from_json(json: &str) -> Result<SimulationInputs, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    inputs_from_payload(payload)
}

fn inputs_from_payload(payload: SimulatePayload) -> Result<SimulationInputs, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.current_age {
        cli.current_age = v;
    }
    if let Some(v) = payload.retirement_age {
        cli.retirement_age = v;
    }
    if let Some(v) = payload.life_expectancy {
        cli.life_expectancy = v;
    }
    if let Some(v) = payload.plan_start_year {
        cli.plan_start_year = v;
    }
    if let Some(v) = payload.filing_status {
        cli.filing_status = v.into();
    }
    if let Some(v) = payload.state_of_residence {
        cli.state = v;
    }

    if let Some(v) = payload.current_salary {
        cli.current_salary = v;
    }
    if let Some(v) = payload.salary_growth_rate {
        cli.salary_growth_rate = v;
    }
    if let Some(v) = payload.taxable_start {
        cli.taxable_start = v;
    }
    if let Some(v) = payload.deferred_start {
        cli.deferred_start = v;
    }
    if let Some(v) = payload.roth_start {
        cli.roth_start = v;
    }
    if let Some(v) = payload.ss_start_age {
        cli.ss_start_age = v;
    }
    if let Some(v) = payload.ss_monthly_amount {
        cli.ss_monthly_amount = v;
    }
    if let Some(v) = payload.pension_monthly_amount {
        cli.pension_monthly_amount = v;
    }
    if let Some(v) = payload.pension_cola {
        cli.pension_cola = v;
    }
    if let Some(v) = payload.passive_income {
        cli.passive_income = v;
    }

    if let Some(v) = payload.taxable_contribution {
        cli.taxable_contribution = v;
    }
    if let Some(v) = payload.deferred_contribution {
        cli.deferred_contribution = v;
    }
    if let Some(v) = payload.roth_contribution {
        cli.roth_contribution = v;
    }
    if let Some(v) = payload.employer_match_rate {
        cli.employer_match_rate = v;
    }
    if let Some(v) = payload.savings_escalator {
        cli.savings_escalator = v;
    }
    if let Some(v) = payload.contribution_stop_age {
        cli.contribution_stop_age = Some(v);
    }

    if let Some(v) = payload.current_expenses {
        cli.current_expenses = v;
    }
    if let Some(v) = payload.retirement_ratio {
        cli.retirement_ratio = v;
    }
    if let Some(v) = payload.general_inflation {
        cli.general_inflation = v;
    }
    if let Some(v) = payload.medical_inflation {
        cli.medical_inflation = v;
    }
    if let Some(v) = payload.pre_retirement_return {
        cli.pre_retirement_return = v;
    }
    if let Some(v) = payload.post_retirement_return {
        cli.post_retirement_return = v;
    }
    if let Some(v) = payload.one_time_expenses {
        cli.one_time_expense = v
            .into_iter()
            .map(|e| OneTimeExpense {
                year: e.year,
                amount: e.amount,
            })
            .collect();
    }

    if let Some(v) = payload.roth_conversion {
        cli.roth_conversion = v.into();
    }
    if let Some(v) = payload.conversion_target_rate {
        cli.conversion_target_rate = v;
    }
    if let Some(v) = payload.conversion_amount {
        cli.conversion_amount = v;
    }
    if let Some(v) = payload.rmd_reinvestment {
        cli.rmd_reinvestment = v;
    }
    if let Some(v) = payload.legacy_goal {
        cli.legacy_goal = v;
    }

    if let Some(v) = payload.spouse_current_age {
        cli.spouse_current_age = Some(v);
    }
    if let Some(v) = payload.spouse_retirement_age {
        cli.spouse_retirement_age = Some(v);
    }
    if let Some(v) = payload.spouse_salary {
        cli.spouse_salary = v;
    }
    if let Some(v) = payload.spouse_salary_growth_rate {
        cli.spouse_salary_growth_rate = v;
    }
    if let Some(v) = payload.spouse_ss_start_age {
        cli.spouse_ss_start_age = v;
    }
    if let Some(v) = payload.spouse_ss_monthly_amount {
        cli.spouse_ss_monthly_amount = v;
    }
    if let Some(v) = payload.spouse_pension_monthly_amount {
        cli.spouse_pension_monthly_amount = v;
    }
    if let Some(v) = payload.spouse_pension_cola {
        cli.spouse_pension_cola = v;
    }

    build_inputs(cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        current_age: 35,
        retirement_age: 65,
        life_expectancy: 90,
        plan_start_year: 2025,
        filing_status: CliFilingStatus::Single,
        state: "CA".to_string(),
        current_salary: 100_000.0,
        salary_growth_rate: 3.0,
        taxable_start: 50_000.0,
        deferred_start: 200_000.0,
        roth_start: 50_000.0,
        ss_start_age: 67,
        ss_monthly_amount: 2_500.0,
        pension_monthly_amount: 0.0,
        pension_cola: false,
        passive_income: 0.0,
        taxable_contribution: 0.0,
        deferred_contribution: 0.0,
        roth_contribution: 0.0,
        employer_match_rate: 0.0,
        savings_escalator: 0.0,
        contribution_stop_age: None,
        current_expenses: 75_000.0,
        retirement_ratio: 80.0,
        general_inflation: 2.5,
        medical_inflation: 5.0,
        pre_retirement_return: 7.0,
        post_retirement_return: 5.0,
        one_time_expense: Vec::new(),
        roth_conversion: CliRothStrategy::None,
        conversion_target_rate: 22.0,
        conversion_amount: 0.0,
        rmd_reinvestment: false,
        legacy_goal: 0.0,
        spouse_current_age: None,
        spouse_retirement_age: None,
        spouse_salary: 0.0,
        spouse_salary_growth_rate: 0.0,
        spouse_ss_start_age: 67,
        spouse_ss_monthly_amount: 0.0,
        spouse_pension_monthly_amount: 0.0,
        spouse_pension_cola: false,
    }
}
