use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FilingStatus {
    Single,
    MarriedJoint,
    MarriedSeparate,
    HeadOfHousehold,
}

/// Filing profile for the household. A joint return carries the spouse
/// record; every other status files without one, so spouse fields simply
/// do not exist for those variants.
#[derive(Clone, Debug, PartialEq)]
pub enum FilingProfile {
    Single,
    MarriedJoint { spouse: SpouseProfile },
    MarriedSeparate,
    HeadOfHousehold,
}

impl FilingProfile {
    pub fn status(&self) -> FilingStatus {
        match self {
            FilingProfile::Single => FilingStatus::Single,
            FilingProfile::MarriedJoint { .. } => FilingStatus::MarriedJoint,
            FilingProfile::MarriedSeparate => FilingStatus::MarriedSeparate,
            FilingProfile::HeadOfHousehold => FilingStatus::HeadOfHousehold,
        }
    }

    pub fn spouse(&self) -> Option<&SpouseProfile> {
        match self {
            FilingProfile::MarriedJoint { spouse } => Some(spouse),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpouseProfile {
    pub current_age: u32,
    pub retirement_age: u32,
    pub current_salary: f64,
    pub salary_growth_rate: f64,
    pub ss_start_age: u32,
    pub ss_monthly_amount: f64,
    pub pension_monthly_amount: f64,
    pub pension_cola: bool,
}

/// Roth conversion policy. Only one strategy is active per run.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RothConversion {
    None,
    /// Convert deferred dollars up to the ceiling of the federal bracket
    /// whose marginal rate equals `target_rate`.
    FillBracket { target_rate: f64 },
    FixedAmount { amount: f64 },
}

/// A lump expense pinned to a specific calendar year.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OneTimeExpense {
    pub year: i32,
    pub amount: f64,
}

/// Immutable per-run inputs. All rate fields are fractions (0.07 = 7%);
/// the CLI/API layer converts from percent before constructing this.
#[derive(Debug, Clone)]
pub struct SimulationInputs {
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,
    pub plan_start_year: i32,
    pub filing: FilingProfile,
    pub state_of_residence: String,

    pub current_salary: f64,
    pub salary_growth_rate: f64,
    pub taxable_start: f64,
    pub deferred_start: f64,
    pub roth_start: f64,
    pub ss_start_age: u32,
    pub ss_monthly_amount: f64,
    pub pension_monthly_amount: f64,
    pub pension_cola: bool,
    pub passive_income: f64,

    pub taxable_contribution: f64,
    pub deferred_contribution: f64,
    pub roth_contribution: f64,
    pub employer_match_rate: f64,
    pub savings_escalator: f64,
    pub contribution_stop_age: u32,

    pub current_expenses: f64,
    pub retirement_ratio: f64,
    pub general_inflation: f64,
    pub medical_inflation: f64,
    pub pre_retirement_return: f64,
    pub post_retirement_return: f64,
    pub one_time_expenses: Vec<OneTimeExpense>,

    pub roth_conversion: RothConversion,
    pub rmd_reinvestment: bool,
    pub legacy_goal: f64,
}

/// Full decomposition of one simulated year. Ordering in
/// `SimulationResult::years` is chronological; each year's ending balances
/// are the next year's opening balances.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRecord {
    pub year: i32,
    pub user_age: u32,
    pub spouse_age: Option<u32>,
    pub is_retired: bool,

    pub work_income: f64,
    pub spouse_work_income: f64,
    pub social_security: f64,
    pub spouse_social_security: f64,
    pub pension_income: f64,
    pub rmds: f64,
    pub interest_dividends: f64,
    pub passive_income: f64,
    pub gross_income: f64,

    pub federal_tax: f64,
    pub state_tax: f64,
    pub fica_tax: f64,
    pub total_tax: f64,
    pub conversion_tax_cost: f64,

    pub essential_expenses: f64,
    pub healthcare_expenses: f64,
    pub discretionary_expenses: f64,
    pub one_time_expenses: f64,
    pub total_expenses: f64,

    pub taxable_contribution: f64,
    pub deferred_contribution: f64,
    pub roth_contribution: f64,
    pub employer_match: f64,
    pub taxable_withdrawal: f64,
    pub deferred_withdrawal: f64,
    pub roth_withdrawal: f64,
    pub rmd_reinvested: f64,
    pub roth_conversion: f64,
    pub unfunded_need: f64,

    pub taxable_balance: f64,
    pub deferred_balance: f64,
    pub roth_balance: f64,
    pub total_portfolio: f64,
    pub legacy_value: f64,
    pub real_wealth: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub years: Vec<YearRecord>,
    /// 100 when no year fell short; otherwise scaled down by the share of
    /// shortfall years, floored at 0.
    pub success_probability: f64,
    /// First age at which the total portfolio covers 25x current annual
    /// expenses, defaulting to the retirement age if never reached.
    pub financial_independence_age: u32,
    pub total_legacy: f64,
    pub legacy_goal_met: bool,
    /// Calendar years in which the cash need could not be fully funded
    /// even after draining all three buckets.
    pub shortfall_years: Vec<i32>,
}
