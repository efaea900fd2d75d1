use super::tables::{
    CONVERSION_TAX_RATE, FICA_RATE, FICA_WAGE_BASE, RMD_START_AGE, TAXABLE_YIELD_RATE,
    bracket_ceiling, federal_tax, rmd_divisor, ss_claiming_factor, standard_deduction,
    state_tax_rate,
};
use super::types::{
    FilingStatus, RothConversion, SimulationInputs, SimulationResult, SpouseProfile, YearRecord,
};

const EPS: f64 = 1e-9;

/// Source of the nominal return applied to all three balances in a given
/// simulated year. The engine ships a fixed two-regime source; stochastic
/// callers can plug in their own.
pub trait ReturnSource {
    fn rate(&self, year_index: u32, retired: bool) -> f64;
}

/// Fixed scalar returns per pre/post-retirement regime.
#[derive(Debug, Clone, Copy)]
pub struct FixedReturns {
    pre_retirement: f64,
    post_retirement: f64,
}

impl FixedReturns {
    pub fn from_inputs(inputs: &SimulationInputs) -> Self {
        Self {
            pre_retirement: inputs.pre_retirement_return,
            post_retirement: inputs.post_retirement_return,
        }
    }
}

impl ReturnSource for FixedReturns {
    fn rate(&self, _year_index: u32, retired: bool) -> f64 {
        if retired {
            self.post_retirement
        } else {
            self.pre_retirement
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Balances {
    taxable: f64,
    deferred: f64,
    roth: f64,
}

impl Balances {
    fn total(self) -> f64 {
        self.taxable + self.deferred + self.roth
    }

    fn grow(&mut self, rate: f64) {
        self.taxable = (self.taxable * (1.0 + rate)).max(0.0);
        self.deferred = (self.deferred * (1.0 + rate)).max(0.0);
        self.roth = (self.roth * (1.0 + rate)).max(0.0);
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct SpouseYear {
    age: Option<u32>,
    work_income: f64,
    social_security: f64,
    pension: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct ContributionFlow {
    taxable: f64,
    deferred: f64,
    roth: f64,
    employer_match: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct DrawdownFlow {
    taxable: f64,
    deferred: f64,
    roth: f64,
    unfunded: f64,
}

/// Projects the household year by year from the current age through life
/// expectancy under the fixed two-regime return assumption. Deterministic;
/// all state is allocated locally, so concurrent runs share nothing.
pub fn project(inputs: &SimulationInputs) -> SimulationResult {
    project_with_returns(inputs, &FixedReturns::from_inputs(inputs))
}

pub fn project_with_returns(
    inputs: &SimulationInputs,
    returns: &impl ReturnSource,
) -> SimulationResult {
    // A life expectancy at or before the current age degenerates to a
    // single simulated year rather than an error.
    let horizon = inputs.life_expectancy.saturating_sub(inputs.current_age);

    let mut balances = Balances {
        taxable: inputs.taxable_start.max(0.0),
        deferred: inputs.deferred_start.max(0.0),
        roth: inputs.roth_start.max(0.0),
    };
    let mut inflation_multiplier = 1.0;
    let mut medical_multiplier = 1.0;

    let mut years = Vec::with_capacity(horizon as usize + 1);
    let mut shortfall_years = Vec::new();

    for i in 0..=horizon {
        let age = inputs.current_age + i;
        let year = inputs.plan_start_year + i as i32;
        let retired = age >= inputs.retirement_age;

        if i > 0 {
            inflation_multiplier *= 1.0 + inputs.general_inflation;
            medical_multiplier *= 1.0 + inputs.medical_inflation;
        }

        // Income aggregation.
        let work_income = if retired {
            0.0
        } else {
            inputs.current_salary * (1.0 + inputs.salary_growth_rate).powi(i as i32)
        };
        let social_security = if age >= inputs.ss_start_age {
            inputs.ss_monthly_amount
                * 12.0
                * ss_claiming_factor(inputs.ss_start_age)
                * inflation_multiplier
        } else {
            0.0
        };
        let pension_cola_multiplier = if inputs.pension_cola {
            inflation_multiplier
        } else {
            1.0
        };
        let pension = if retired && inputs.pension_monthly_amount > 0.0 {
            inputs.pension_monthly_amount * 12.0 * pension_cola_multiplier
        } else {
            0.0
        };
        let rmd = if age >= RMD_START_AGE && balances.deferred > 0.0 {
            balances.deferred / rmd_divisor(age)
        } else {
            0.0
        };
        let interest_dividends = balances.taxable * TAXABLE_YIELD_RATE;
        let spouse = spouse_year(inputs.filing.spouse(), i, inflation_multiplier);

        let gross_income = work_income
            + spouse.work_income
            + social_security
            + spouse.social_security
            + pension
            + spouse.pension
            + rmd
            + interest_dividends
            + inputs.passive_income;

        // Taxes.
        let status = inputs.filing.status();
        let taxable_income = (gross_income - standard_deduction(status)).max(0.0);
        let federal = federal_tax(taxable_income, status);
        let state = state_tax_rate(&inputs.state_of_residence) * taxable_income;
        // Work income is already zero for a retired earner, so no extra
        // retirement gate is needed per earner.
        let fica = FICA_RATE * work_income.min(FICA_WAGE_BASE)
            + FICA_RATE * spouse.work_income.min(FICA_WAGE_BASE);
        let total_tax = federal + state + fica;

        // Expenses.
        let base_expenses =
            inputs.current_expenses * if retired { inputs.retirement_ratio } else { 1.0 };
        let essential = base_expenses * 0.70 * inflation_multiplier;
        let healthcare = base_expenses * 0.15 * medical_multiplier;
        let discretionary = base_expenses * 0.15 * inflation_multiplier;
        let one_time: f64 = inputs
            .one_time_expenses
            .iter()
            .filter(|e| e.year == year)
            .map(|e| e.amount)
            .sum();
        let total_expenses = essential + healthcare + discretionary + one_time;

        // Surplus allocation or gap drawdown.
        let net = gross_income - total_tax - total_expenses;
        let mut contributions = ContributionFlow::default();
        let mut drawdown = DrawdownFlow::default();

        if net > 0.0 && !retired && age < inputs.contribution_stop_age {
            contributions = allocate_surplus(inputs, net, work_income, i, &mut balances);
        } else if net < 0.0 {
            drawdown = cover_gap(-net, rmd, &mut balances);
            if drawdown.unfunded > EPS {
                shortfall_years.push(year);
            }
        }

        // The RMD leaves the deferred bucket regardless of the branch
        // above; the gap drawdown never touched the reserved portion.
        balances.deferred = (balances.deferred - rmd).max(0.0);
        let rmd_reinvested = if inputs.rmd_reinvestment {
            let reinvested = rmd * (1.0 - CONVERSION_TAX_RATE);
            balances.taxable += reinvested;
            reinvested
        } else {
            0.0
        };

        // Roth conversion. The flat tax cost is tracked on the record but
        // not charged against any balance or the tax total.
        let conversion = conversion_amount(inputs, status, taxable_income, balances.deferred);
        balances.deferred -= conversion;
        balances.roth += conversion;
        let conversion_tax_cost = conversion * CONVERSION_TAX_RATE;

        balances.grow(returns.rate(i, retired));

        let total_portfolio = balances.total();
        years.push(YearRecord {
            year,
            user_age: age,
            spouse_age: spouse.age,
            is_retired: retired,
            work_income,
            spouse_work_income: spouse.work_income,
            social_security,
            spouse_social_security: spouse.social_security,
            pension_income: pension + spouse.pension,
            rmds: rmd,
            interest_dividends,
            passive_income: inputs.passive_income,
            gross_income,
            federal_tax: federal,
            state_tax: state,
            fica_tax: fica,
            total_tax,
            conversion_tax_cost,
            essential_expenses: essential,
            healthcare_expenses: healthcare,
            discretionary_expenses: discretionary,
            one_time_expenses: one_time,
            total_expenses,
            taxable_contribution: contributions.taxable,
            deferred_contribution: contributions.deferred,
            roth_contribution: contributions.roth,
            employer_match: contributions.employer_match,
            taxable_withdrawal: drawdown.taxable,
            deferred_withdrawal: drawdown.deferred,
            roth_withdrawal: drawdown.roth,
            rmd_reinvested,
            roth_conversion: conversion,
            unfunded_need: drawdown.unfunded,
            taxable_balance: balances.taxable,
            deferred_balance: balances.deferred,
            roth_balance: balances.roth,
            total_portfolio,
            legacy_value: if i == horizon { total_portfolio } else { 0.0 },
            real_wealth: total_portfolio / inflation_multiplier.max(EPS),
        });
    }

    let success_probability = if shortfall_years.is_empty() {
        100.0
    } else {
        (100.0 - shortfall_years.len() as f64 / years.len() as f64 * 100.0).max(0.0)
    };
    let fi_target = inputs.current_expenses * 25.0;
    let financial_independence_age = years
        .iter()
        .find(|y| y.total_portfolio >= fi_target)
        .map(|y| y.user_age)
        .unwrap_or(inputs.retirement_age);
    let total_legacy = years.last().map(|y| y.total_portfolio).unwrap_or(0.0);

    SimulationResult {
        years,
        success_probability,
        financial_independence_age,
        legacy_goal_met: total_legacy >= inputs.legacy_goal,
        total_legacy,
        shortfall_years,
    }
}

fn spouse_year(
    spouse: Option<&SpouseProfile>,
    year_index: u32,
    inflation_multiplier: f64,
) -> SpouseYear {
    let Some(spouse) = spouse else {
        return SpouseYear::default();
    };

    let age = spouse.current_age + year_index;
    let work_income = if age < spouse.retirement_age {
        spouse.current_salary * (1.0 + spouse.salary_growth_rate).powi(year_index as i32)
    } else {
        0.0
    };
    let social_security = if age >= spouse.ss_start_age {
        spouse.ss_monthly_amount
            * 12.0
            * ss_claiming_factor(spouse.ss_start_age)
            * inflation_multiplier
    } else {
        0.0
    };
    let cola_multiplier = if spouse.pension_cola {
        inflation_multiplier
    } else {
        1.0
    };
    let pension = if age >= spouse.retirement_age && spouse.pension_monthly_amount > 0.0 {
        spouse.pension_monthly_amount * 12.0 * cola_multiplier
    } else {
        0.0
    };

    SpouseYear {
        age: Some(age),
        work_income,
        social_security,
        pension,
    }
}

/// Contribution ordering is fixed policy: tax-advantaged buckets first
/// (deferred, then Roth), spillover to taxable. Each bucket is capped at
/// its own escalated annual limit; the employer match always lands in the
/// deferred bucket on top of the cap.
fn allocate_surplus(
    inputs: &SimulationInputs,
    surplus: f64,
    work_income: f64,
    year_index: u32,
    balances: &mut Balances,
) -> ContributionFlow {
    let escalation = (1.0 + inputs.savings_escalator).powi(year_index as i32);
    let mut remaining = surplus;

    let deferred = remaining.min((inputs.deferred_contribution * escalation).max(0.0));
    remaining -= deferred;
    let roth = remaining.min((inputs.roth_contribution * escalation).max(0.0));
    remaining -= roth;
    let taxable = remaining.min((inputs.taxable_contribution * escalation).max(0.0));

    let employer_match = inputs.employer_match_rate.max(0.0) * work_income;

    balances.deferred += deferred + employer_match;
    balances.roth += roth;
    balances.taxable += taxable;

    ContributionFlow {
        taxable,
        deferred,
        roth,
        employer_match,
    }
}

/// Drawdown ordering is the mirror-image fixed policy: taxable first so
/// tax-advantaged balances compound longest, then deferred, then Roth.
/// The deferred draw leaves the reserved RMD untouched; whatever the Roth
/// draw cannot cover is the year's unfunded need.
fn cover_gap(gap: f64, reserved_rmd: f64, balances: &mut Balances) -> DrawdownFlow {
    let mut remaining = gap;

    let taxable = remaining.min(balances.taxable.max(0.0));
    balances.taxable -= taxable;
    remaining -= taxable;

    let deferred_available = (balances.deferred - reserved_rmd).max(0.0);
    let deferred = remaining.min(deferred_available);
    balances.deferred -= deferred;
    remaining -= deferred;

    let roth = remaining.min(balances.roth.max(0.0));
    balances.roth -= roth;
    remaining -= roth;

    DrawdownFlow {
        taxable,
        deferred,
        roth,
        unfunded: remaining.max(0.0),
    }
}

fn conversion_amount(
    inputs: &SimulationInputs,
    status: FilingStatus,
    taxable_income: f64,
    deferred_balance: f64,
) -> f64 {
    match inputs.roth_conversion {
        RothConversion::None => 0.0,
        RothConversion::FillBracket { target_rate } => bracket_ceiling(status, target_rate)
            .map(|ceiling| (ceiling - taxable_income).max(0.0).min(deferred_balance))
            .unwrap_or(0.0),
        RothConversion::FixedAmount { amount } => amount.max(0.0).min(deferred_balance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{FilingProfile, OneTimeExpense};
    use proptest::prelude::{prop_assert, proptest};

    const TEST_EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= TEST_EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_inputs() -> SimulationInputs {
        SimulationInputs {
            current_age: 35,
            retirement_age: 65,
            life_expectancy: 90,
            plan_start_year: 2025,
            filing: FilingProfile::Single,
            state_of_residence: "TX".to_string(),
            current_salary: 100_000.0,
            salary_growth_rate: 0.0,
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
            contribution_stop_age: 65,
            current_expenses: 75_000.0,
            retirement_ratio: 0.8,
            general_inflation: 0.025,
            medical_inflation: 0.05,
            pre_retirement_return: 0.07,
            post_retirement_return: 0.05,
            one_time_expenses: Vec::new(),
            roth_conversion: RothConversion::None,
            rmd_reinvestment: false,
            legacy_goal: 0.0,
        }
    }

    /// Inputs with every rate zeroed so single-year balance arithmetic can
    /// be checked by hand.
    fn frozen_inputs() -> SimulationInputs {
        let mut inputs = sample_inputs();
        inputs.general_inflation = 0.0;
        inputs.medical_inflation = 0.0;
        inputs.pre_retirement_return = 0.0;
        inputs.post_retirement_return = 0.0;
        inputs.salary_growth_rate = 0.0;
        inputs.ss_monthly_amount = 0.0;
        inputs
    }

    #[test]
    fn baseline_projection_spans_all_ages_inclusive() {
        let result = project(&sample_inputs());

        assert_eq!(result.years.len(), 56);
        assert_eq!(result.years[0].user_age, 35);
        assert_eq!(result.years[55].user_age, 90);
        assert!(result.years[0].total_portfolio > 300_000.0);
        assert!((0.0..=100.0).contains(&result.success_probability));
    }

    #[test]
    fn years_are_chronologically_contiguous() {
        let result = project(&sample_inputs());

        for pair in result.years.windows(2) {
            assert_eq!(pair[1].user_age, pair[0].user_age + 1);
            assert_eq!(pair[1].year, pair[0].year + 1);
        }
    }

    #[test]
    fn projection_is_deterministic() {
        let inputs = sample_inputs();
        let a = serde_json::to_string(&project(&inputs)).unwrap();
        let b = serde_json::to_string(&project(&inputs)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn early_retirement_stress_produces_shortfalls() {
        let mut inputs = sample_inputs();
        inputs.retirement_age = 50;
        inputs.current_expenses = 120_000.0;

        let result = project(&inputs);

        assert!(!result.shortfall_years.is_empty());
        assert!(result.success_probability < 100.0);
        assert!(result.success_probability >= 0.0);
    }

    #[test]
    fn shortfall_years_match_unfunded_need_records() {
        let mut inputs = sample_inputs();
        inputs.retirement_age = 50;
        inputs.current_expenses = 120_000.0;

        let result = project(&inputs);

        for year in &result.years {
            let flagged = result.shortfall_years.contains(&year.year);
            assert_eq!(flagged, year.unfunded_need > EPS, "year {}", year.year);
            if flagged {
                // All three buckets were drained before the year was flagged.
                assert!(year.roth_balance <= TEST_EPS);
            }
        }
        assert_eq!(
            result.success_probability == 100.0,
            result.shortfall_years.is_empty()
        );
    }

    #[test]
    fn rmd_begins_at_73_with_first_year_divisor() {
        let mut inputs = frozen_inputs();
        inputs.current_age = 70;
        inputs.retirement_age = 65;
        inputs.life_expectancy = 90;
        inputs.taxable_start = 0.0;
        inputs.roth_start = 0.0;
        inputs.deferred_start = 500_000.0;
        inputs.current_expenses = 0.0;
        inputs.post_retirement_return = 0.05;

        let result = project(&inputs);

        assert_approx(result.years[0].rmds, 0.0);
        assert_approx(result.years[2].rmds, 0.0);
        // Three years of 5% growth before the first distribution at 73.
        let expected_deferred = 500_000.0 * 1.05_f64.powi(3);
        assert_approx(result.years[3].rmds, expected_deferred / 27.4);
        // Divisors shrink year over year, so the distribution rate rises.
        let rate_73 = result.years[3].rmds / expected_deferred;
        let deferred_74 = result.years[3].deferred_balance;
        let rate_74 = result.years[4].rmds / deferred_74;
        assert!(rate_74 > rate_73);
    }

    #[test]
    fn rmd_reinvestment_routes_after_tax_share_to_taxable() {
        let mut inputs = frozen_inputs();
        inputs.current_age = 73;
        inputs.retirement_age = 65;
        inputs.life_expectancy = 75;
        inputs.taxable_start = 10_000.0;
        inputs.roth_start = 0.0;
        inputs.deferred_start = 500_000.0;
        inputs.current_expenses = 0.0;
        inputs.rmd_reinvestment = true;

        let result = project(&inputs);
        let first = &result.years[0];

        let rmd = 500_000.0 / 27.4;
        assert_approx(first.rmds, rmd);
        assert_approx(first.rmd_reinvested, rmd * 0.78);
        assert_approx(first.deferred_balance, 500_000.0 - rmd);
        assert_approx(first.taxable_balance, 10_000.0 + rmd * 0.78);
    }

    #[test]
    fn fixed_amount_conversion_moves_deferred_to_roth() {
        let mut inputs = frozen_inputs();
        inputs.current_age = 60;
        inputs.retirement_age = 55;
        inputs.life_expectancy = 62;
        inputs.deferred_start = 100_000.0;
        inputs.roth_start = 25_000.0;
        inputs.taxable_start = 500_000.0;
        inputs.current_expenses = 10_000.0;
        inputs.roth_conversion = RothConversion::FixedAmount { amount: 20_000.0 };

        let result = project(&inputs);
        let first = &result.years[0];

        assert_approx(first.roth_conversion, 20_000.0);
        assert_approx(first.deferred_balance, 80_000.0);
        assert_approx(first.roth_balance, 45_000.0);
        // Cost is tracked but charged nowhere.
        assert_approx(first.conversion_tax_cost, 20_000.0 * 0.22);
        assert_approx(
            first.total_tax,
            first.federal_tax + first.state_tax + first.fica_tax,
        );
    }

    #[test]
    fn fixed_amount_conversion_is_capped_by_deferred_balance() {
        let mut inputs = frozen_inputs();
        inputs.current_age = 60;
        inputs.retirement_age = 55;
        inputs.life_expectancy = 61;
        inputs.deferred_start = 8_000.0;
        inputs.taxable_start = 500_000.0;
        inputs.current_expenses = 10_000.0;
        inputs.roth_conversion = RothConversion::FixedAmount { amount: 20_000.0 };

        let result = project(&inputs);
        assert_approx(result.years[0].roth_conversion, 8_000.0);
        assert_approx(result.years[0].deferred_balance, 0.0);
    }

    #[test]
    fn fill_bracket_conversion_stops_at_the_bracket_ceiling() {
        let mut inputs = frozen_inputs();
        inputs.current_age = 60;
        inputs.retirement_age = 55;
        inputs.life_expectancy = 61;
        inputs.deferred_start = 400_000.0;
        inputs.taxable_start = 500_000.0;
        inputs.current_expenses = 10_000.0;
        inputs.roth_conversion = RothConversion::FillBracket { target_rate: 0.22 };

        let result = project(&inputs);
        let first = &result.years[0];

        // Single-filer 22% bracket tops out at 100,525.
        let headroom = 100_525.0 - (first.gross_income - 14_600.0).max(0.0);
        assert_approx(first.roth_conversion, headroom.max(0.0).min(400_000.0));
    }

    #[test]
    fn surplus_allocation_fills_deferred_then_roth_then_taxable() {
        let mut inputs = frozen_inputs();
        inputs.current_salary = 150_000.0;
        inputs.current_expenses = 40_000.0;
        inputs.deferred_contribution = 10_000.0;
        inputs.roth_contribution = 5_000.0;
        inputs.taxable_contribution = 5_000.0;
        inputs.employer_match_rate = 0.04;

        let result = project(&inputs);
        let first = &result.years[0];

        assert_approx(first.deferred_contribution, 10_000.0);
        assert_approx(first.roth_contribution, 5_000.0);
        assert_approx(first.taxable_contribution, 5_000.0);
        assert_approx(first.employer_match, 0.04 * 150_000.0);
        assert_approx(
            first.deferred_balance,
            200_000.0 + 10_000.0 + 0.04 * 150_000.0,
        );
    }

    #[test]
    fn small_surplus_partially_fills_the_first_bucket_only() {
        let mut inputs = frozen_inputs();
        inputs.current_salary = 100_000.0;
        inputs.current_expenses = 70_000.0;
        inputs.deferred_contribution = 30_000.0;
        inputs.roth_contribution = 7_000.0;
        inputs.taxable_contribution = 10_000.0;

        let result = project(&inputs);
        let first = &result.years[0];

        let surplus = first.gross_income - first.total_tax - first.total_expenses;
        assert!(surplus > 0.0 && surplus < 30_000.0);
        assert_approx(first.deferred_contribution, surplus);
        assert_approx(first.roth_contribution, 0.0);
        assert_approx(first.taxable_contribution, 0.0);
    }

    #[test]
    fn contributions_stop_at_the_configured_age() {
        let mut inputs = frozen_inputs();
        inputs.current_age = 54;
        inputs.life_expectancy = 60;
        inputs.retirement_age = 58;
        inputs.contribution_stop_age = 56;
        inputs.current_salary = 200_000.0;
        inputs.current_expenses = 50_000.0;
        inputs.deferred_contribution = 10_000.0;

        let result = project(&inputs);

        assert!(result.years[0].deferred_contribution > 0.0); // 54
        assert!(result.years[1].deferred_contribution > 0.0); // 55
        assert_approx(result.years[2].deferred_contribution, 0.0); // 56
    }

    #[test]
    fn drawdown_prefers_taxable_and_reserves_the_rmd() {
        let mut inputs = frozen_inputs();
        inputs.current_age = 75;
        inputs.retirement_age = 65;
        inputs.life_expectancy = 76;
        inputs.taxable_start = 5_000.0;
        inputs.deferred_start = 50_000.0;
        inputs.roth_start = 40_000.0;
        inputs.current_expenses = 60_000.0;
        inputs.retirement_ratio = 1.0;

        let result = project(&inputs);
        let first = &result.years[0];

        let rmd = 50_000.0 / rmd_divisor(75);
        assert_approx(first.rmds, rmd);
        assert_approx(first.taxable_withdrawal, 5_000.0);
        // The deferred draw stops short of the reserved RMD.
        assert!(first.deferred_withdrawal <= 50_000.0 - rmd + TEST_EPS);
        assert!(first.roth_withdrawal > 0.0);
        assert!(first.taxable_balance >= 0.0);
        assert!(first.deferred_balance >= 0.0);
        assert!(first.roth_balance >= 0.0);
    }

    #[test]
    fn one_time_expenses_hit_only_their_tagged_year() {
        let mut inputs = sample_inputs();
        inputs.one_time_expenses = vec![
            OneTimeExpense {
                year: 2027,
                amount: 30_000.0,
            },
            OneTimeExpense {
                year: 2027,
                amount: 5_000.0,
            },
            OneTimeExpense {
                year: 2030,
                amount: 12_000.0,
            },
        ];

        let result = project(&inputs);

        assert_approx(result.years[0].one_time_expenses, 0.0);
        assert_approx(result.years[2].one_time_expenses, 35_000.0);
        assert_approx(result.years[5].one_time_expenses, 12_000.0);
    }

    #[test]
    fn pension_cola_gates_the_inflation_adjustment() {
        let mut inputs = sample_inputs();
        inputs.current_age = 66;
        inputs.retirement_age = 65;
        inputs.life_expectancy = 70;
        inputs.ss_monthly_amount = 0.0;
        inputs.pension_monthly_amount = 2_000.0;
        inputs.pension_cola = false;

        let flat = project(&inputs);
        inputs.pension_cola = true;
        let cola = project(&inputs);

        assert_approx(flat.years[0].pension_income, 24_000.0);
        assert_approx(cola.years[0].pension_income, 24_000.0);
        assert_approx(flat.years[1].pension_income, 24_000.0);
        assert_approx(cola.years[1].pension_income, 24_000.0 * 1.025);
    }

    #[test]
    fn social_security_applies_claiming_adjustment_and_inflation() {
        let mut inputs = sample_inputs();
        inputs.current_age = 66;
        inputs.retirement_age = 65;
        inputs.life_expectancy = 72;
        inputs.ss_start_age = 70;
        inputs.ss_monthly_amount = 2_000.0;

        let result = project(&inputs);

        assert_approx(result.years[3].social_security, 0.0); // age 69
        let multiplier = 1.025_f64.powi(4);
        assert_approx(
            result.years[4].social_security,
            2_000.0 * 12.0 * 1.24 * multiplier,
        );
    }

    #[test]
    fn joint_filing_adds_spouse_income_streams() {
        let mut inputs = frozen_inputs();
        inputs.filing = FilingProfile::MarriedJoint {
            spouse: SpouseProfile {
                current_age: 33,
                retirement_age: 60,
                current_salary: 80_000.0,
                salary_growth_rate: 0.0,
                ss_start_age: 67,
                ss_monthly_amount: 1_500.0,
                pension_monthly_amount: 0.0,
                pension_cola: false,
            },
        };

        let result = project(&inputs);
        let first = &result.years[0];

        assert_eq!(first.spouse_age, Some(33));
        assert_approx(first.spouse_work_income, 80_000.0);
        let expected_fica = 0.0765 * (100_000.0 + 80_000.0);
        assert_approx(first.fica_tax, expected_fica);

        // Spouse stops working at their own retirement age (27 years out),
        // before the primary does (30 years out).
        assert_approx(result.years[27].spouse_work_income, 0.0);
        assert!(result.years[27].work_income > 0.0);
    }

    #[test]
    fn working_spouse_still_pays_fica_after_primary_retires() {
        let mut inputs = frozen_inputs();
        inputs.current_age = 66;
        inputs.retirement_age = 65;
        inputs.life_expectancy = 70;
        inputs.current_salary = 120_000.0;
        inputs.filing = FilingProfile::MarriedJoint {
            spouse: SpouseProfile {
                current_age: 60,
                retirement_age: 63,
                current_salary: 80_000.0,
                salary_growth_rate: 0.0,
                ss_start_age: 67,
                ss_monthly_amount: 0.0,
                pension_monthly_amount: 0.0,
                pension_cola: false,
            },
        };

        let result = project(&inputs);
        let first = &result.years[0];

        // The primary is retired; only the spouse's wages are FICA-taxed.
        assert_approx(first.work_income, 0.0);
        assert_approx(first.spouse_work_income, 80_000.0);
        assert_approx(first.fica_tax, 0.0765 * 80_000.0);
        assert_approx(result.years[2].fica_tax, 0.0765 * 80_000.0); // spouse 62

        // Once the spouse retires too, FICA drops to zero.
        assert_approx(result.years[3].spouse_work_income, 0.0); // spouse 63
        assert_approx(result.years[3].fica_tax, 0.0);
    }

    #[test]
    fn fica_caps_at_the_wage_base_per_earner() {
        let mut inputs = frozen_inputs();
        inputs.current_salary = 400_000.0;
        inputs.current_expenses = 100_000.0;

        let result = project(&inputs);
        assert_approx(result.years[0].fica_tax, 0.0765 * 168_600.0);
    }

    #[test]
    fn retirement_scales_expenses_by_the_retirement_ratio() {
        let mut inputs = frozen_inputs();
        inputs.current_age = 64;
        inputs.retirement_age = 65;
        inputs.life_expectancy = 66;
        inputs.taxable_start = 1_000_000.0;
        inputs.current_expenses = 80_000.0;
        inputs.retirement_ratio = 0.75;

        let result = project(&inputs);

        assert_approx(result.years[0].total_expenses, 80_000.0);
        assert_approx(result.years[1].total_expenses, 60_000.0);
        assert_approx(result.years[1].essential_expenses, 60_000.0 * 0.70);
        assert_approx(result.years[1].healthcare_expenses, 60_000.0 * 0.15);
    }

    #[test]
    fn financial_independence_age_defaults_to_retirement_age() {
        let mut inputs = sample_inputs();
        inputs.taxable_start = 0.0;
        inputs.deferred_start = 0.0;
        inputs.roth_start = 0.0;
        inputs.current_salary = 60_000.0;
        inputs.current_expenses = 55_000.0;

        let result = project(&inputs);
        assert_eq!(result.financial_independence_age, inputs.retirement_age);
    }

    #[test]
    fn financial_independence_age_is_first_year_at_25x_expenses() {
        let mut inputs = sample_inputs();
        inputs.current_expenses = 10_000.0;

        let result = project(&inputs);

        let target = 250_000.0;
        let expected = result
            .years
            .iter()
            .find(|y| y.total_portfolio >= target)
            .map(|y| y.user_age)
            .unwrap();
        assert_eq!(result.financial_independence_age, expected);
    }

    #[test]
    fn legacy_is_recorded_only_in_the_final_year() {
        let result = project(&sample_inputs());

        for year in &result.years[..result.years.len() - 1] {
            assert_approx(year.legacy_value, 0.0);
        }
        let last = result.years.last().unwrap();
        assert_approx(last.legacy_value, last.total_portfolio);
        assert_approx(result.total_legacy, last.total_portfolio);
    }

    #[test]
    fn legacy_goal_comparison_uses_final_portfolio() {
        let mut inputs = sample_inputs();
        inputs.legacy_goal = 1.0e12;
        assert!(!project(&inputs).legacy_goal_met);
        inputs.legacy_goal = 0.0;
        assert!(project(&inputs).legacy_goal_met);
    }

    #[test]
    fn degenerate_horizon_yields_a_single_year() {
        let mut inputs = sample_inputs();
        inputs.life_expectancy = inputs.current_age;
        assert_eq!(project(&inputs).years.len(), 1);

        inputs.life_expectancy = inputs.current_age - 10;
        assert_eq!(project(&inputs).years.len(), 1);
    }

    #[test]
    fn pluggable_return_source_overrides_the_fixed_regimes() {
        struct Flat(f64);
        impl ReturnSource for Flat {
            fn rate(&self, _year_index: u32, _retired: bool) -> f64 {
                self.0
            }
        }

        let mut inputs = frozen_inputs();
        inputs.current_age = 64;
        inputs.retirement_age = 90;
        inputs.life_expectancy = 65;
        inputs.current_salary = 0.0;
        inputs.current_expenses = 0.0;
        inputs.taxable_start = 100_000.0;
        inputs.deferred_start = 0.0;
        inputs.roth_start = 0.0;

        let result = project_with_returns(&inputs, &Flat(0.10));
        assert!((result.years[0].taxable_balance - 110_000.0).abs() < 1.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_balances_stay_finite_and_non_negative(
            current_age in 25u32..70,
            horizon in 0u32..50,
            retirement_offset in 0u32..40,
            salary in 0u32..400_000,
            expenses in 0u32..250_000,
            taxable in 0u32..1_000_000,
            deferred in 0u32..1_500_000,
            roth in 0u32..800_000,
            pre_bp in -200i32..1500,
            post_bp in -200i32..1200,
            inflation_bp in 0u32..700,
        ) {
            let mut inputs = sample_inputs();
            inputs.current_age = current_age;
            inputs.life_expectancy = current_age + horizon;
            inputs.retirement_age = current_age + retirement_offset;
            inputs.current_salary = salary as f64;
            inputs.current_expenses = expenses as f64;
            inputs.taxable_start = taxable as f64;
            inputs.deferred_start = deferred as f64;
            inputs.roth_start = roth as f64;
            inputs.pre_retirement_return = pre_bp as f64 / 10_000.0;
            inputs.post_retirement_return = post_bp as f64 / 10_000.0;
            inputs.general_inflation = inflation_bp as f64 / 10_000.0;

            let result = project(&inputs);

            prop_assert!(result.years.len() as u32 == horizon + 1);
            for year in &result.years {
                for (label, value) in [
                    ("taxable", year.taxable_balance),
                    ("deferred", year.deferred_balance),
                    ("roth", year.roth_balance),
                    ("total", year.total_portfolio),
                    ("real", year.real_wealth),
                    ("gross", year.gross_income),
                    ("tax", year.total_tax),
                    ("spend", year.total_expenses),
                ] {
                    prop_assert!(value.is_finite(), "{label} must be finite");
                    prop_assert!(value >= -1e-6, "{label} must be non-negative, got {value}");
                }
            }
        }

        #[test]
        fn prop_ages_and_years_increase_by_one(
            current_age in 20u32..80,
            horizon in 1u32..60,
            start_year in 2_000i32..2_100,
        ) {
            let mut inputs = sample_inputs();
            inputs.current_age = current_age;
            inputs.life_expectancy = current_age + horizon;
            inputs.retirement_age = current_age + horizon / 2;
            inputs.plan_start_year = start_year;

            let result = project(&inputs);

            for pair in result.years.windows(2) {
                prop_assert!(pair[1].user_age == pair[0].user_age + 1);
                prop_assert!(pair[1].year == pair[0].year + 1);
            }
        }

        #[test]
        fn prop_success_probability_is_bounded_and_consistent(
            expenses in 10_000u32..400_000,
            taxable in 0u32..600_000,
            retirement_offset in 0u32..30,
        ) {
            let mut inputs = sample_inputs();
            inputs.current_expenses = expenses as f64;
            inputs.taxable_start = taxable as f64;
            inputs.retirement_age = inputs.current_age + retirement_offset;

            let result = project(&inputs);

            prop_assert!((0.0..=100.0).contains(&result.success_probability));
            prop_assert!(
                (result.success_probability == 100.0) == result.shortfall_years.is_empty()
            );
            for year in result.shortfall_years {
                prop_assert!(
                    result.years.iter().any(|y| y.year == year && y.unfunded_need > EPS)
                );
            }
        }

        #[test]
        fn prop_projection_is_idempotent(
            salary in 0u32..300_000,
            expenses in 0u32..200_000,
            deferred in 0u32..1_000_000,
        ) {
            let mut inputs = sample_inputs();
            inputs.current_salary = salary as f64;
            inputs.current_expenses = expenses as f64;
            inputs.deferred_start = deferred as f64;

            let a = serde_json::to_string(&project(&inputs)).unwrap();
            let b = serde_json::to_string(&project(&inputs)).unwrap();
            prop_assert!(a == b);
        }
    }
}
