//! Static tax and distribution tables: federal brackets, standard
//! deductions, flat state-rate approximations, IRS-style RMD divisors,
//! FICA constants, and the Social Security claiming adjustment.

use super::types::FilingStatus;

pub const SS_FULL_RETIREMENT_AGE: u32 = 67;
/// Delayed-claiming credit per year past full retirement age.
pub const SS_DELAYED_CREDIT_PER_YEAR: f64 = 0.08;
/// Early-claiming reduction per year before full retirement age.
pub const SS_EARLY_REDUCTION_PER_YEAR: f64 = 0.0667;

pub const RMD_START_AGE: u32 = 73;

pub const FICA_RATE: f64 = 0.0765;
pub const FICA_WAGE_BASE: f64 = 168_600.0;

/// Simplified flat yield assumption on the taxable balance.
pub const TAXABLE_YIELD_RATE: f64 = 0.02;

/// Flat rate applied to RMD reinvestment and Roth conversion accounting.
pub const CONVERSION_TAX_RATE: f64 = 0.22;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TaxBracket {
    pub rate: f64,
    /// Upper bound of the bracket; the top bracket is unbounded.
    pub ceiling: f64,
}

const TOP: f64 = f64::INFINITY;

const SINGLE_BRACKETS: [TaxBracket; 7] = [
    TaxBracket { rate: 0.10, ceiling: 11_600.0 },
    TaxBracket { rate: 0.12, ceiling: 47_150.0 },
    TaxBracket { rate: 0.22, ceiling: 100_525.0 },
    TaxBracket { rate: 0.24, ceiling: 191_950.0 },
    TaxBracket { rate: 0.32, ceiling: 243_725.0 },
    TaxBracket { rate: 0.35, ceiling: 609_350.0 },
    TaxBracket { rate: 0.37, ceiling: TOP },
];

const MARRIED_JOINT_BRACKETS: [TaxBracket; 7] = [
    TaxBracket { rate: 0.10, ceiling: 23_200.0 },
    TaxBracket { rate: 0.12, ceiling: 94_300.0 },
    TaxBracket { rate: 0.22, ceiling: 201_050.0 },
    TaxBracket { rate: 0.24, ceiling: 383_900.0 },
    TaxBracket { rate: 0.32, ceiling: 487_450.0 },
    TaxBracket { rate: 0.35, ceiling: 731_200.0 },
    TaxBracket { rate: 0.37, ceiling: TOP },
];

const MARRIED_SEPARATE_BRACKETS: [TaxBracket; 7] = [
    TaxBracket { rate: 0.10, ceiling: 11_600.0 },
    TaxBracket { rate: 0.12, ceiling: 47_150.0 },
    TaxBracket { rate: 0.22, ceiling: 100_525.0 },
    TaxBracket { rate: 0.24, ceiling: 191_950.0 },
    TaxBracket { rate: 0.32, ceiling: 243_725.0 },
    TaxBracket { rate: 0.35, ceiling: 365_600.0 },
    TaxBracket { rate: 0.37, ceiling: TOP },
];

const HEAD_OF_HOUSEHOLD_BRACKETS: [TaxBracket; 7] = [
    TaxBracket { rate: 0.10, ceiling: 16_550.0 },
    TaxBracket { rate: 0.12, ceiling: 63_100.0 },
    TaxBracket { rate: 0.22, ceiling: 100_500.0 },
    TaxBracket { rate: 0.24, ceiling: 191_950.0 },
    TaxBracket { rate: 0.32, ceiling: 243_700.0 },
    TaxBracket { rate: 0.35, ceiling: 609_350.0 },
    TaxBracket { rate: 0.37, ceiling: TOP },
];

pub fn brackets_for(status: FilingStatus) -> &'static [TaxBracket; 7] {
    match status {
        FilingStatus::Single => &SINGLE_BRACKETS,
        FilingStatus::MarriedJoint => &MARRIED_JOINT_BRACKETS,
        FilingStatus::MarriedSeparate => &MARRIED_SEPARATE_BRACKETS,
        FilingStatus::HeadOfHousehold => &HEAD_OF_HOUSEHOLD_BRACKETS,
    }
}

pub fn standard_deduction(status: FilingStatus) -> f64 {
    match status {
        FilingStatus::Single | FilingStatus::MarriedSeparate => 14_600.0,
        FilingStatus::MarriedJoint => 29_200.0,
        FilingStatus::HeadOfHousehold => 21_900.0,
    }
}

/// Marginal federal tax on already-deducted taxable income: each bracket
/// taxes the slice of income falling within [floor, ceiling) at its rate.
pub fn federal_tax(taxable_income: f64, status: FilingStatus) -> f64 {
    let mut remaining = taxable_income.max(0.0);
    let mut floor = 0.0;
    let mut tax = 0.0;

    for bracket in brackets_for(status) {
        if remaining <= 0.0 {
            break;
        }
        let span = bracket.ceiling - floor;
        let taxed = remaining.min(span);
        tax += taxed * bracket.rate;
        remaining -= taxed;
        floor = bracket.ceiling;
    }

    tax
}

/// Ceiling of the bracket whose marginal rate equals `target_rate`, used
/// by the fill-bracket Roth conversion policy. None when no bracket
/// carries that rate (or the rate's bracket is unbounded).
pub fn bracket_ceiling(status: FilingStatus, target_rate: f64) -> Option<f64> {
    brackets_for(status)
        .iter()
        .find(|b| (b.rate - target_rate).abs() < 1e-9)
        .map(|b| b.ceiling)
        .filter(|c| c.is_finite())
}

/// Flat state income tax approximations. Unlisted states fall back to 5%.
const STATE_TAX_RATES: &[(&str, f64)] = &[
    ("AK", 0.0),
    ("FL", 0.0),
    ("NV", 0.0),
    ("NH", 0.0),
    ("SD", 0.0),
    ("TN", 0.0),
    ("TX", 0.0),
    ("WA", 0.0),
    ("WY", 0.0),
    ("AZ", 0.025),
    ("CA", 0.093),
    ("CO", 0.044),
    ("CT", 0.055),
    ("GA", 0.0549),
    ("IL", 0.0495),
    ("IN", 0.0305),
    ("MA", 0.05),
    ("MD", 0.0475),
    ("MI", 0.0425),
    ("MN", 0.068),
    ("MO", 0.048),
    ("NC", 0.045),
    ("NJ", 0.0637),
    ("NY", 0.0685),
    ("OH", 0.035),
    ("OR", 0.099),
    ("PA", 0.0307),
    ("UT", 0.0465),
    ("VA", 0.0575),
    ("WI", 0.053),
];

pub const DEFAULT_STATE_TAX_RATE: f64 = 0.05;

pub fn state_tax_rate(state: &str) -> f64 {
    STATE_TAX_RATES
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(state.trim()))
        .map(|(_, rate)| *rate)
        .unwrap_or(DEFAULT_STATE_TAX_RATE)
}

/// Life-expectancy divisors indexed from the first RMD year (age 73).
/// Ages past the end of the table clamp to the final divisor.
const RMD_DIVISORS: [f64; 24] = [
    27.4, 26.5, 25.5, 24.6, 23.7, 22.9, 22.0, 21.1, 20.2, 19.4, 18.5, 17.7,
    16.8, 16.0, 15.2, 14.4, 13.7, 12.9, 12.2, 11.5, 10.8, 10.1, 9.5, 8.9,
];

pub fn rmd_divisor(age: u32) -> f64 {
    let index = age.saturating_sub(RMD_START_AGE) as usize;
    RMD_DIVISORS[index.min(RMD_DIVISORS.len() - 1)]
}

/// Actuarial adjustment for claiming Social Security away from full
/// retirement age: +8%/year claimed late, -6.67%/year claimed early.
pub fn ss_claiming_factor(start_age: u32) -> f64 {
    if start_age >= SS_FULL_RETIREMENT_AGE {
        let late = (start_age - SS_FULL_RETIREMENT_AGE) as f64;
        1.0 + SS_DELAYED_CREDIT_PER_YEAR * late
    } else {
        let early = (SS_FULL_RETIREMENT_AGE - start_age) as f64;
        (1.0 - SS_EARLY_REDUCTION_PER_YEAR * early).max(0.0)
    }
}
