use super::types::{Comparison, Inputs, SimulationResult, Verdict, YearSummary};

const MONTHS_PER_YEAR: usize = 12;

/// Effective monthly rate equivalent to an annual rate, via the twelfth root
/// of `1 + annual_rate`.
pub fn effective_monthly_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / 12.0) - 1.0
}

/// Fixed monthly payment that amortizes `property_value - down_payment` over
/// `loan_term_years`. A zero rate falls back to straight-line repayment.
///
/// A down payment above the property value is not clamped and yields a
/// negative payment.
pub fn monthly_payment(
    property_value: f64,
    down_payment: f64,
    annual_interest_rate: f64,
    loan_term_years: u32,
) -> f64 {
    let financed = property_value - down_payment;
    let monthly_rate = effective_monthly_rate(annual_interest_rate);
    let num_payments = loan_term_years as usize * MONTHS_PER_YEAR;

    if monthly_rate == 0.0 {
        return financed / num_payments as f64;
    }

    let growth = (1.0 + monthly_rate).powi(num_payments as i32);
    financed * (monthly_rate * growth) / (growth - 1.0)
}

/// Down payment plus every payment made so far, one entry per month.
pub fn cumulative_ownership_cost(
    monthly_payment: f64,
    down_payment: f64,
    num_payments: usize,
) -> Vec<f64> {
    (0..num_payments)
        .map(|month| down_payment + monthly_payment * (month + 1) as f64)
        .collect()
}

/// Rent charged each month. The rent holds for a 12-month block and steps up
/// by `1 + annual_increase` at the start of every later year.
pub fn monthly_rent_series(monthly_rent: f64, annual_increase: f64, num_months: usize) -> Vec<f64> {
    let escalation = 1.0 + annual_increase;
    (0..num_months)
        .scan(monthly_rent, |current, month| {
            if month > 0 && month % MONTHS_PER_YEAR == 0 {
                *current *= escalation;
            }
            Some(*current)
        })
        .collect()
}

pub fn running_total(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |total, value| {
            *total += value;
            Some(*total)
        })
        .collect()
}

/// Value of the down payment compounding at the effective monthly rate.
/// Entry `i` has compounded for `i + 1` months.
pub fn invested_down_payment_value(
    down_payment: f64,
    annual_return: f64,
    num_months: usize,
) -> Vec<f64> {
    let growth = 1.0 + effective_monthly_rate(annual_return);
    (0..num_months)
        .map(|month| down_payment * growth.powi(month as i32 + 1))
        .collect()
}

/// Compares total cash paid out for owning against renting. The invested
/// down payment track is not netted against either side.
pub fn summarize(cumulative_ownership_cost: &[f64], cumulative_rent_cost: &[f64]) -> Comparison {
    let final_ownership_cost = cumulative_ownership_cost.last().copied().unwrap_or(0.0);
    let final_rent_cost = cumulative_rent_cost.last().copied().unwrap_or(0.0);
    let difference = final_ownership_cost - final_rent_cost;
    let verdict = if difference > 0.0 {
        Verdict::Renting {
            savings: difference,
        }
    } else {
        Verdict::Owning {
            savings: difference.abs(),
        }
    };

    Comparison {
        final_ownership_cost,
        final_rent_cost,
        difference,
        verdict,
    }
}

pub fn simulate(inputs: &Inputs) -> SimulationResult {
    let num_months = inputs.num_payments();
    let payment = monthly_payment(
        inputs.property_value,
        inputs.down_payment,
        inputs.annual_interest_rate,
        inputs.loan_term_years,
    );

    let ownership = cumulative_ownership_cost(payment, inputs.down_payment, num_months);
    let rent = monthly_rent_series(inputs.monthly_rent, inputs.annual_rent_increase, num_months);
    let cumulative_rent = running_total(&rent);
    let invested = invested_down_payment_value(
        inputs.down_payment,
        inputs.annual_investment_return,
        num_months,
    );
    let comparison = summarize(&ownership, &cumulative_rent);

    SimulationResult {
        month_index: (0..num_months as u32).collect(),
        monthly_payment: payment,
        cumulative_ownership_cost: ownership,
        monthly_rent: rent,
        cumulative_rent_cost: cumulative_rent,
        invested_down_payment_value: invested,
        comparison,
    }
}

/// One row per loan year, sampled at the last month of the year.
pub fn yearly_summary(result: &SimulationResult) -> Vec<YearSummary> {
    let years = result.month_index.len() / MONTHS_PER_YEAR;
    (1..=years)
        .map(|year| {
            let idx = year * MONTHS_PER_YEAR - 1;
            YearSummary {
                year: year as u32,
                monthly_rent: result.monthly_rent[idx],
                cumulative_ownership_cost: result.cumulative_ownership_cost[idx],
                cumulative_rent_cost: result.cumulative_rent_cost[idx],
                invested_down_payment_value: result.invested_down_payment_value[idx],
            }
        })
        .collect()
}
