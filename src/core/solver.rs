use super::engine::{cumulative_ownership_cost, monthly_payment};
use super::types::{BreakEvenRent, Inputs};

/// Starting monthly rent at which total rent paid over the loan term equals
/// total ownership outlay, given the inputs' rent escalation.
///
/// Total rent is linear in the starting rent: `rent * 12 * sum((1 + g)^y)`
/// over the loan years, so the break-even point is solved directly.
pub fn solve_break_even_rent(inputs: &Inputs) -> BreakEvenRent {
    let payment = monthly_payment(
        inputs.property_value,
        inputs.down_payment,
        inputs.annual_interest_rate,
        inputs.loan_term_years,
    );
    let final_ownership_cost =
        cumulative_ownership_cost(payment, inputs.down_payment, inputs.num_payments())
            .last()
            .copied()
            .unwrap_or(0.0);

    let rent_multiplier = rent_cost_multiplier(inputs.annual_rent_increase, inputs.loan_term_years);
    let monthly_rent = if rent_multiplier > 0.0 {
        final_ownership_cost / rent_multiplier
    } else {
        0.0
    };
    let rent_ratio = if monthly_rent > 0.0 {
        inputs.monthly_rent / monthly_rent
    } else {
        0.0
    };

    BreakEvenRent {
        monthly_rent,
        rent_ratio,
    }
}

/// Total rent paid over `years` per unit of starting monthly rent.
fn rent_cost_multiplier(annual_increase: f64, years: u32) -> f64 {
    let escalation = 1.0 + annual_increase;
    (0..years)
        .scan(1.0, |factor, year| {
            if year > 0 {
                *factor *= escalation;
            }
            Some(*factor)
        })
        .map(|factor| 12.0 * factor)
        .sum()
}
