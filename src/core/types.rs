use serde::Serialize;

/// Scalar inputs for one simulation run. Rates are decimal fractions
/// (0.08 for 8%).
#[derive(Debug, Clone, PartialEq)]
pub struct Inputs {
    pub property_value: f64,
    pub down_payment: f64,
    pub annual_interest_rate: f64,
    pub loan_term_years: u32,
    pub monthly_rent: f64,
    pub annual_rent_increase: f64,
    pub annual_investment_return: f64,
}

impl Inputs {
    pub fn num_payments(&self) -> usize {
        self.loan_term_years as usize * 12
    }

    pub fn financed_amount(&self) -> f64 {
        self.property_value - self.down_payment
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "favorable", rename_all = "lowercase")]
pub enum Verdict {
    Renting { savings: f64 },
    Owning { savings: f64 },
}

impl Verdict {
    pub fn savings(self) -> f64 {
        match self {
            Verdict::Renting { savings } | Verdict::Owning { savings } => savings,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub final_ownership_cost: f64,
    pub final_rent_cost: f64,
    pub difference: f64,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub month_index: Vec<u32>,
    pub monthly_payment: f64,
    pub cumulative_ownership_cost: Vec<f64>,
    pub monthly_rent: Vec<f64>,
    pub cumulative_rent_cost: Vec<f64>,
    pub invested_down_payment_value: Vec<f64>,
    pub comparison: Comparison,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearSummary {
    pub year: u32,
    pub monthly_rent: f64,
    pub cumulative_ownership_cost: f64,
    pub cumulative_rent_cost: f64,
    pub invested_down_payment_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakEvenRent {
    pub monthly_rent: f64,
    pub rent_ratio: f64,
}
