mod engine;
mod solver;
mod types;

pub use engine::{
    cumulative_ownership_cost, effective_monthly_rate, invested_down_payment_value,
    monthly_payment, monthly_rent_series, running_total, simulate, summarize, yearly_summary,
};
pub use solver::solve_break_even_rent;
pub use types::{BreakEvenRent, Comparison, Inputs, SimulationResult, Verdict, YearSummary};
