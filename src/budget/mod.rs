//! Spending caps per category and derived budget status.

mod core;
mod endpoints;
mod status;

pub use self::core::{
    Budget, BudgetBuilder, BudgetPatch, Period, create_budget, create_budget_table, delete_budget,
    get_budget, list_budgets, update_budget,
};
pub use endpoints::{
    BudgetEndpointState, BudgetWithStatus, CreateBudget, create_budget_endpoint,
    delete_budget_endpoint, get_budget_endpoint, get_budget_status_endpoint,
    get_budgets_endpoint, update_budget_endpoint,
};
pub use status::{BudgetStatus, evaluate_budget};
