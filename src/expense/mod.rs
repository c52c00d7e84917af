//! Expense records and the endpoints that manage them.

mod core;
mod endpoints;
#[cfg(test)]
pub mod test_fixtures;

pub use self::core::{
    CategoryName, Expense, ExpenseBuilder, ExpensePatch, create_expense, create_expense_table,
    delete_expense, get_expense, list_expenses, update_expense,
};
pub use endpoints::{
    CreateExpense, ExpenseEndpointState, ExpenseListParams, create_expense_endpoint,
    delete_expense_endpoint, get_expense_endpoint, get_expenses_endpoint, update_expense_endpoint,
};
