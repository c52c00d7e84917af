//! Spend-versus-budget evaluation.
//!
//! Spent amounts are derived at query time: the expense snapshot is windowed
//! to the current budget period and narrowed to the budget's category, then
//! summed. Nothing is persisted.

use serde::Serialize;
use time::Date;

use crate::{
    analytics::{
        filter::{DateRange, ExpenseFilter, filter_expenses},
        period::period_start,
        summarize,
    },
    expense::Expense,
};

use super::Budget;

/// How far through its cap a budget is, as of a given day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    /// The amount spent in the budget's category since the start of the
    /// current period.
    pub spent: f64,
    /// `spent / cap * 100`, unclamped. Clamping to `[0, 100]` is a display
    /// concern for progress-bar widths, not part of the figure itself.
    pub percentage: f64,
    /// Whether spending strictly exceeds the cap.
    pub over_budget: bool,
}

/// Evaluate a budget against an expense snapshot.
///
/// A zero-cap budget would make the percentage undefined, so it is
/// special-cased: `percentage` is reported as zero and `over_budget` is true
/// whenever anything at all was spent.
pub fn evaluate_budget(budget: &Budget, expenses: &[Expense], today: Date) -> BudgetStatus {
    let start = period_start(today, budget.period);
    let filter = ExpenseFilter {
        category: Some(budget.category.as_ref().to_string()),
        date_range: DateRange::Since(start),
        ..Default::default()
    };

    let spent = summarize(&filter_expenses(expenses, &filter, today)).total;

    let percentage = if budget.amount > 0.0 {
        spent / budget.amount * 100.0
    } else {
        0.0
    };

    BudgetStatus {
        spent,
        percentage,
        over_budget: spent > budget.amount,
    }
}

#[cfg(test)]
mod evaluate_budget_tests {
    use time::macros::date;

    use crate::{
        budget::{Budget, Period},
        expense::{CategoryName, test_fixtures::expense_fixture},
    };

    use super::evaluate_budget;

    fn monthly_food_budget(amount: f64) -> Budget {
        Budget {
            id: 1,
            category: CategoryName::new_unchecked("Food"),
            amount,
            period: Period::Monthly,
        }
    }

    #[test]
    fn monthly_budget_sums_current_month_spending_in_category() {
        let expenses = vec![
            expense_fixture(1, 50.0, "Food", "", date!(2024 - 01 - 05)),
            expense_fixture(2, 30.0, "Food", "", date!(2024 - 01 - 20)),
            expense_fixture(3, 100.0, "Transport", "", date!(2024 - 01 - 10)),
        ];
        let budget = monthly_food_budget(100.0);

        let status = evaluate_budget(&budget, &expenses, date!(2024 - 01 - 25));

        assert_eq!(status.spent, 80.0);
        assert_eq!(status.percentage, 80.0);
        assert!(!status.over_budget);
    }

    #[test]
    fn spending_before_the_period_start_is_excluded() {
        let expenses = vec![
            expense_fixture(1, 500.0, "Food", "", date!(2023 - 12 - 31)),
            expense_fixture(2, 30.0, "Food", "", date!(2024 - 01 - 20)),
        ];
        let budget = monthly_food_budget(100.0);

        let status = evaluate_budget(&budget, &expenses, date!(2024 - 01 - 25));

        assert_eq!(status.spent, 30.0);
    }

    #[test]
    fn weekly_budget_starts_on_sunday() {
        // 2024-01-25 is a Thursday; the week started on Sunday 2024-01-21.
        let expenses = vec![
            expense_fixture(1, 40.0, "Food", "", date!(2024 - 01 - 20)),
            expense_fixture(2, 25.0, "Food", "", date!(2024 - 01 - 21)),
            expense_fixture(3, 15.0, "Food", "", date!(2024 - 01 - 24)),
        ];
        let budget = Budget {
            id: 1,
            category: CategoryName::new_unchecked("Food"),
            amount: 50.0,
            period: Period::Weekly,
        };

        let status = evaluate_budget(&budget, &expenses, date!(2024 - 01 - 25));

        assert_eq!(status.spent, 40.0);
        assert_eq!(status.percentage, 80.0);
        assert!(!status.over_budget);
    }

    #[test]
    fn over_budget_when_spending_exceeds_cap() {
        let expenses = vec![expense_fixture(1, 150.0, "Food", "", date!(2024 - 01 - 05))];
        let budget = monthly_food_budget(100.0);

        let status = evaluate_budget(&budget, &expenses, date!(2024 - 01 - 25));

        assert_eq!(status.spent, 150.0);
        assert_eq!(status.percentage, 150.0);
        assert!(status.over_budget);
    }

    #[test]
    fn exactly_at_cap_is_not_over_budget() {
        let expenses = vec![expense_fixture(1, 100.0, "Food", "", date!(2024 - 01 - 05))];
        let budget = monthly_food_budget(100.0);

        let status = evaluate_budget(&budget, &expenses, date!(2024 - 01 - 25));

        assert!(!status.over_budget);
    }

    #[test]
    fn empty_snapshot_is_zero_percent_and_under_budget() {
        let budget = monthly_food_budget(100.0);

        let status = evaluate_budget(&budget, &[], date!(2024 - 01 - 25));

        assert_eq!(status.spent, 0.0);
        assert_eq!(status.percentage, 0.0);
        assert!(!status.over_budget);
    }

    #[test]
    fn zero_cap_reports_zero_percentage_not_a_division_error() {
        let expenses = vec![expense_fixture(1, 10.0, "Food", "", date!(2024 - 01 - 05))];
        let budget = monthly_food_budget(0.0);

        let status = evaluate_budget(&budget, &expenses, date!(2024 - 01 - 25));

        assert_eq!(status.percentage, 0.0);
        assert!(status.over_budget);

        let status = evaluate_budget(&budget, &[], date!(2024 - 01 - 25));

        assert_eq!(status.percentage, 0.0);
        assert!(!status.over_budget);
    }

    #[test]
    fn percentage_is_not_clamped() {
        let expenses = vec![expense_fixture(1, 250.0, "Food", "", date!(2024 - 01 - 05))];
        let budget = monthly_food_budget(100.0);

        let status = evaluate_budget(&budget, &expenses, date!(2024 - 01 - 25));

        assert_eq!(status.percentage, 250.0);
    }
}
