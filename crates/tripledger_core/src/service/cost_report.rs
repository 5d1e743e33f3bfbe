//! Planned-vs-real cost variance report.
//!
//! # Invariants
//! - `variance_percent` is 0 when nothing was planned.
//! - Category percentages are shares of `total_real` and sum to 100 when
//!   `total_real > 0`.
//! - Category rows are ordered by subtotal DESC, then category order.

use super::ratio_or_zero;
use crate::model::expense::{Expense, ExpenseCategory, ExpenseKind};
use crate::model::trip::Trip;
use crate::model::EntityId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Real spending within one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    #[serde(rename = "categoria")]
    pub category: ExpenseCategory,
    #[serde(rename = "valorTotal")]
    pub total: f64,
    #[serde(rename = "quantidade")]
    pub count: usize,
    #[serde(rename = "percentual")]
    pub percent_of_real: f64,
    #[serde(rename = "valorMedio")]
    pub mean: f64,
}

/// Cost variance report for one trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostReport {
    #[serde(rename = "viagemId")]
    pub trip_id: EntityId,
    #[serde(rename = "totalPlanejado")]
    pub total_planned: f64,
    #[serde(rename = "totalReal")]
    pub total_real: f64,
    /// `total_real - total_planned`.
    #[serde(rename = "diferenca")]
    pub difference: f64,
    #[serde(rename = "percentualVariacao")]
    pub variance_percent: f64,
    #[serde(rename = "resumoPorCategoria")]
    pub categories: Vec<CategorySummary>,
    #[serde(rename = "custoMedioPorDia")]
    pub avg_cost_per_day: f64,
    #[serde(rename = "dataGeracao")]
    pub generated_at: DateTime<Utc>,
}

/// Builds the report from a trip and all of its expenses.
pub fn build_cost_report(
    trip: &Trip,
    expenses: &[Expense],
    generated_at: DateTime<Utc>,
) -> CostReport {
    let total_planned = sum_of_kind(expenses, ExpenseKind::Planned);
    let total_real = sum_of_kind(expenses, ExpenseKind::Real);
    let difference = total_real - total_planned;

    CostReport {
        trip_id: trip.id.clone(),
        total_planned,
        total_real,
        difference,
        variance_percent: ratio_or_zero(difference, total_planned) * 100.0,
        categories: summarize_categories(expenses, total_real),
        avg_cost_per_day: total_real / f64::from(trip.billable_days()),
        generated_at,
    }
}

fn sum_of_kind(expenses: &[Expense], kind: ExpenseKind) -> f64 {
    expenses
        .iter()
        .filter(|expense| expense.kind == kind)
        .map(|expense| expense.amount)
        .sum()
}

fn summarize_categories(expenses: &[Expense], total_real: f64) -> Vec<CategorySummary> {
    let mut grouped: BTreeMap<ExpenseCategory, (f64, usize)> = BTreeMap::new();
    for expense in expenses.iter().filter(|expense| expense.is_real()) {
        let entry = grouped.entry(expense.category).or_insert((0.0, 0));
        entry.0 += expense.amount;
        entry.1 += 1;
    }

    let mut summaries: Vec<CategorySummary> = grouped
        .into_iter()
        .map(|(category, (total, count))| CategorySummary {
            category,
            total,
            count,
            percent_of_real: ratio_or_zero(total, total_real) * 100.0,
            mean: total / count as f64,
        })
        .collect();
    // Stable sort keeps category declaration order among equal totals.
    summaries.sort_by(|left, right| right.total.total_cmp(&left.total));
    summaries
}
