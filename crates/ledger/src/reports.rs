//! Monthly reporting aggregator.
//!
//! [`rollup`] is a pure function over already-fetched ledger entries so it
//! can be tested without a database; `Ledger::monthly_summary` does the
//! fetch and delegates here.
//!
//! Cost of goods sold uses the most recent purchase unit cost for the
//! product **at the time of the sale**, not the globally-latest cost, so a
//! later price change never rewrites the profit of an earlier month.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EntryKind, Expense, LedgerEntry, Money, PaymentMode};

/// Aggregated figures for one calendar month.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRollup {
    pub year: i32,
    /// 1-based calendar month.
    pub month: u32,
    pub investment_cash: Money,
    pub investment_credit: Money,
    pub revenue_cash: Money,
    pub revenue_credit: Money,
    pub items_sold: i64,
    pub cost_of_goods_sold: Money,
    /// `revenue - cost_of_goods_sold`.
    pub profit: Money,
}

impl MonthRollup {
    fn empty(year: i32, month: u32) -> Self {
        Self {
            year,
            month,
            investment_cash: Money::ZERO,
            investment_credit: Money::ZERO,
            revenue_cash: Money::ZERO,
            revenue_credit: Money::ZERO,
            items_sold: 0,
            cost_of_goods_sold: Money::ZERO,
            profit: Money::ZERO,
        }
    }

    pub fn investment_total(&self) -> Money {
        self.investment_cash + self.investment_credit
    }

    pub fn revenue_total(&self) -> Money {
        self.revenue_cash + self.revenue_credit
    }
}

fn month_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}

/// Unit-cost history per product, sorted by purchase time ascending.
fn cost_history(entries: &[LedgerEntry]) -> HashMap<Uuid, Vec<(DateTime<Utc>, Money)>> {
    let mut history: HashMap<Uuid, Vec<(DateTime<Utc>, Money)>> = HashMap::new();
    for entry in entries {
        if entry.kind != EntryKind::Purchase || !entry.active {
            continue;
        }
        for item in &entry.line_items {
            history
                .entry(item.product_id)
                .or_default()
                .push((entry.created_at, item.unit_price));
        }
    }
    for costs in history.values_mut() {
        costs.sort_by_key(|(at, _)| *at);
    }
    history
}

/// Most recent cost at or before `sold_at`, if the product was ever
/// purchased by then.
fn cost_at(
    history: &HashMap<Uuid, Vec<(DateTime<Utc>, Money)>>,
    product_id: Uuid,
    sold_at: DateTime<Utc>,
) -> Option<Money> {
    history.get(&product_id).and_then(|costs| {
        costs
            .iter()
            .rev()
            .find(|(at, _)| *at <= sold_at)
            .map(|(_, cost)| *cost)
    })
}

/// Aggregates `entries` into one rollup per calendar month in
/// `[start, end]`, ascending. Months without activity are emitted with
/// zeroed figures. Cancelled entries are excluded; purchases before
/// `start` still contribute to the cost basis of later sales.
pub fn rollup(start: NaiveDate, end: NaiveDate, entries: &[LedgerEntry]) -> Vec<MonthRollup> {
    if end < start {
        return Vec::new();
    }

    let history = cost_history(entries);

    let mut months: Vec<MonthRollup> = Vec::new();
    let (mut year, mut month) = month_key(start);
    let last = month_key(end);
    loop {
        months.push(MonthRollup::empty(year, month));
        if (year, month) == last {
            break;
        }
        (year, month) = next_month(year, month);
    }

    let in_range = |date: NaiveDate| date >= start && date <= end;

    for entry in entries {
        if !entry.active {
            continue;
        }
        let date = entry.created_at.date_naive();
        if !in_range(date) {
            continue;
        }
        let key = month_key(date);
        let Some(slot) = months.iter_mut().find(|m| (m.year, m.month) == key) else {
            continue;
        };

        match entry.kind {
            EntryKind::Purchase => match entry.payment_mode {
                PaymentMode::Cash => slot.investment_cash += entry.principal,
                PaymentMode::Credit => slot.investment_credit += entry.principal,
            },
            EntryKind::Sale => {
                match entry.payment_mode {
                    PaymentMode::Cash => slot.revenue_cash += entry.principal,
                    PaymentMode::Credit => slot.revenue_credit += entry.principal,
                }
                for item in &entry.line_items {
                    slot.items_sold += item.quantity;
                    if let Some(cost) = cost_at(&history, item.product_id, entry.created_at)
                        && let Some(total) = cost.checked_mul_qty(item.quantity)
                    {
                        slot.cost_of_goods_sold += total;
                    }
                }
            }
        }
    }

    for slot in &mut months {
        slot.profit = slot.revenue_total() - slot.cost_of_goods_sold;
    }

    months
}

/// Per-month operating-expense total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseMonthTotal {
    pub year: i32,
    /// 1-based calendar month.
    pub month: u32,
    pub total: Money,
}

/// Sums `expenses` per calendar month, newest month first. Months with no
/// expenses are simply absent; expenses are kept out of [`rollup`] because
/// they have no cost basis or payment mode to attribute.
pub fn expense_totals(expenses: &[Expense]) -> Vec<ExpenseMonthTotal> {
    let mut totals: Vec<ExpenseMonthTotal> = Vec::new();
    for expense in expenses {
        let (year, month) = month_key(expense.spent_at);
        match totals
            .iter_mut()
            .find(|t| (t.year, t.month) == (year, month))
        {
            Some(slot) => slot.total += expense.amount,
            None => totals.push(ExpenseMonthTotal {
                year,
                month,
                total: expense.amount,
            }),
        }
    }
    totals.sort_by(|a, b| (b.year, b.month).cmp(&(a.year, a.month)));
    totals
}
