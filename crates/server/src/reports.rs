//! Monthly financial summary endpoint.

use api_types::report::{MonthRollupView, MonthlyParams, MonthlyResponse};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{ServerError, server::ServerState, user};

pub async fn monthly(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<MonthlyParams>,
) -> Result<Json<MonthlyResponse>, ServerError> {
    let months = state
        .ledger
        .monthly_summary(params.start, params.end)
        .await?
        .into_iter()
        .map(|rollup| MonthRollupView {
            year: rollup.year,
            month: rollup.month,
            investment_cash_minor: rollup.investment_cash.cents(),
            investment_credit_minor: rollup.investment_credit.cents(),
            revenue_cash_minor: rollup.revenue_cash.cents(),
            revenue_credit_minor: rollup.revenue_credit.cents(),
            items_sold: rollup.items_sold,
            cost_of_goods_sold_minor: rollup.cost_of_goods_sold.cents(),
            profit_minor: rollup.profit.cents(),
        })
        .collect();

    Ok(Json(MonthlyResponse { months }))
}
