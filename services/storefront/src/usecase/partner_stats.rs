use std::boxed::Box;
use std::result::Result as DefaultResult;

use chrono::{DateTime, Datelike, FixedOffset, NaiveTime};
use rust_decimal::Decimal;

use crate::api::web::dto::{
    MonthlyStatsDto, PartnerReferredOrderDto, PartnerStatsDto, PartnerStatsHeadDto,
};
use crate::model::OrderModel;
use crate::repository::{AbsOrderRepo, AbsPartnerRepo, AbsPayoutRepo};
use crate::usecase::manage_partner::PartnerUcError;
use crate::usecase::payout_flow::available_balance;

const NUM_RECENT_ORDERS: usize = 10;

pub struct PartnerStatsUseCase {
    pub repo_partner: Box<dyn AbsPartnerRepo>,
    pub repo_order: Box<dyn AbsOrderRepo>,
    pub repo_payout: Box<dyn AbsPayoutRepo>,
}

impl PartnerStatsUseCase {
    pub async fn execute(
        self,
        partner_id: &str,
        now: DateTime<FixedOffset>,
    ) -> DefaultResult<PartnerStatsDto, PartnerUcError> {
        let partner = self
            .repo_partner
            .fetch(partner_id)
            .await?
            .ok_or(PartnerUcError::NotFound)?;
        let all_referred = self
            .repo_order
            .fetch_by_partner_code(partner.partner_code.as_str(), None)
            .await?;
        let month_start = first_instant_of_month(now);
        let monthly = {
            let in_month = all_referred
                .iter()
                .filter(|o| o.created_at >= month_start)
                .collect::<Vec<_>>();
            MonthlyStatsDto {
                orders_this_month: in_month.len() as u64,
                sales_this_month: in_month.iter().map(|o| o.amount).sum(),
                commission_this_month: in_month
                    .iter()
                    .filter_map(|o| o.partner_commission)
                    .sum::<Decimal>(),
            }
        };
        let recent_orders = all_referred
            .into_iter()
            .take(NUM_RECENT_ORDERS)
            .map(to_referred_dto)
            .collect::<Vec<_>>();
        let balance = available_balance(&partner, self.repo_payout.as_ref()).await?;
        Ok(PartnerStatsDto {
            partner: PartnerStatsHeadDto {
                name: partner.name.clone(),
                code: partner.partner_code.clone(),
                commission_type: partner.commission.type_label().to_string(),
                commission_value: partner.commission.value(),
            },
            total_orders: partner.total_orders,
            total_sales: partner.total_sales,
            total_commission: partner.total_commission,
            available_balance: balance,
            recent_orders,
            monthly_stats: monthly,
        })
    } // end of fn execute
} // end of impl PartnerStatsUseCase

fn to_referred_dto(o: OrderModel) -> PartnerReferredOrderDto {
    PartnerReferredOrderDto {
        order_id: o.order_id,
        amount: o.amount,
        commission: o.partner_commission,
        date: o.created_at,
        status: o.status.as_str().to_string(),
    }
}

fn first_instant_of_month(now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let first_day = now.date_naive().with_day(1).unwrap_or(now.date_naive());
    let midnight = NaiveTime::from_hms_opt(0, 0, 0).unwrap_or_default();
    first_day
        .and_time(midnight)
        .and_local_timezone(*now.offset())
        .single()
        .unwrap_or(now)
}
