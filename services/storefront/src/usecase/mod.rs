mod edit_content;
mod login;
mod manage_coupon;
mod manage_order;
mod manage_partner;
mod manage_product;
mod notify_order;
mod partner_stats;
mod payout_flow;
mod place_order;

pub use edit_content::{ContentUcError, EditContentUseCase, FetchContentUseCase};
pub use login::{AdminLoginUseCase, LoginUcError, PartnerLoginUseCase};
pub use manage_coupon::{
    AppliedCouponUcOutput, ApplyCouponUcError, ApplyCouponUseCase, CouponUcError,
    CreateCouponUseCase, EditCouponUseCase, ListCouponsUseCase, RemoveCouponUseCase,
};
pub use manage_order::{EditOrderFulfillmentUseCase, ListOrdersUseCase, OrderEditUcError};
pub use manage_partner::{
    CreatePartnerUseCase, EditPartnerUseCase, GetPartnerUseCase, ListPartnersUseCase,
    PartnerPayoutDetailsUseCase, PartnerUcError, RemovePartnerUseCase, SetPartnerPasswordUseCase,
};
pub use manage_product::{
    CreateProductUseCase, EditProductUseCase, ListProductsUseCase, ProductUcError,
};
pub use notify_order::{dispatch_notification, SendOrderNotificationUseCase};
pub use partner_stats::PartnerStatsUseCase;
pub use payout_flow::{
    available_balance, ListAllPayoutsUseCase, PayoutHistoryUseCase, PayoutUcError,
    RequestPayoutUseCase, ReviewPayoutUseCase,
};
pub use place_order::{PlaceOrderUcError, PlaceOrderUseCase};
