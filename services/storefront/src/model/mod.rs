mod content;
mod coupon;
mod order;
mod partner;
mod payout;
mod product;

pub use content::{
    ContentSectionModel, ContentValue, ContentValueKind, ShippingRateModel, content_section_schema,
};
pub use coupon::{CouponDiscountModel, CouponModel, CouponRejectReason};
pub use order::{
    ContactSnapshotModel, OrderLineModel, OrderModel, OrderStatus, PaymentMethod,
};
pub use partner::{CommissionPolicyModel, PartnerModel};
pub use payout::{
    BankAccountModel, PayoutDetailsModel, PayoutMethod, PayoutRequestModel, PayoutState,
};
pub use product::{ProductCollectionFlags, ProductModel, ProductStatus};
