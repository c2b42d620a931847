use std::result::Result as DefaultResult;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use rand::Rng;
use rust_decimal::Decimal;

use ecommerce_common::error::AppErrorCode;

use crate::api::web::dto::{CustomerContactDto, OrderDto, OrderItemDto};
use crate::constant::ORDER_ID_PREFIX;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Processing,
    Shipped,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}
impl FromStr for OrderStatus {
    type Err = AppError;
    fn from_str(s: &str) -> DefaultResult<Self, Self::Err> {
        match s {
            "Processing" => Ok(Self::Processing),
            "Shipped" => Ok(Self::Shipped),
            "Out for Delivery" => Ok(Self::OutForDelivery),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            _others => Err(AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(format!("order-status:{s}")),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Online,
    CashOnDelivery,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::CashOnDelivery => "cod",
        }
    }
}
impl FromStr for PaymentMethod {
    type Err = AppError;
    fn from_str(s: &str) -> DefaultResult<Self, Self::Err> {
        match s {
            "online" => Ok(Self::Online),
            "cod" => Ok(Self::CashOnDelivery),
            _others => Err(AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(format!("payment-method:{s}")),
            }),
        }
    }
}

// denormalized copy captured at checkout, not a foreign key into any
// customer table
#[derive(Debug, Clone)]
pub struct ContactSnapshotModel {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

#[derive(Debug, Clone)]
pub struct OrderLineModel {
    pub product_id: Option<String>,
    pub name: String,
    // price captured at purchase time, not re-derived from the catalog
    pub unit_price: Decimal,
    pub quantity: u32,
    pub image: Option<String>,
}

impl OrderLineModel {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

impl From<CustomerContactDto> for ContactSnapshotModel {
    fn from(value: CustomerContactDto) -> Self {
        Self {
            name: value.name,
            email: value.email,
            phone: value.phone,
            address: value.address,
            city: value.city,
            state: value.state,
            pincode: value.pincode,
        }
    }
}
impl From<ContactSnapshotModel> for CustomerContactDto {
    fn from(value: ContactSnapshotModel) -> Self {
        Self {
            name: value.name,
            email: value.email,
            phone: value.phone,
            address: value.address,
            city: value.city,
            state: value.state,
            pincode: value.pincode,
        }
    }
}

impl From<OrderItemDto> for OrderLineModel {
    fn from(value: OrderItemDto) -> Self {
        Self {
            product_id: value.id,
            name: value.name,
            unit_price: value.price,
            quantity: value.quantity,
            image: value.image,
        }
    }
}
impl From<OrderLineModel> for OrderItemDto {
    fn from(value: OrderLineModel) -> Self {
        Self {
            id: value.product_id,
            name: value.name,
            price: value.unit_price,
            quantity: value.quantity,
            image: value.image,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderModel {
    pub order_id: String,
    pub customer: ContactSnapshotModel,
    pub lines: Vec<OrderLineModel>,
    pub amount: Decimal, // grand total actually charged
    pub shipping_fee: Decimal,
    pub discount: Decimal,
    pub coupon_code: Option<String>,
    pub partner_code: Option<String>,
    pub partner_commission: Option<Decimal>,
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
    pub courier_name: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

impl OrderModel {
    // human-readable id shown to buyers, the generator is random and NOT
    // collision-checked, duplicate detection happens at the persistence layer
    pub fn generate_order_id() -> String {
        let serial = rand::thread_rng().gen_range(10000u32..100000u32);
        format!("{ORDER_ID_PREFIX}{serial}")
    }

    pub fn lines_subtotal(&self) -> Decimal {
        self.lines.iter().map(OrderLineModel::subtotal).sum()
    }

    /// the client-computed grand total must equal
    /// sum(line price x quantity) + shipping - discount
    pub fn verify_amount(&self) -> DefaultResult<(), AppError> {
        let expect = self.lines_subtotal() + self.shipping_fee - self.discount;
        if self.amount == expect {
            Ok(())
        } else {
            let detail = format!("order-amount, given:{}, expect:{}", self.amount, expect);
            Err(AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(detail),
            })
        }
    }
} // end of impl OrderModel

impl From<OrderModel> for OrderDto {
    fn from(value: OrderModel) -> OrderDto {
        OrderDto {
            order_id: value.order_id,
            customer: value.customer.into(),
            items: value.lines.into_iter().map(OrderItemDto::from).collect(),
            amount: value.amount,
            shipping_fee: value.shipping_fee,
            discount: value.discount,
            coupon_code: value.coupon_code,
            partner_code: value.partner_code,
            partner_commission: value.partner_commission,
            payment_method: value.payment_method.as_str().to_string(),
            transaction_id: value.transaction_id,
            status: value.status.as_str().to_string(),
            tracking_number: value.tracking_number,
            courier_name: value.courier_name,
            date: value.created_at,
        }
    }
}
