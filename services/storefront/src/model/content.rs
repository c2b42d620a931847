use std::collections::HashMap;
use std::result::Result as DefaultResult;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde_json::Value as JsnVal;

use ecommerce_common::error::AppErrorCode;

use crate::constant::{DEFAULT_FREE_SHIPPING_ABOVE, DEFAULT_SHIPPING_FLAT_RATE};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub enum ContentValue {
    Text(String),
    Json(JsnVal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentValueKind {
    Text,
    Json,
    Any,
}

impl From<JsnVal> for ContentValue {
    fn from(value: JsnVal) -> Self {
        match value {
            JsnVal::String(s) => Self::Text(s),
            _others => Self::Json(_others),
        }
    }
}
impl From<ContentValue> for JsnVal {
    fn from(value: ContentValue) -> JsnVal {
        match value {
            ContentValue::Text(s) => JsnVal::String(s),
            ContentValue::Json(v) => v,
        }
    }
}

impl ContentValue {
    fn kind_matches(&self, kind: &ContentValueKind) -> bool {
        match kind {
            ContentValueKind::Any => true,
            ContentValueKind::Text => matches!(self, Self::Text(_)),
            ContentValueKind::Json => matches!(self, Self::Json(_)),
        }
    }
}

// editable marketing sections rendered on the public site, each name is
// registered with the value kind its keys accept, free-form section names
// are rejected at write time
const KNOWN_SECTIONS: [(&str, ContentValueKind); 7] = [
    ("home-hero", ContentValueKind::Any),
    ("banners", ContentValueKind::Json),
    ("about-story", ContentValueKind::Any),
    ("footer", ContentValueKind::Text),
    ("announcement", ContentValueKind::Text),
    ("legal", ContentValueKind::Text),
    ("shipping-rates", ContentValueKind::Json),
];

pub fn content_section_schema(section: &str) -> Option<ContentValueKind> {
    KNOWN_SECTIONS
        .iter()
        .find(|(name, _)| *name == section)
        .map(|(_, kind)| *kind)
}

pub struct ContentSectionModel {
    pub section: String,
    pub entries: HashMap<String, ContentValue>,
    pub updated_at: DateTime<FixedOffset>,
}

impl ContentSectionModel {
    pub fn validate_write(
        section: &str,
        entries: &HashMap<String, ContentValue>,
    ) -> DefaultResult<(), AppError> {
        let kind = content_section_schema(section).ok_or(AppError {
            code: AppErrorCode::InvalidInput,
            detail: Some(format!("unknown-content-section:{section}")),
        })?;
        if entries.is_empty() {
            return Err(AppError {
                code: AppErrorCode::EmptyInputData,
                detail: Some(format!("content-section:{section}")),
            });
        }
        let mut mismatched = entries.iter().filter(|(_k, v)| !v.kind_matches(&kind));
        if let Some((k, _v)) = mismatched.next() {
            Err(AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(format!("content-value-kind, section:{section}, key:{k}")),
            })
        } else {
            Ok(())
        }
    }

    pub fn merge_entries(&mut self, updates: HashMap<String, ContentValue>) {
        for (k, v) in updates {
            let _prev = self.entries.insert(k, v);
        }
    }
} // end of impl ContentSectionModel

// flat-rate-or-free-over-threshold policy, editable through the
// `shipping-rates` section
pub struct ShippingRateModel {
    pub flat_rate: Decimal,
    pub free_above: Decimal,
}

impl Default for ShippingRateModel {
    fn default() -> Self {
        Self {
            flat_rate: Decimal::from(DEFAULT_SHIPPING_FLAT_RATE),
            free_above: Decimal::from(DEFAULT_FREE_SHIPPING_ABOVE),
        }
    }
}

impl From<&ContentSectionModel> for ShippingRateModel {
    fn from(value: &ContentSectionModel) -> Self {
        let mut out = Self::default();
        let read_num = |key: &str| -> Option<Decimal> {
            match value.entries.get(key) {
                Some(ContentValue::Json(v)) => v.as_f64().and_then(Decimal::from_f64_retain),
                _others => None,
            }
        };
        if let Some(v) = read_num("flat_rate") {
            out.flat_rate = v;
        }
        if let Some(v) = read_num("free_above") {
            out.free_above = v;
        }
        out
    }
}

impl ShippingRateModel {
    pub fn fee_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal > self.free_above {
            Decimal::ZERO
        } else {
            self.flat_rate
        }
    }
}
