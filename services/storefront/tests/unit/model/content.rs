use std::collections::HashMap;

use rust_decimal::Decimal;
use serde_json::json;

use storefront::model::{
    content_section_schema, ContentSectionModel, ContentValue, ShippingRateModel,
};

use super::ut_now;

#[test]
fn schema_registry_known_sections() {
    assert!(content_section_schema("home-hero").is_some());
    assert!(content_section_schema("shipping-rates").is_some());
    assert!(content_section_schema("totally-made-up").is_none());
}

#[test]
fn write_rejects_unknown_section() {
    let entries = HashMap::from([(
        "title".to_string(),
        ContentValue::Text("hello".to_string()),
    )]);
    let result = ContentSectionModel::validate_write("not-a-section", &entries);
    assert!(result.is_err());
}

#[test]
fn write_rejects_kind_mismatch() {
    // footer keys accept plain text only
    let entries = HashMap::from([(
        "footer_links".to_string(),
        ContentValue::Json(json!({"home": "/"})),
    )]);
    let result = ContentSectionModel::validate_write("footer", &entries);
    assert!(result.is_err());
    let entries = HashMap::from([(
        "footer_note".to_string(),
        ContentValue::Text("certified organic since 2016".to_string()),
    )]);
    assert!(ContentSectionModel::validate_write("footer", &entries).is_ok());
}

#[test]
fn write_rejects_empty_updates() {
    let entries = HashMap::new();
    assert!(ContentSectionModel::validate_write("footer", &entries).is_err());
}

#[test]
fn merge_overwrites_per_key() {
    let mut section = ContentSectionModel {
        section: "home-hero".to_string(),
        entries: HashMap::from([
            ("title".to_string(), ContentValue::Text("old".to_string())),
            ("tagline".to_string(), ContentValue::Text("keep".to_string())),
        ]),
        updated_at: ut_now(),
    };
    section.merge_entries(HashMap::from([(
        "title".to_string(),
        ContentValue::Text("new".to_string()),
    )]));
    assert_eq!(
        section.entries.get("title"),
        Some(&ContentValue::Text("new".to_string()))
    );
    assert_eq!(
        section.entries.get("tagline"),
        Some(&ContentValue::Text("keep".to_string()))
    );
}

#[test]
fn shipping_rate_from_section() {
    let section = ContentSectionModel {
        section: "shipping-rates".to_string(),
        entries: HashMap::from([
            ("flat_rate".to_string(), ContentValue::Json(json!(80))),
            ("free_above".to_string(), ContentValue::Json(json!(999))),
        ]),
        updated_at: ut_now(),
    };
    let rate = ShippingRateModel::from(&section);
    assert_eq!(rate.flat_rate, Decimal::from(80u32));
    assert_eq!(rate.free_above, Decimal::from(999u32));
}

#[test]
fn shipping_fee_threshold() {
    let rate = ShippingRateModel::default();
    // flat 50 applies up to and including the threshold
    assert_eq!(rate.fee_for(Decimal::from(499u32)), Decimal::from(50u32));
    assert_eq!(rate.fee_for(Decimal::from(500u32)), Decimal::from(50u32));
    assert_eq!(rate.fee_for(Decimal::from(501u32)), Decimal::ZERO);
}
