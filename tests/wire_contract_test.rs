//! Wire-format contract tests.
//!
//! The JSON surface is camelCase and the oracle request/response shapes
//! follow the CoinGecko simple-price API. These tests pin both contracts
//! with self-contained structures so a serializer change cannot slip
//! through unnoticed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HoldingPayload {
    id: String,
    name: String,
    balance: String,
    fiat_balance: String,
    created_date: String,
    profit_percentage: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionPayload {
    id: String,
    holding_id: String,
    asset_amount: String,
    fiat_amount: String,
    purchase_date: String,
    created_date: String,
}

#[derive(Debug, Deserialize)]
struct SimplePriceQuote {
    usd: f64,
}

#[test]
fn test_holding_payload_field_names() {
    let payload = HoldingPayload {
        id: "b4f9f3a0-0000-0000-0000-000000000000".into(),
        name: "bitcoin".into(),
        balance: "1".into(),
        fiat_balance: "60000".into(),
        created_date: "2024-05-01T10:30:00+00:00".into(),
        profit_percentage: Some(1.6667),
    };

    let json = serde_json::to_value(&payload).unwrap();
    assert!(json.get("fiatBalance").is_some());
    assert!(json.get("createdDate").is_some());
    assert!(json.get("profitPercentage").is_some());
    assert!(json.get("fiat_balance").is_none());
}

#[test]
fn test_transaction_payload_field_names() {
    let payload = TransactionPayload {
        id: "b4f9f3a0-0000-0000-0000-000000000001".into(),
        holding_id: "b4f9f3a0-0000-0000-0000-000000000000".into(),
        asset_amount: "10".into(),
        fiat_amount: "10".into(),
        purchase_date: "2024-05-01T10:30:00+00:00".into(),
        created_date: "2024-05-01T10:30:00+00:00".into(),
    };

    let json = serde_json::to_value(&payload).unwrap();
    assert!(json.get("holdingId").is_some());
    assert!(json.get("assetAmount").is_some());
    assert!(json.get("fiatAmount").is_some());
    assert!(json.get("purchaseDate").is_some());
}

#[test]
fn test_oracle_response_shape() {
    // Symbols the provider does not recognize are simply absent.
    let body = r#"{"bitcoin": {"usd": 61000.0}, "ethereum": {"usd": 2500.5}}"#;
    let parsed: HashMap<String, SimplePriceQuote> = serde_json::from_str(body).unwrap();

    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed["bitcoin"].usd, 61000.0);
    assert!(!parsed.contains_key("dogecoin"));
}

#[test]
fn test_oracle_request_ids_are_comma_joined() {
    let names = vec!["bitcoin".to_string(), "ethereum".to_string()];
    assert_eq!(names.join(","), "bitcoin,ethereum");
}
