//! Marketplace Flow Integration Tests
//!
//! Purpose: Verify the order and trust-safety engines cooperating over one
//! shared document store, the way the app wires them.
//!
//! Test Coverage:
//! 1. Checkout: stock check -> order placement -> counters updated
//! 2. Buyer reports a seller three times -> seller banned for 7 days
//! 3. Ban check gates access and lifts expired bans lazily
//!
//! Run: cargo test --test marketplace_flow

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use doc_store::{DocumentStore, MemoryStore, StaticAuth};
use order_service::{NewOrder, OrderLineItem, OrderPlacement, OrderService};
use trust_safety_service::{BanRecord, CreateReportInput, EnforcementService, ReportOutcome};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

fn report(reporter: &str, seller: &str, reason: &str) -> CreateReportInput {
    CreateReportInput {
        reporter_id: reporter.to_string(),
        reporter_name: format!("Buyer {}", reporter),
        reporter_role: "buyer".to_string(),
        reported_user_id: seller.to_string(),
        reported_user_name: format!("Seller {}", seller),
        reported_user_role: "seller".to_string(),
        reason: reason.to_string(),
    }
}

#[tokio::test]
async fn test_checkout_then_report_flow() {
    let store = Arc::new(MemoryStore::new());

    // Setup: the catalog owns the product documents.
    store
        .set(
            "products/p1",
            json!({"name": "Handmade Mug", "price": 18.0, "stock": 5, "sold": 2, "seller_id": "seller-1"}),
        )
        .await
        .unwrap();

    let orders = OrderService::new(store.clone(), Arc::new(StaticAuth::signed_in("buyer-1")));
    let enforcement = EnforcementService::new(store.clone());

    // Action: pre-checkout stock check, then the order itself.
    let check = orders.check_product_stock("p1", 5).await.unwrap();
    assert!(check.sufficient);

    let placement = orders
        .place_order(NewOrder::new(
            vec![OrderLineItem {
                product_id: "p1".to_string(),
                product_name: "Handmade Mug".to_string(),
                unit_price: 18.0,
                quantity: 5,
                image_url: "https://cdn.example.com/p1.jpg".to_string(),
            }],
            90.0,
            "2024-05-01",
            "2024-05-04",
        ))
        .await
        .unwrap();
    assert!(matches!(placement, OrderPlacement::Placed { .. }));

    // Assert: counters reflect the sale exactly once.
    let product = store.get("products/p1").await.unwrap().unwrap();
    assert_eq!(product["stock"], 0);
    assert_eq!(product["sold"], 7);
    assert_eq!(product["seller_id"], "seller-1", "catalog fields untouched");

    // Action: the order went sour; the buyer reports the seller three times
    // across three disputes.
    for (reporter, reason) in [
        ("buyer-1", "Item never arrived"),
        ("buyer-2", "Counterfeit goods"),
    ] {
        let outcome = enforcement
            .report_user(report(reporter, "seller-1", reason))
            .await
            .unwrap();
        assert!(matches!(outcome, ReportOutcome::Warned { .. }));
    }

    let outcome = enforcement
        .report_user(report("buyer-3", "seller-1", "Refuses refunds"))
        .await
        .unwrap();

    // Assert: third warning escalates to a 7-day ban.
    let ban = match outcome {
        ReportOutcome::WarnedAndBanned { ban } => ban,
        other => panic!("expected ban after third warning, got {:?}", other),
    };
    assert_eq!(ban.ban_duration_days, 7);
    assert_eq!(ban.ban_expires_at - ban.banned_at, 7 * DAY_MS);

    let status = enforcement
        .is_user_currently_banned("seller-1")
        .await
        .unwrap();
    assert!(status.is_banned);
    assert_eq!(status.ban_expires_at, Some(ban.ban_expires_at));

    // An unrelated user is unaffected.
    let status = enforcement
        .is_user_currently_banned("seller-2")
        .await
        .unwrap();
    assert!(!status.is_banned);
}

#[tokio::test]
async fn test_expired_ban_lifts_on_next_gate_check() {
    let store = Arc::new(MemoryStore::new());
    let enforcement = EnforcementService::new(store.clone());

    // Setup: a ban that ran out yesterday, still marked active because no
    // check has looked at it since.
    let now = Utc::now().timestamp_millis();
    store
        .set(
            "bans/seller-1",
            serde_json::to_value(BanRecord {
                user_id: "seller-1".to_string(),
                banned_at: now - 8 * DAY_MS,
                ban_expires_at: now - DAY_MS,
                ban_duration_days: 7,
                warning_count: 3,
                reason: "Item never arrived".to_string(),
                is_active: true,
            })
            .unwrap(),
        )
        .await
        .unwrap();

    // Action: the access gate asks.
    let status = enforcement
        .is_user_currently_banned("seller-1")
        .await
        .unwrap();

    // Assert: not banned, and the stored record was flipped inactive.
    assert!(!status.is_banned);
    let stored = store.get("bans/seller-1").await.unwrap().unwrap();
    assert_eq!(stored["is_active"], false);
}
