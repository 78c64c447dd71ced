mod common;

use axum::http::StatusCode;
use serde_json::json;

use car_rental_backend::{
    entities::notification::NotificationKind,
    services::{
        notifications::{self, NotificationHub},
        support::{self, SupportCategory, SupportPriority, SupportRequest},
    },
};
use common::{app, seed_admin, seed_customer, send, setup_db, test_state, token_for};

fn help_request() -> serde_json::Value {
    json!({
        "name": "Asha Rao",
        "email": "asha@example.com",
        "phone": "9876543210",
        "subject": "Car not ready",
        "category": "booking",
        "priority": "urgent",
        "message": "The car was not at the pickup point."
    })
}

#[tokio::test]
async fn test_signed_in_request_notifies_admin_and_sender() {
    let db = setup_db().await;
    let hub = NotificationHub::new();
    let mut feed = hub.subscribe();
    let customer = seed_customer(&db).await;

    let request = SupportRequest {
        name: "Asha Rao".to_string(),
        email: "asha@example.com".to_string(),
        phone: None,
        subject: "Refund".to_string(),
        category: SupportCategory::Payment,
        priority: SupportPriority::High,
        message: "Charged twice".to_string(),
    };
    let outcome = support::submit(&db, &hub, Some(customer.id), request).await.unwrap();

    assert_eq!(outcome.request.kind, NotificationKind::Support);
    assert_eq!(outcome.request.title, "Support Request: Refund");
    assert!(outcome.request.user_id.is_none());

    let confirmation = outcome.confirmation.unwrap();
    assert_eq!(confirmation.kind, NotificationKind::System);
    assert_eq!(confirmation.user_id, Some(customer.id));

    // Only the administrator row goes out on the live feed
    assert_eq!(feed.recv().await.unwrap().id, outcome.request.id);
    assert!(feed.try_recv().is_err());

    let admin_inbox = notifications::list(&db, None).await.unwrap();
    assert_eq!(admin_inbox.len(), 1);
    let own = notifications::list(&db, Some(customer.id)).await.unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].id, confirmation.id);
}

#[tokio::test]
async fn test_invalid_request_writes_nothing() {
    let db = setup_db().await;
    let hub = NotificationHub::new();

    let mut request: SupportRequest = serde_json::from_value(help_request()).unwrap();
    request.subject = "   ".to_string();

    let result = support::submit(&db, &hub, None, request).await;
    assert!(result.is_err());
    assert!(notifications::list(&db, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_anonymous_request_over_http() {
    let state = test_state().await;
    let admin = seed_admin(&state.db).await;
    let app = app(state);

    let (status, body) = send(&app, "POST", "/api/support", None, Some(help_request())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["confirmation"].is_null());
    assert_eq!(body["request"]["kind"], "support");

    let (_, inbox) = send(&app, "GET", "/api/admin/notifications", Some(&token_for(&admin)), None).await;
    assert_eq!(inbox["unread_count"], 1);
    let message = inbox["notifications"][0]["message"].as_str().unwrap();
    assert!(message.contains("Category: BOOKING"));
    assert!(message.contains("Priority: URGENT"));
    assert!(message.contains("Phone: 9876543210"));
}

#[tokio::test]
async fn test_request_with_missing_fields_is_rejected() {
    let app = app(test_state().await);
    let mut request = help_request();
    request["message"] = json!("");
    request["name"] = json!(" ");

    let (status, body) = send(&app, "POST", "/api/support", None, Some(request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["message"].is_array());
    assert!(body["details"]["name"].is_array());
}

#[tokio::test]
async fn test_sender_reads_own_confirmation() {
    let state = test_state().await;
    let admin = seed_admin(&state.db).await;
    let customer = seed_customer(&state.db).await;
    let token = token_for(&customer);
    let app = app(state);

    let (status, body) = send(&app, "POST", "/api/support", Some(&token), Some(help_request())).await;
    assert_eq!(status, StatusCode::OK);
    let admin_row = body["request"]["id"].as_str().unwrap().to_string();

    let (status, inbox) = send(&app, "GET", "/api/notifications", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(inbox["unread_count"], 1);
    assert_eq!(inbox["notifications"][0]["kind"], "system");
    assert_eq!(inbox["notifications"][0]["title"], "Support Request Submitted");
    let own_row = inbox["notifications"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "POST", &format!("/api/notifications/{}/read", own_row), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_read"], true);

    // Administrator rows are not the customer's to touch
    let (status, _) = send(&app, "POST", &format!("/api/notifications/{}/read", admin_row), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Nor do customer confirmations show up in the administrator inbox
    let (_, inbox) = send(&app, "GET", "/api/admin/notifications", Some(&token_for(&admin)), None).await;
    assert_eq!(inbox["notifications"].as_array().unwrap().len(), 1);
    assert_eq!(inbox["notifications"][0]["kind"], "support");
}

#[tokio::test]
async fn test_invalid_token_is_not_treated_as_anonymous() {
    let app = app(test_state().await);

    let (status, _) = send(&app, "POST", "/api/support", Some("garbage"), Some(help_request())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
