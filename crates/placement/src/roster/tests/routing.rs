use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::response::IntoResponse;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::allocation::Preference;
use crate::roster::payload::SaveRequest;
use crate::roster::router::{save_handler, viewer_handler};
use crate::roster::{roster_router, InMemoryRosterStore, RosterService};

fn post_save(body: serde_json::Value) -> Request<Body> {
    Request::post("/api/save")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("body encodes")))
        .expect("request builds")
}

#[tokio::test]
async fn data_route_returns_config_and_users() {
    let router = router_with_store(InMemoryRosterStore::new(snapshot()));

    let response = router
        .oneshot(Request::get("/api/data").body(Body::empty()).expect("request builds"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["config"][0],
        json!({ "label": "ICU", "regular": 1, "bound": 1 })
    );
    let users = payload["users"].as_array().expect("users array");
    assert_eq!(users.len(), 3);
    assert_eq!(users[0]["name"], json!("Bob"));
    assert_eq!(users[0]["rank"], json!(2));
    assert_eq!(users[0]["password"], json!("456"));
    assert_eq!(users[2]["preAssigned"], json!("ICU(綁定)"));
    assert_eq!(
        users[1]["preferences"],
        json!([{ "label": "ICU", "isBound": false }])
    );
}

#[tokio::test]
async fn save_route_accepts_preference_lists() {
    let router = router_with_store(InMemoryRosterStore::new(snapshot()));

    let response = router
        .oneshot(post_save(json!({
            "name": "Alice",
            "preferences": [{ "label": "ER", "isBound": false }]
        })))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json_body(response).await, json!({ "success": true }));
}

#[tokio::test]
async fn save_route_rejects_missing_name() {
    let router = router_with_store(InMemoryRosterStore::new(snapshot()));

    let response = router
        .oneshot(post_save(json!({ "preferences": [] })))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["success"], json!(false));
    assert!(payload["error"].as_str().is_some());
}

#[tokio::test]
async fn save_handler_returns_not_found_for_unknown_name() {
    let (service, _) = build_service();

    let response = save_handler(
        State(Arc::new(service)),
        axum::Json(SaveRequest::new("Zed", vec![Preference::regular("ER")])),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn save_handler_returns_internal_error_when_store_is_down() {
    let service = Arc::new(RosterService::new(Arc::new(UnavailableStore)));

    let response = save_handler(
        State(service),
        axum::Json(SaveRequest::new("Alice", Vec::new())),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert_eq!(payload["success"], json!(false));
}

#[tokio::test]
async fn allocation_route_reports_placements_in_claim_order() {
    let router = router_with_store(InMemoryRosterStore::new(snapshot()));

    let response = router
        .oneshot(
            Request::get("/api/allocation")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let placements = payload["placements"].as_array().expect("placements");
    assert_eq!(placements[0]["name"], json!("Alice"));
    assert_eq!(
        placements[0]["assignment"],
        json!({ "label": "ICU", "isBound": false })
    );
    assert_eq!(placements[1]["outcome"], json!({ "kind": "preference", "choice": 1 }));
    assert_eq!(placements[2]["preAssigned"], json!(true));
    assert_eq!(payload["residual"]["ICU-regular"], json!(0));
    assert_eq!(payload["residual"]["ICU-bound"], json!(1));
}

#[tokio::test]
async fn viewer_handler_returns_not_found_for_unknown_name() {
    let (service, _) = build_service();

    let response = viewer_handler(
        State(Arc::new(service)),
        axum::extract::Path("Nobody".to_string()),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .is_some_and(|message| message.contains("Nobody")));
}

#[tokio::test]
async fn read_routes_report_store_outages_as_json_errors() {
    let service = Arc::new(RosterService::new(Arc::new(UnavailableStore)));

    for uri in ["/api/data", "/api/allocation", "/api/allocation/Alice"] {
        let response = roster_router(service.clone())
            .oneshot(Request::get(uri).body(Body::empty()).expect("request builds"))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        let payload = read_json_body(response).await;
        assert!(payload["error"]
            .as_str()
            .is_some_and(|message| message.contains("sheet offline")));
    }
}

#[tokio::test]
async fn viewer_route_includes_projected_capacity() {
    let router = router_with_store(InMemoryRosterStore::new(snapshot()));

    let response = router
        .oneshot(
            Request::get("/api/allocation/Cara")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["placement"]["outcome"], json!({ "kind": "pre_assigned" }));
    assert_eq!(payload["capacityBefore"]["ICU-regular"], json!(0));
    assert_eq!(payload["capacityBefore"]["ER-regular"], json!(1));
}
