use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{NaiveDate, NaiveTime, Utc};
use encore_api::middleware::Claims;
use encore_api::{app, AppState, AuthConfig};
use encore_booking::BookingService;
use encore_catalog::{CatalogManager, Event, EventType, Venue};
use encore_notify::{LogEmailTransport, NotificationDispatcher, PdfTicketRenderer};
use encore_shared::Role;
use encore_store::FileStore;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower::ServiceExt;
use uuid::Uuid;

const JWT_SECRET: &str = "integration-test-secret";

struct TestApp {
    router: axum::Router,
    event_id: Uuid,
}

fn test_app() -> TestApp {
    let mut catalog = CatalogManager::new();
    let venue = Venue::with_rows(
        "Chamber Stage".into(),
        "Intimate performance space".into(),
        "Kyustendil".into(),
        &[12, 13, 14, 13, 13, 13, 9, 9],
    )
    .unwrap();
    let venue_id = catalog.add_venue(venue);
    let event_id = catalog
        .add_event(Event {
            id: Uuid::new_v4(),
            title: "Hamlet".into(),
            event_type: EventType::Performance,
            date: NaiveDate::from_ymd_opt(2030, 6, 14).unwrap(),
            time: NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
            venue_id,
            company: "Drama Theatre".into(),
            description: String::new(),
            image_url: None,
            is_featured: false,
            price: "15 EUR".into(),
            tags: vec![],
        })
        .unwrap();

    let dispatcher = Arc::new(NotificationDispatcher::new(
        Arc::new(PdfTicketRenderer),
        Arc::new(LogEmailTransport),
    ));
    let booking = BookingService::new(dispatcher.clone(), chrono::Duration::minutes(5));

    let data_dir = std::env::temp_dir().join(format!("encore-api-test-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&data_dir).unwrap();

    let state = AppState {
        catalog: Arc::new(RwLock::new(catalog)),
        booking: Arc::new(Mutex::new(booking)),
        users: Arc::new(RwLock::new(Vec::new())),
        store: Arc::new(FileStore::new(data_dir)),
        dispatcher,
        auth: AuthConfig {
            secret: JWT_SECRET.into(),
            expiration: 3600,
        },
        public_url: "http://localhost:8080".into(),
    };

    TestApp {
        router: app(state),
        event_id,
    }
}

fn token_for(role: Role) -> String {
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        email: "staff@example.com".into(),
        role,
        exp: (Utc::now().timestamp() as usize) + 3600,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn authed_json_request(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_guest_booking_flow() {
    let TestApp { router, event_id } = test_app();

    // Seat map covers the full Chamber Stage plan.
    let res = router
        .clone()
        .oneshot(
            Request::get(format!("/v1/events/{}/seats", event_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let map = body_json(res).await;
    assert_eq!(map["capacity"], 96);
    assert_eq!(map["seats"].as_array().unwrap().len(), 96);

    // First hold opens a session.
    let res = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/v1/events/{}/holds", event_id),
            json!({ "seat": "3-1" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let hold = body_json(res).await;
    let session_id = hold["session_id"].as_str().unwrap().to_string();

    // Second seat joins the same session.
    let res = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/v1/events/{}/holds", event_id),
            json!({ "session_id": session_id, "seat": "3-2" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let hold = body_json(res).await;
    assert_eq!(hold["seats"], json!(["3-1", "3-2"]));

    // Confirm as Ana Ivanova.
    let res = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/v1/events/{}/bookings", event_id),
            json!({
                "session_id": session_id,
                "customer": {
                    "first_name": "Ana",
                    "last_name": "Ivanova",
                    "email": "ana@example.com"
                }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let booking = body_json(res).await;
    let reference = booking["booking_reference"].as_str().unwrap().to_string();
    assert!(reference.starts_with("AE-"));
    assert_eq!(reference.len(), "AE-123456-123".len());
    assert_eq!(booking["status"], "CONFIRMED");

    // Lookup by reference is public.
    let res = router
        .clone()
        .oneshot(
            Request::get(format!("/v1/bookings?reference={}", reference))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let found = body_json(res).await;
    assert_eq!(found[0]["seats"], json!(["3-1", "3-2"]));

    // The booked seats show up on the map.
    let res = router
        .clone()
        .oneshot(
            Request::get(format!("/v1/events/{}/seats", event_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let map = body_json(res).await;
    let booked: Vec<&Value> = map["seats"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["status"] == "booked")
        .collect();
    assert_eq!(booked.len(), 2);
}

#[tokio::test]
async fn test_competing_hold_conflicts() {
    let TestApp { router, event_id } = test_app();

    let res = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/v1/events/{}/holds", event_id),
            json!({ "seat": "1-5" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // A different session asking for the same seat gets a conflict.
    let res = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/v1/events/{}/holds", event_id),
            json!({ "seat": "1-5" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_hold_on_missing_seat_is_not_found() {
    let TestApp { router, event_id } = test_app();

    // Row 3 ends at seat 14.
    let res = router
        .oneshot(json_request(
            "POST",
            &format!("/v1/events/{}/holds", event_id),
            json!({ "seat": "3-15" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_routes_are_guarded() {
    let TestApp { router, event_id } = test_app();
    let block_uri = format!("/v1/events/{}/seats/2-2/block", event_id);
    let body = json!({ "blocked": true });

    // No token.
    let res = router
        .clone()
        .oneshot(json_request("PATCH", &block_uri, body.clone()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Customer token.
    let res = router
        .clone()
        .oneshot(authed_json_request(
            "PATCH",
            &block_uri,
            &token_for(Role::Client),
            body.clone(),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Admin token blocks the seat.
    let res = router
        .clone()
        .oneshot(authed_json_request(
            "PATCH",
            &block_uri,
            &token_for(Role::Admin),
            body,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let blocked = body_json(res).await;
    assert_eq!(blocked["status"], "blocked");

    // Guests cannot hold a blocked seat.
    let res = router
        .oneshot(json_request(
            "POST",
            &format!("/v1/events/{}/holds", event_id),
            json!({ "seat": "2-2" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_login_me_flow() {
    let TestApp { router, .. } = test_app();

    let res = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/auth/register",
            json!({ "email": "ana@example.com", "password": "sufficiently-long" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let registered = body_json(res).await;
    // The first account bootstraps the admin panel.
    assert_eq!(registered["role"], "super_admin");

    let res = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/auth/login",
            json!({ "email": "ana@example.com", "password": "sufficiently-long" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let login = body_json(res).await;
    let token = login["token"].as_str().unwrap().to_string();

    let res = router
        .clone()
        .oneshot(
            Request::get("/v1/auth/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let me = body_json(res).await;
    assert_eq!(me["email"], "ana@example.com");

    // Wrong password is rejected.
    let res = router
        .oneshot(json_request(
            "POST",
            "/v1/auth/login",
            json!({ "email": "ana@example.com", "password": "wrong-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_event_crud_persists() {
    let TestApp { router, event_id } = test_app();
    let token = token_for(Role::Admin);

    // Venue id comes from the public listing.
    let res = router
        .clone()
        .oneshot(Request::get("/v1/venues").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let venues = body_json(res).await;
    let venue_id = venues[0]["id"].as_str().unwrap().to_string();

    let res = router
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/v1/events",
            &token,
            json!({
                "title": "The Cherry Orchard",
                "event_type": "performance",
                "date": "2030-06-20",
                "time": "20:00:00",
                "venue_id": venue_id,
                "company": "National Theatre",
                "price": "12 EUR"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = body_json(res).await;
    let created_id = created["id"].as_str().unwrap().to_string();

    let res = router
        .clone()
        .oneshot(Request::get("/v1/events").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let events = body_json(res).await;
    assert_eq!(events.as_array().unwrap().len(), 2);

    let res = router
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/v1/events/{}", created_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    // The seeded event is untouched.
    let res = router
        .oneshot(
            Request::get(format!("/v1/events/{}", event_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_news_edit_returns_item_and_keeps_date() {
    let TestApp { router, .. } = test_app();
    let token = token_for(Role::Admin);

    let res = router
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/v1/news",
            &token,
            json!({ "title": "Programme announced", "body": "Full line-up inside." }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = body_json(res).await;
    let id = created["id"].as_str().unwrap().to_string();
    let published_at = created["published_at"].as_str().unwrap().to_string();

    let res = router
        .clone()
        .oneshot(authed_json_request(
            "PUT",
            &format!("/v1/news/{}", id),
            &token,
            json!({ "title": "Programme updated", "body": "Two new shows." }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated = body_json(res).await;
    assert_eq!(updated["id"].as_str().unwrap(), id);
    assert_eq!(updated["title"].as_str().unwrap(), "Programme updated");
    // An edit is not a re-publication.
    assert_eq!(updated["published_at"].as_str().unwrap(), published_at);

    let res = router
        .oneshot(authed_json_request(
            "PUT",
            &format!("/v1/news/{}", id),
            &token,
            json!({ "title": "  ", "body": "empty title" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
