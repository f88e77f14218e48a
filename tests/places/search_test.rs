use axum::http::StatusCode;
use chrono::Utc;
use serde_json::Value;

use karnya_backend::modules::places::model::{
    Address, GeoPoint, HotelDetails, HotelInput, NgoDetails, NgoInput, Place, PlaceDetails,
};

use crate::common::{test_email, TestContext};

fn place<D: PlaceDetails>(id: &str, rating: f64, location: GeoPoint, details: D) -> Place<D> {
    let now = Utc::now();
    Place {
        id: id.to_string(),
        name: format!("Place {}", id),
        description: None,
        address: Address::default(),
        phone: None,
        email: None,
        website: None,
        location,
        owner_id: "seed".to_string(),
        is_active: true,
        rating,
        total_ratings: 1,
        images: vec![],
        documents: vec![],
        details,
        created_at: now,
        updated_at: now,
    }
}

fn hotel(id: &str, rating: f64, location: GeoPoint, cuisines: &[&str]) -> Place<HotelDetails> {
    place(
        id,
        rating,
        location,
        HotelDetails::from_input(HotelInput {
            cuisine_type: Some(cuisines.iter().map(|c| c.to_string()).collect()),
            ..Default::default()
        }),
    )
}

fn pune() -> GeoPoint {
    GeoPoint::new(73.8567, 18.5204)
}

async fn seed_twelve(ctx: &TestContext) {
    for i in 0..12 {
        let h = hotel(&format!("h{:02}", i), 5.0 - i as f64 * 0.25, pune(), &["indian"]);
        ctx.storage.hotels.insert(&h).await.unwrap();
    }
}

fn ids(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn second_page_of_twelve_hotels() {
    let ctx = TestContext::new().await;
    let (token, _) = ctx.register(&test_email(), "receiver").await;
    seed_twelve(&ctx).await;

    let response = ctx
        .server
        .get("/api/hotels/search")
        .add_query_param("page", 2)
        .add_query_param("limit", 5)
        .authorization_bearer(&token)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(ids(&body), vec!["h05", "h06", "h07", "h08", "h09"]);
    assert_eq!(body["pagination"]["total"], 12);
    assert_eq!(body["pagination"]["page"], 2);
    assert_eq!(body["pagination"]["totalPages"], 3);
    assert_eq!(body["pagination"]["limit"], 5);
}

#[tokio::test]
async fn second_page_near_delhi_with_tied_ratings() {
    let ctx = TestContext::new().await;
    let (token, _) = ctx.register(&test_email(), "receiver").await;

    let delhi = GeoPoint::new(77.0, 28.0);
    for i in 0..12 {
        let h = hotel(&format!("h{:02}", i), 5.0, delhi, &["indian"]);
        ctx.storage.hotels.insert(&h).await.unwrap();
    }
    for h in [
        hotel("low-rated", 3.5, delhi, &["indian"]),
        hotel("far-away", 5.0, GeoPoint::new(77.2, 28.6), &["indian"]),
    ] {
        ctx.storage.hotels.insert(&h).await.unwrap();
    }

    let response = ctx
        .server
        .get("/api/hotels/search")
        .add_query_param("latitude", 28.0)
        .add_query_param("longitude", 77.0)
        .add_query_param("radius", 5000)
        .add_query_param("minRating", 4.0)
        .add_query_param("page", 2)
        .add_query_param("limit", 5)
        .authorization_bearer(&token)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(ids(&body), vec!["h05", "h06", "h07", "h08", "h09"]);
    assert_eq!(body["pagination"]["total"], 12);
    assert_eq!(body["pagination"]["totalPages"], 3);
}

#[tokio::test]
async fn page_sizes_sum_to_total() {
    let ctx = TestContext::new().await;
    let (token, _) = ctx.register(&test_email(), "receiver").await;
    seed_twelve(&ctx).await;

    let mut seen = Vec::new();
    for page in 1..=3 {
        let body: Value = ctx
            .server
            .get("/api/hotels/search")
            .add_query_param("page", page)
            .add_query_param("limit", 5)
            .authorization_bearer(&token)
            .await
            .json();
        seen.extend(ids(&body));
    }

    assert_eq!(seen.len(), 12);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 12);
}

#[tokio::test]
async fn search_filters_by_radius_and_cuisine() {
    let ctx = TestContext::new().await;
    let (token, _) = ctx.register(&test_email(), "receiver").await;

    let mumbai = GeoPoint::new(72.8777, 19.0760);
    for h in [
        hotel("near-indian", 4.0, pune(), &["indian"]),
        hotel("near-thai", 4.5, pune(), &["thai"]),
        hotel("far-indian", 5.0, mumbai, &["indian"]),
    ] {
        ctx.storage.hotels.insert(&h).await.unwrap();
    }

    let response = ctx
        .server
        .get("/api/hotels/search")
        .add_query_param("latitude", 18.52)
        .add_query_param("longitude", 73.85)
        .add_query_param("radius", 5000)
        .add_query_param("cuisineType", "indian,chinese")
        .authorization_bearer(&token)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(ids(&body), vec!["near-indian"]);
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn search_hides_inactive_hotels() {
    let ctx = TestContext::new().await;
    let (token, _) = ctx.register(&test_email(), "receiver").await;

    let mut closed = hotel("closed", 5.0, pune(), &[]);
    closed.is_active = false;
    ctx.storage.hotels.insert(&closed).await.unwrap();
    ctx.storage
        .hotels
        .insert(&hotel("open", 3.0, pune(), &[]))
        .await
        .unwrap();

    let body: Value = ctx
        .server
        .get("/api/hotels/search")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(ids(&body), vec!["open"]);
}

#[tokio::test]
async fn search_hides_unverified_ngos() {
    let ctx = TestContext::new().await;
    let (token, _) = ctx.register(&test_email(), "donor").await;

    let mut verified = place("verified", 3.0, pune(), NgoDetails::from_input(NgoInput::default()));
    verified.details.is_verified = true;
    let pending = place("pending", 5.0, pune(), NgoDetails::from_input(NgoInput::default()));
    ctx.storage.ngos.insert(&verified).await.unwrap();
    ctx.storage.ngos.insert(&pending).await.unwrap();

    let body: Value = ctx
        .server
        .get("/api/ngos/search")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(ids(&body), vec!["verified"]);
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn search_filters_ngos_by_focus_area() {
    let ctx = TestContext::new().await;
    let (token, _) = ctx.register(&test_email(), "donor").await;

    for (id, area) in [("food", "hunger"), ("school", "education")] {
        let mut ngo = place(
            id,
            4.0,
            pune(),
            NgoDetails::from_input(NgoInput {
                focus_areas: Some(vec![area.to_string()]),
                ..Default::default()
            }),
        );
        ngo.details.is_verified = true;
        ctx.storage.ngos.insert(&ngo).await.unwrap();
    }

    let body: Value = ctx
        .server
        .get("/api/ngos/search")
        .add_query_param("focusArea", "education")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(ids(&body), vec!["school"]);
}

#[tokio::test]
async fn search_requires_authentication() {
    let ctx = TestContext::new().await;

    ctx.server
        .get("/api/hotels/search")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn search_with_bad_number_returns_bad_request() {
    let ctx = TestContext::new().await;
    let (token, _) = ctx.register(&test_email(), "receiver").await;

    ctx.server
        .get("/api/hotels/search")
        .add_query_param("minRating", "high")
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_finite_min_rating_returns_bad_request() {
    let ctx = TestContext::new().await;
    let (token, _) = ctx.register(&test_email(), "receiver").await;
    seed_twelve(&ctx).await;

    let response = ctx
        .server
        .get("/api/hotels/search")
        .add_query_param("minRating", "NaN")
        .authorization_bearer(&token)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["errors"][0]["field"], "minRating");
}

#[tokio::test]
async fn oversized_limit_is_capped() {
    let ctx = TestContext::new().await;
    let (token, _) = ctx.register(&test_email(), "receiver").await;

    let body: Value = ctx
        .server
        .get("/api/hotels/search")
        .add_query_param("limit", 1000)
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(body["pagination"]["limit"], 100);
    assert_eq!(body["pagination"]["totalPages"], 0);
}
