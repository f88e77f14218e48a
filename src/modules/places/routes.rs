use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use super::controller;
use super::model::{HotelDetails, NgoDetails, PlaceDetails};
use crate::AppState;

/// Routes shared by every place type. `/search` and `/mine` are registered
/// as static segments so they win over `/{id}`.
fn place_routes<D: PlaceDetails>() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(controller::create::<D>))
        .route("/search", get(controller::search::<D>))
        .route("/mine", get(controller::mine::<D>))
        .route(
            "/{id}",
            get(controller::get_one::<D>)
                .put(controller::update::<D>)
                .delete(controller::remove::<D>),
        )
        .route("/{id}/rate", post(controller::rate::<D>))
}

pub fn hotel_routes() -> Router<Arc<AppState>> {
    place_routes::<HotelDetails>()
}

pub fn ngo_routes() -> Router<Arc<AppState>> {
    place_routes::<NgoDetails>().route("/{id}/verify", put(controller::verify_ngo))
}
