use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use super::model::{NgoDetails, Place, PlaceDetails};
use super::schema::{
    parse_search_query, CreatePlaceRequest, RateRequest, RemovedResponse, SearchResponse,
    UpdatePlaceRequest,
};
use super::service::PlaceService;
use crate::error::ApiError;
use crate::modules::auth::AuthUser;
use crate::services::metrics::SearchMetricsCollector;
use crate::AppState;

fn service<D: PlaceDetails>(state: &AppState) -> PlaceService<D> {
    PlaceService::new(D::repository(&state.storage))
}

pub async fn create<D: PlaceDetails>(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Json(req): Json<CreatePlaceRequest<D::Input>>,
) -> Result<(StatusCode, Json<Place<D>>), ApiError> {
    let place = service::<D>(&state).create(&identity, req).await?;
    Ok((StatusCode::CREATED, Json(place)))
}

pub async fn search<D: PlaceDetails>(
    State(state): State<Arc<AppState>>,
    AuthUser(_identity): AuthUser,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<SearchResponse<D>>, ApiError> {
    let params = parse_search_query(&pairs, D::DESCRIPTOR.tag_param)?;
    let page = service::<D>(&state).search(&params).await?;

    SearchMetricsCollector::new(state.metrics.clone())
        .record_search(D::DESCRIPTOR.table, page.items.len());
    Ok(Json(page.into()))
}

pub async fn mine<D: PlaceDetails>(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<Place<D>>>, ApiError> {
    Ok(Json(service::<D>(&state).mine(&identity).await?))
}

pub async fn get_one<D: PlaceDetails>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Place<D>>, ApiError> {
    Ok(Json(service::<D>(&state).get(&id).await?))
}

pub async fn update<D: PlaceDetails>(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdatePlaceRequest<D::Input>>,
) -> Result<Json<Place<D>>, ApiError> {
    Ok(Json(service::<D>(&state).update(&identity, &id, req).await?))
}

pub async fn remove<D: PlaceDetails>(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<RemovedResponse>, ApiError> {
    service::<D>(&state).deactivate(&identity, &id).await?;
    Ok(Json(RemovedResponse {
        message: format!("{} removed", D::DESCRIPTOR.label),
    }))
}

pub async fn rate<D: PlaceDetails>(
    State(state): State<Arc<AppState>>,
    AuthUser(_identity): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<RateRequest>,
) -> Result<Json<Place<D>>, ApiError> {
    req.validate()?;
    Ok(Json(service::<D>(&state).rate(&id, req.score).await?))
}

pub async fn verify_ngo(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Place<NgoDetails>>, ApiError> {
    Ok(Json(
        service::<NgoDetails>(&state).verify(&identity, &id).await?,
    ))
}
