use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail};

use super::model::{Address, GeoPoint, Place};
use super::search::{SearchPage, SearchParams};
use crate::error::{ApiError, FieldError};

fn field_error(errors: &mut Vec<FieldError>, field: &str, message: &str) {
    errors.push(FieldError {
        field: field.to_string(),
        message: message.to_string(),
    });
}

fn finish(errors: Vec<FieldError>) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

// =============================================================================
// CREATE / UPDATE
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaceRequest<I> {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub address: Address,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub documents: Vec<String>,
    #[serde(flatten)]
    pub details: I,
}

impl<I> CreatePlaceRequest<I> {
    pub fn check(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            field_error(&mut errors, "name", "Name is required");
        }
        match &self.location {
            None => field_error(&mut errors, "location", "Location is required"),
            Some(point) if !point.is_valid() => {
                field_error(&mut errors, "location", "Location coordinates are out of range")
            }
            Some(_) => {}
        }
        if let Some(email) = &self.email {
            if !email.validate_email() {
                field_error(&mut errors, "email", "Please include a valid email");
            }
        }
        finish(errors)
    }
}

/// Partial update. Rating, flags and owner are not part of the shape, so a
/// body naming them has no effect on them.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlaceRequest<I> {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<Address>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub location: Option<GeoPoint>,
    pub images: Option<Vec<String>>,
    pub documents: Option<Vec<String>>,
    #[serde(flatten)]
    pub details: I,
}

impl<I> UpdatePlaceRequest<I> {
    pub fn check(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            field_error(&mut errors, "name", "Name is required");
        }
        if matches!(&self.location, Some(point) if !point.is_valid()) {
            field_error(&mut errors, "location", "Location coordinates are out of range");
        }
        if matches!(&self.email, Some(email) if !email.validate_email()) {
            field_error(&mut errors, "email", "Please include a valid email");
        }
        finish(errors)
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RateRequest {
    #[validate(range(min = 1, max = 5, message = "Score must be between 1 and 5"))]
    pub score: u8,
}

#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    pub message: String,
}

// =============================================================================
// SEARCH
// =============================================================================

fn parse_number<T: std::str::FromStr>(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: &str,
) -> Option<T> {
    match value.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            field_error(errors, field, &format!("{} must be a number", field));
            None
        }
    }
}

/// `parse_number` for floats that must be finite; `NaN` and `inf` parse but
/// would silently disable a comparison filter.
fn parse_finite(errors: &mut Vec<FieldError>, field: &str, value: &str) -> Option<f64> {
    let n = parse_number::<f64>(errors, field, value)?;
    if n.is_finite() {
        Some(n)
    } else {
        field_error(errors, field, &format!("{} must be a finite number", field));
        None
    }
}

/// Reads search parameters from raw query pairs so the tag filter can be given
/// either repeated (`tag=a&tag=b`) or comma-separated (`tag=a,b`).
pub fn parse_search_query(
    pairs: &[(String, String)],
    tag_param: &str,
) -> Result<SearchParams, ApiError> {
    let mut params = SearchParams::default();
    let mut errors = Vec::new();
    let (mut latitude, mut longitude) = (None, None);

    for (key, value) in pairs {
        match key.as_str() {
            "latitude" => latitude = parse_number::<f64>(&mut errors, "latitude", value),
            "longitude" => longitude = parse_number::<f64>(&mut errors, "longitude", value),
            "radius" => {
                if let Some(radius) = parse_number::<f64>(&mut errors, "radius", value) {
                    if radius > 0.0 && radius.is_finite() {
                        params.radius_meters = radius;
                    } else {
                        field_error(&mut errors, "radius", "radius must be positive");
                    }
                }
            }
            "minRating" => params.min_rating = parse_finite(&mut errors, "minRating", value),
            "page" => {
                if let Some(page) = parse_number(&mut errors, "page", value) {
                    params.page = page;
                }
            }
            "limit" => {
                if let Some(limit) = parse_number(&mut errors, "limit", value) {
                    params.page_size = limit;
                }
            }
            key if key == tag_param => params.tags.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string),
            ),
            _ => {}
        }
    }

    // A lone coordinate is ignored.
    if let (Some(latitude), Some(longitude)) = (latitude, longitude) {
        let point = GeoPoint::new(longitude, latitude);
        if point.is_valid() {
            params.location = Some(point);
        } else {
            field_error(&mut errors, "location", "Location coordinates are out of range");
        }
    }

    finish(errors)?;
    Ok(params)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
    pub limit: u64,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse<D> {
    pub data: Vec<Place<D>>,
    pub pagination: Pagination,
}

impl<D> From<SearchPage<D>> for SearchResponse<D> {
    fn from(page: SearchPage<D>) -> Self {
        Self {
            data: page.items,
            pagination: Pagination {
                total: page.total,
                page: page.page,
                total_pages: page.total_pages,
                limit: page.page_size,
            },
        }
    }
}
