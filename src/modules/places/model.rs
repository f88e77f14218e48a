use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;

use super::interface::PlaceRepository;
use crate::modules::auth::model::Role;
use crate::storage::Storage;

// =============================================================================
// GEO POINT
// =============================================================================

/// Longitude-first coordinate pair, serialized as a GeoJSON point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "GeoJsonPoint", try_from = "GeoJsonPoint")]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

/// Mean radius used by MySQL's `ST_Distance_Sphere`; the in-memory store uses
/// the same value so both backends agree on the radius boundary.
pub const EARTH_RADIUS_METERS: f64 = 6_370_986.0;

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        (-180.0..=180.0).contains(&self.longitude) && (-90.0..=90.0).contains(&self.latitude)
    }

    /// Great-circle distance (haversine).
    pub fn distance_meters(&self, other: &GeoPoint) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * a.sqrt().min(1.0).asin()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeoJsonPoint {
    #[serde(rename = "type")]
    kind: String,
    coordinates: [f64; 2],
}

impl From<GeoPoint> for GeoJsonPoint {
    fn from(point: GeoPoint) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [point.longitude, point.latitude],
        }
    }
}

impl TryFrom<GeoJsonPoint> for GeoPoint {
    type Error = String;

    fn try_from(value: GeoJsonPoint) -> Result<Self, Self::Error> {
        if value.kind != "Point" {
            return Err(format!("unsupported geometry type {}", value.kind));
        }
        Ok(GeoPoint::new(value.coordinates[0], value.coordinates[1]))
    }
}

// =============================================================================
// PLACE
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
}

/// A location-bearing business record. `D` carries the type-specific fields
/// and the descriptor that drives visibility and filtering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Place<D> {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub address: Address,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub location: GeoPoint,
    pub owner_id: String,
    pub is_active: bool,
    pub rating: f64,
    pub total_ratings: i64,
    pub images: Vec<String>,
    pub documents: Vec<String>,
    #[serde(flatten)]
    pub details: D,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<D: PlaceDetails> Place<D> {
    /// Search visibility. Lookups by id only require `is_active`.
    pub fn is_visible(&self) -> bool {
        self.is_active && (!D::DESCRIPTOR.requires_verification || self.details.is_verified())
    }
}

/// Static description of an entity type: what the search engine needs to treat
/// hotels and NGOs with one code path.
#[derive(Debug)]
pub struct PlaceDescriptor {
    /// Singular label used in messages ("Hotel not found").
    pub label: &'static str,
    pub table: &'static str,
    /// Query parameter naming the tag filter.
    pub tag_param: &'static str,
    /// Whether `is_verified` gates search visibility.
    pub requires_verification: bool,
    /// Roles allowed to create records of this type.
    pub creator_roles: &'static [Role],
}

/// Type-specific part of a place. `Input` is the request-side shape used both
/// to build a new record and to merge a partial update.
pub trait PlaceDetails:
    Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Input: DeserializeOwned + Send + 'static;

    const DESCRIPTOR: PlaceDescriptor;

    /// Set intersected by the tag filter (cuisine types, focus areas).
    fn tags(&self) -> &[String];

    fn is_verified(&self) -> bool {
        true
    }

    /// Applies the stored verification flag. No-op for types without one.
    fn set_verified(&mut self, _verified: bool) {}

    fn from_input(input: Self::Input) -> Self;

    fn merge(&mut self, input: Self::Input);

    fn repository(storage: &Storage) -> Arc<dyn PlaceRepository<Self>>;
}

// =============================================================================
// HOTEL
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelDetails {
    pub cuisine_type: Vec<String>,
    pub capacity: Option<u32>,
    #[serde(default)]
    pub opening_hours: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelInput {
    pub cuisine_type: Option<Vec<String>>,
    pub capacity: Option<u32>,
    pub opening_hours: Option<serde_json::Value>,
}

impl PlaceDetails for HotelDetails {
    type Input = HotelInput;

    const DESCRIPTOR: PlaceDescriptor = PlaceDescriptor {
        label: "Hotel",
        table: "hotels",
        tag_param: "cuisineType",
        requires_verification: false,
        creator_roles: &[Role::Donor, Role::Admin, Role::SuperAdmin],
    };

    fn tags(&self) -> &[String] {
        &self.cuisine_type
    }

    fn from_input(input: HotelInput) -> Self {
        Self {
            cuisine_type: input.cuisine_type.unwrap_or_default(),
            capacity: input.capacity,
            opening_hours: input
                .opening_hours
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
        }
    }

    fn merge(&mut self, input: HotelInput) {
        if let Some(cuisine_type) = input.cuisine_type {
            self.cuisine_type = cuisine_type;
        }
        if input.capacity.is_some() {
            self.capacity = input.capacity;
        }
        if let Some(opening_hours) = input.opening_hours {
            self.opening_hours = opening_hours;
        }
    }

    fn repository(storage: &Storage) -> Arc<dyn PlaceRepository<Self>> {
        storage.hotels.clone()
    }
}

pub type Hotel = Place<HotelDetails>;

// =============================================================================
// NGO
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NgoDetails {
    pub registration_number: Option<String>,
    pub focus_areas: Vec<String>,
    pub beneficiaries: u32,
    pub is_verified: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NgoInput {
    pub registration_number: Option<String>,
    pub focus_areas: Option<Vec<String>>,
    pub beneficiaries: Option<u32>,
}

impl PlaceDetails for NgoDetails {
    type Input = NgoInput;

    const DESCRIPTOR: PlaceDescriptor = PlaceDescriptor {
        label: "NGO",
        table: "ngos",
        tag_param: "focusArea",
        requires_verification: true,
        creator_roles: &[Role::Receiver, Role::Admin, Role::SuperAdmin],
    };

    fn tags(&self) -> &[String] {
        &self.focus_areas
    }

    fn is_verified(&self) -> bool {
        self.is_verified
    }

    fn set_verified(&mut self, verified: bool) {
        self.is_verified = verified;
    }

    // New NGOs start unverified; only the verify operation flips the flag.
    fn from_input(input: NgoInput) -> Self {
        Self {
            registration_number: input.registration_number,
            focus_areas: input.focus_areas.unwrap_or_default(),
            beneficiaries: input.beneficiaries.unwrap_or(0),
            is_verified: false,
        }
    }

    fn merge(&mut self, input: NgoInput) {
        if input.registration_number.is_some() {
            self.registration_number = input.registration_number;
        }
        if let Some(focus_areas) = input.focus_areas {
            self.focus_areas = focus_areas;
        }
        if let Some(beneficiaries) = input.beneficiaries {
            self.beneficiaries = beneficiaries;
        }
    }

    fn repository(storage: &Storage) -> Arc<dyn PlaceRepository<Self>> {
        storage.ngos.clone()
    }
}

pub type Ngo = Place<NgoDetails>;
