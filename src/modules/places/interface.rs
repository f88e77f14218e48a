use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{GeoPoint, Place, PlaceDetails};
use crate::storage::StoreResult;

// =============================================================================
// QUERY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proximity {
    pub center: GeoPoint,
    pub radius_meters: f64,
}

/// Store-level predicate. The search engine fills it in; repositories only
/// evaluate it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceFilter {
    pub require_active: bool,
    pub require_verified: bool,
    pub near: Option<Proximity>,
    /// Matches when the record's tag set intersects this one. Empty means no
    /// tag constraint.
    pub tags_any: Vec<String>,
    pub min_rating: Option<f64>,
}

impl PlaceFilter {
    pub fn matches<D: PlaceDetails>(&self, place: &Place<D>) -> bool {
        if self.require_active && !place.is_active {
            return false;
        }
        if self.require_verified && !place.details.is_verified() {
            return false;
        }
        if let Some(near) = &self.near {
            if place.location.distance_meters(&near.center) > near.radius_meters {
                return false;
            }
        }
        if !self.tags_any.is_empty()
            && !place.details.tags().iter().any(|t| self.tags_any.contains(t))
        {
            return false;
        }
        if let Some(min) = self.min_rating {
            if place.rating < min {
                return false;
            }
        }
        true
    }
}

// =============================================================================
// REPOSITORY TRAITS
// =============================================================================

/// Entity collection. `find` orders by rating descending, then distance to the
/// proximity center ascending (when one is given), then id ascending.
#[async_trait]
pub trait PlaceRepository<D: PlaceDetails>: Send + Sync {
    async fn insert(&self, place: &Place<D>) -> StoreResult<()>;

    /// Active record by id.
    async fn find_active(&self, id: &str) -> StoreResult<Option<Place<D>>>;

    async fn find_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Place<D>>>;

    /// Writes the mergeable fields of an active record. The active and
    /// verified flags, owner and rating columns are never touched here; each
    /// has its own targeted operation. False when no active record matched.
    async fn update(&self, place: &Place<D>) -> StoreResult<bool>;

    /// Soft delete. False when no active record matched.
    async fn deactivate(&self, id: &str, now: DateTime<Utc>) -> StoreResult<bool>;

    /// Marks an active record verified and returns it.
    async fn set_verified(&self, id: &str, now: DateTime<Utc>)
        -> StoreResult<Option<Place<D>>>;

    /// Folds one score into the running rating average of an active record.
    async fn add_rating(
        &self,
        id: &str,
        score: f64,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Place<D>>>;

    async fn find(&self, filter: &PlaceFilter, skip: u64, limit: u64)
        -> StoreResult<Vec<Place<D>>>;

    async fn count(&self, filter: &PlaceFilter) -> StoreResult<u64>;
}
