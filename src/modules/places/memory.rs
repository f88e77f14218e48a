use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{cmp::Ordering, collections::HashMap};
use tokio::sync::RwLock;

use super::interface::{PlaceFilter, PlaceRepository};
use super::model::{Place, PlaceDetails};
use crate::storage::StoreResult;

pub struct MemoryPlaces<D> {
    rows: RwLock<HashMap<String, Place<D>>>,
}

impl<D> Default for MemoryPlaces<D> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

fn search_order<D: PlaceDetails>(filter: &PlaceFilter, a: &Place<D>, b: &Place<D>) -> Ordering {
    b.rating
        .total_cmp(&a.rating)
        .then_with(|| match &filter.near {
            Some(near) => a
                .location
                .distance_meters(&near.center)
                .total_cmp(&b.location.distance_meters(&near.center)),
            None => Ordering::Equal,
        })
        .then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl<D: PlaceDetails> PlaceRepository<D> for MemoryPlaces<D> {
    async fn insert(&self, place: &Place<D>) -> StoreResult<()> {
        self.rows
            .write()
            .await
            .insert(place.id.clone(), place.clone());
        Ok(())
    }

    async fn find_active(&self, id: &str) -> StoreResult<Option<Place<D>>> {
        Ok(self
            .rows
            .read()
            .await
            .get(id)
            .filter(|p| p.is_active)
            .cloned())
    }

    async fn find_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Place<D>>> {
        let rows = self.rows.read().await;
        let mut owned: Vec<Place<D>> = rows
            .values()
            .filter(|p| p.is_active && p.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(owned)
    }

    async fn update(&self, place: &Place<D>) -> StoreResult<bool> {
        let mut rows = self.rows.write().await;
        let Some(existing) = rows.get_mut(&place.id).filter(|p| p.is_active) else {
            return Ok(false);
        };

        let verified = existing.details.is_verified();
        existing.name = place.name.clone();
        existing.description = place.description.clone();
        existing.address = place.address.clone();
        existing.phone = place.phone.clone();
        existing.email = place.email.clone();
        existing.website = place.website.clone();
        existing.location = place.location;
        existing.images = place.images.clone();
        existing.documents = place.documents.clone();
        existing.details = place.details.clone();
        existing.details.set_verified(verified);
        existing.updated_at = place.updated_at;
        Ok(true)
    }

    async fn deactivate(&self, id: &str, now: DateTime<Utc>) -> StoreResult<bool> {
        let mut rows = self.rows.write().await;
        let Some(place) = rows.get_mut(id).filter(|p| p.is_active) else {
            return Ok(false);
        };
        place.is_active = false;
        place.updated_at = now;
        Ok(true)
    }

    async fn set_verified(&self, id: &str, now: DateTime<Utc>) -> StoreResult<Option<Place<D>>> {
        let mut rows = self.rows.write().await;
        let Some(place) = rows.get_mut(id).filter(|p| p.is_active) else {
            return Ok(None);
        };
        place.details.set_verified(true);
        place.updated_at = now;
        Ok(Some(place.clone()))
    }

    async fn add_rating(
        &self,
        id: &str,
        score: f64,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Place<D>>> {
        let mut rows = self.rows.write().await;
        let Some(place) = rows.get_mut(id).filter(|p| p.is_active) else {
            return Ok(None);
        };

        let count = place.total_ratings as f64;
        place.rating = (place.rating * count + score) / (count + 1.0);
        place.total_ratings += 1;
        place.updated_at = now;
        Ok(Some(place.clone()))
    }

    async fn find(
        &self,
        filter: &PlaceFilter,
        skip: u64,
        limit: u64,
    ) -> StoreResult<Vec<Place<D>>> {
        let rows = self.rows.read().await;
        let mut matched: Vec<&Place<D>> = rows.values().filter(|p| filter.matches(*p)).collect();
        matched.sort_by(|a, b| search_order(filter, a, b));

        Ok(matched
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &PlaceFilter) -> StoreResult<u64> {
        let rows = self.rows.read().await;
        Ok(rows.values().filter(|p| filter.matches(*p)).count() as u64)
    }
}
