use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::interface::PlaceRepository;
use super::model::{NgoDetails, Place, PlaceDetails};
use super::schema::{CreatePlaceRequest, UpdatePlaceRequest};
use super::search::{self, SearchPage, SearchParams};
use crate::error::ApiError;
use crate::modules::auth::model::{Identity, Role};
use crate::services::authorization::authorize;

/// Roles that may act on any record regardless of ownership.
const MODERATOR_ROLES: &[Role] = &[Role::Admin, Role::SuperAdmin];

pub struct PlaceService<D: PlaceDetails> {
    repo: Arc<dyn PlaceRepository<D>>,
}

impl<D: PlaceDetails> PlaceService<D> {
    pub fn new(repo: Arc<dyn PlaceRepository<D>>) -> Self {
        Self { repo }
    }

    fn not_found() -> ApiError {
        ApiError::NotFound(D::DESCRIPTOR.label)
    }

    async fn load(&self, id: &str) -> Result<Place<D>, ApiError> {
        self.repo.find_active(id).await?.ok_or_else(Self::not_found)
    }

    /// Owner or moderator.
    fn ensure_can_modify(identity: &Identity, place: &Place<D>) -> Result<(), ApiError> {
        if place.owner_id == identity.id || MODERATOR_ROLES.contains(&identity.role) {
            return Ok(());
        }
        tracing::warn!(
            "Account {} tried to modify {} {} owned by {}",
            identity.id,
            D::DESCRIPTOR.label,
            place.id,
            place.owner_id
        );
        Err(ApiError::Forbidden(format!(
            "Not authorized to modify this {}",
            D::DESCRIPTOR.label
        )))
    }

    pub async fn create(
        &self,
        identity: &Identity,
        req: CreatePlaceRequest<D::Input>,
    ) -> Result<Place<D>, ApiError> {
        authorize(identity, D::DESCRIPTOR.creator_roles)?;
        req.check()?;
        let location = req
            .location
            .ok_or_else(|| ApiError::validation("location", "Location is required"))?;

        let now = Utc::now();
        let place = Place {
            id: Uuid::new_v4().to_string(),
            name: req.name.trim().to_string(),
            description: req.description,
            address: req.address,
            phone: req.phone,
            email: req.email,
            website: req.website,
            location,
            owner_id: identity.id.clone(),
            is_active: true,
            rating: 0.0,
            total_ratings: 0,
            images: req.images,
            documents: req.documents,
            details: D::from_input(req.details),
            created_at: now,
            updated_at: now,
        };

        self.repo.insert(&place).await?;
        tracing::info!(
            "{} {} created by {}",
            D::DESCRIPTOR.label,
            place.id,
            identity.id
        );
        Ok(place)
    }

    pub async fn get(&self, id: &str) -> Result<Place<D>, ApiError> {
        self.load(id).await
    }

    pub async fn mine(&self, identity: &Identity) -> Result<Vec<Place<D>>, ApiError> {
        Ok(self.repo.find_by_owner(&identity.id).await?)
    }

    pub async fn search(&self, params: &SearchParams) -> Result<SearchPage<D>, ApiError> {
        Ok(search::search(self.repo.as_ref(), params).await?)
    }

    pub async fn update(
        &self,
        identity: &Identity,
        id: &str,
        req: UpdatePlaceRequest<D::Input>,
    ) -> Result<Place<D>, ApiError> {
        req.check()?;
        let mut place = self.load(id).await?;
        Self::ensure_can_modify(identity, &place)?;

        if let Some(name) = req.name {
            place.name = name.trim().to_string();
        }
        if req.description.is_some() {
            place.description = req.description;
        }
        if let Some(address) = req.address {
            place.address = address;
        }
        if req.phone.is_some() {
            place.phone = req.phone;
        }
        if req.email.is_some() {
            place.email = req.email;
        }
        if req.website.is_some() {
            place.website = req.website;
        }
        if let Some(location) = req.location {
            place.location = location;
        }
        if let Some(images) = req.images {
            place.images = images;
        }
        if let Some(documents) = req.documents {
            place.documents = documents;
        }
        place.details.merge(req.details);
        place.updated_at = Utc::now();

        if !self.repo.update(&place).await? {
            return Err(Self::not_found());
        }
        // Re-read so flags changed since `load` are reported as stored.
        self.load(id).await
    }

    /// Soft delete: the record stays but drops out of lookups and search.
    pub async fn deactivate(&self, identity: &Identity, id: &str) -> Result<(), ApiError> {
        let place = self.load(id).await?;
        Self::ensure_can_modify(identity, &place)?;

        if !self.repo.deactivate(id, Utc::now()).await? {
            return Err(Self::not_found());
        }
        tracing::info!(
            "{} {} deactivated by {}",
            D::DESCRIPTOR.label,
            place.id,
            identity.id
        );
        Ok(())
    }

    pub async fn rate(&self, id: &str, score: u8) -> Result<Place<D>, ApiError> {
        self.repo
            .add_rating(id, f64::from(score), Utc::now())
            .await?
            .ok_or_else(Self::not_found)
    }
}

impl PlaceService<NgoDetails> {
    /// Makes an NGO visible to search.
    pub async fn verify(&self, identity: &Identity, id: &str) -> Result<Place<NgoDetails>, ApiError> {
        authorize(identity, MODERATOR_ROLES)?;
        let ngo = self
            .repo
            .set_verified(id, Utc::now())
            .await?
            .ok_or_else(Self::not_found)?;
        tracing::info!("NGO {} verified by {}", ngo.id, identity.id);
        Ok(ngo)
    }
}
