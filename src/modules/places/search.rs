use super::interface::{PlaceFilter, PlaceRepository, Proximity};
use super::model::{GeoPoint, Place, PlaceDetails};
use crate::storage::StoreResult;

pub const DEFAULT_RADIUS_METERS: f64 = 10_000.0;
pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub location: Option<GeoPoint>,
    pub radius_meters: f64,
    pub tags: Vec<String>,
    pub min_rating: Option<f64>,
    pub page: i64,
    pub page_size: i64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            location: None,
            radius_meters: DEFAULT_RADIUS_METERS,
            tags: Vec::new(),
            min_rating: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE as i64,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchPage<D> {
    pub items: Vec<Place<D>>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
    pub page_size: u64,
}

/// Page and size as actually applied.
pub fn clamp_paging(page: i64, page_size: i64) -> (u64, u64) {
    let page = page.max(1) as u64;
    let page_size = (page_size.max(1) as u64).min(MAX_PAGE_SIZE);
    (page, page_size)
}

/// Builds the store predicate for `D`. Visibility comes from the type's
/// descriptor, never from the caller.
pub fn build_filter<D: PlaceDetails>(params: &SearchParams) -> PlaceFilter {
    PlaceFilter {
        require_active: true,
        require_verified: D::DESCRIPTOR.requires_verification,
        near: params.location.map(|center| Proximity {
            center,
            radius_meters: params.radius_meters,
        }),
        tags_any: params.tags.clone(),
        min_rating: params.min_rating,
    }
}

/// Paginated, rating-ordered search over one entity type. `total` is counted
/// with the same predicate as the page itself.
pub async fn search<D: PlaceDetails>(
    repo: &dyn PlaceRepository<D>,
    params: &SearchParams,
) -> StoreResult<SearchPage<D>> {
    let filter = build_filter::<D>(params);
    let (page, page_size) = clamp_paging(params.page, params.page_size);
    let skip = (page - 1).saturating_mul(page_size);

    let items = repo.find(&filter, skip, page_size).await?;
    let total = repo.count(&filter).await?;

    tracing::debug!(
        "{} search page {} returned {} of {}",
        D::DESCRIPTOR.label,
        page,
        items.len(),
        total
    );

    Ok(SearchPage {
        items,
        total,
        page,
        total_pages: total.div_ceil(page_size),
        page_size,
    })
}
