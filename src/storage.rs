use std::sync::Arc;

use crate::config::DbPool;
use crate::modules::auth::{crud::AccountCrud, interface::AccountRepository, memory::MemoryAccounts};
use crate::modules::places::{
    crud::PlaceCrud,
    interface::PlaceRepository,
    memory::MemoryPlaces,
    model::{HotelDetails, NgoDetails},
};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate value for unique field {0}")]
    Duplicate(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Repository handles for every collection the core touches. Built once at
/// startup and handed to the router state.
#[derive(Clone)]
pub struct Storage {
    pub accounts: Arc<dyn AccountRepository>,
    pub hotels: Arc<dyn PlaceRepository<HotelDetails>>,
    pub ngos: Arc<dyn PlaceRepository<NgoDetails>>,
}

impl Storage {
    pub fn mysql(pool: DbPool) -> Self {
        Self {
            accounts: Arc::new(AccountCrud::new(pool.clone())),
            hotels: Arc::new(PlaceCrud::<HotelDetails>::new(pool.clone())),
            ngos: Arc::new(PlaceCrud::<NgoDetails>::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            accounts: Arc::new(MemoryAccounts::default()),
            hotels: Arc::new(MemoryPlaces::<HotelDetails>::default()),
            ngos: Arc::new(MemoryPlaces::<NgoDetails>::default()),
        }
    }
}
