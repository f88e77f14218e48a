pub mod controller;
pub mod crud;
pub mod interface;
pub mod memory;
pub mod model;
pub mod routes;
pub mod schema;
pub mod search;
pub mod service;

pub use routes::{hotel_routes, ngo_routes};
