pub mod controller;
pub mod menu;
pub mod routes;

pub use routes::admin_routes;
