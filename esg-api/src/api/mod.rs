//! HTTP API handlers for esg-api

pub mod buildinfo;
pub mod health;
pub mod home;
pub mod models;
pub mod predict;

pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use home::home_routes;
pub use models::model_routes;
pub use predict::predict_routes;
