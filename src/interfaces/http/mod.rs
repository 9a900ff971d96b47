//! HTTP REST API
//!
//! - `common`: response envelope, pagination, error mapping, validated JSON
//! - `middleware`: admin JWT authentication
//! - `modules`: handlers and DTOs per resource
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiContext, ApiDoc};
