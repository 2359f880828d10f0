//! Services layer for medassist-service.
//!
//! Business logic for accounts, profiles, the hospital directory and the AI assistants.

pub mod assistant;
mod database;
pub mod error;
mod hospitals;
mod jwt;
pub mod metrics;
mod profile;
pub mod providers;
mod store;

pub use assistant::{AiGateway, Assistant, GatewayError};
pub use database::Database;
pub use error::ServiceError;
pub use hospitals::{seed_hospitals, HospitalDirectory};
pub use jwt::{AccessTokenClaims, JwtService, TokenError};
pub use metrics::{get_metrics, init_metrics};
pub use profile::{parse_age, ProfileService};
pub use store::{HospitalStore, MemoryStore, UserStore};
