pub mod auth;
pub mod emergency;
pub mod metrics;
pub mod profile;
pub mod symptoms;
