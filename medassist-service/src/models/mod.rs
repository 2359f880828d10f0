//! Persisted entities and their API views.

pub mod hospital;
pub mod user;

pub use hospital::{Hospital, HospitalView, NewHospital};
pub use user::{NewUser, User, UserChanges, UserView};
