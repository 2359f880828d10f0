//! Hospital directory: fixed reference data, seeded once.

use std::sync::Arc;

use super::store::HospitalStore;
use super::ServiceError;
use crate::models::{HospitalView, NewHospital};

pub fn seed_hospitals() -> Vec<NewHospital> {
    vec![
        NewHospital {
            name: "City General Hospital",
            distance: "0.8 km",
            doctors: 45,
            beds: "120 (ICU: 25, Emergency: 30)",
            ventilators: "15 (Available)",
            blood: "Full Stock",
        },
        NewHospital {
            name: "Metro Medical Center",
            distance: "1.2 km",
            doctors: 62,
            beds: "180 (ICU: 35, Emergency: 45)",
            ventilators: "22 (Available)",
            blood: "Limited Stock",
        },
        NewHospital {
            name: "Regional Health Institute",
            distance: "2.1 km",
            doctors: 38,
            beds: "95 (ICU: 18, Emergency: 20)",
            ventilators: "12 (Available)",
            blood: "Full Stock",
        },
    ]
}

#[derive(Clone)]
pub struct HospitalDirectory {
    store: Arc<dyn HospitalStore>,
}

impl HospitalDirectory {
    pub fn new(store: Arc<dyn HospitalStore>) -> Self {
        Self { store }
    }

    /// Insert the reference hospitals unless any row already exists.
    ///
    /// Returns whether rows were inserted.
    pub async fn seed_if_empty(&self) -> Result<bool, ServiceError> {
        if self.store.has_hospitals().await? {
            tracing::debug!("Hospital directory already seeded");
            return Ok(false);
        }

        let rows = seed_hospitals();
        let count = rows.len();
        self.store.insert_hospitals(rows).await?;
        tracing::info!(count, "Seeded hospital directory");
        Ok(true)
    }

    pub async fn list_all(&self) -> Result<Vec<HospitalView>, ServiceError> {
        Ok(self
            .store
            .list_hospitals()
            .await?
            .into_iter()
            .map(HospitalView::from)
            .collect())
    }
}
