//! Hospital model - read-only facility directory.

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, FromRow)]
pub struct Hospital {
    pub id: i64,
    pub name: String,
    pub distance: Option<String>,
    pub doctors: Option<i32>,
    pub beds: Option<String>,
    pub ventilators: Option<String>,
    pub blood: Option<String>,
}

/// Seed row.
#[derive(Debug, Clone)]
pub struct NewHospital {
    pub name: &'static str,
    pub distance: &'static str,
    pub doctors: i32,
    pub beds: &'static str,
    pub ventilators: &'static str,
    pub blood: &'static str,
}

impl NewHospital {
    pub fn into_hospital(self, id: i64) -> Hospital {
        Hospital {
            id,
            name: self.name.to_string(),
            distance: Some(self.distance.to_string()),
            doctors: Some(self.doctors),
            beds: Some(self.beds.to_string()),
            ventilators: Some(self.ventilators.to_string()),
            blood: Some(self.blood.to_string()),
        }
    }
}

/// Hospital as listed by the API. The row id is not part of the listing.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HospitalView {
    pub name: String,
    pub distance: Option<String>,
    pub doctors: Option<i32>,
    pub beds: Option<String>,
    pub ventilators: Option<String>,
    pub blood: Option<String>,
}

impl From<Hospital> for HospitalView {
    fn from(h: Hospital) -> Self {
        Self {
            name: h.name,
            distance: h.distance,
            doctors: h.doctors,
            beds: h.beds,
            ventilators: h.ventilators,
            blood: h.blood,
        }
    }
}
