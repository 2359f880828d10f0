use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::HospitalView;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SymptomRequest {
    pub symptoms: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SymptomResponse {
    pub reply: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmergencyRequest {
    pub message: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmergencyResponse {
    pub text: String,
    pub hospitals: Vec<HospitalView>,
}
