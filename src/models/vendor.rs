use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorCategory {
    FoodBeverage,
    HomeServices,
    HealthWellness,
    Automotive,
    Education,
    EventServices,
    BeautyPersonal,
    ProfessionalServices,
    Retail,
    Technology,
    Construction,
    Other,
}

impl VendorCategory {
    pub fn label(&self) -> &'static str {
        match self {
            VendorCategory::FoodBeverage => "Food & Beverage",
            VendorCategory::HomeServices => "Home Services",
            VendorCategory::HealthWellness => "Health & Wellness",
            VendorCategory::Automotive => "Automotive",
            VendorCategory::Education => "Education",
            VendorCategory::EventServices => "Event Services",
            VendorCategory::BeautyPersonal => "Beauty & Personal Care",
            VendorCategory::ProfessionalServices => "Professional Services",
            VendorCategory::Retail => "Retail",
            VendorCategory::Technology => "Technology",
            VendorCategory::Construction => "Construction",
            VendorCategory::Other => "Other",
        }
    }
}

/// A service-providing business. Owned by exactly one actor; business name
/// and category are fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: String,
    pub category: VendorCategory,
    pub description: Option<String>,
    pub phone_number: i64,
    pub email: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: i32,
    pub is_verified: bool,
    pub rating_average: f64,
    pub total_reviews: i32,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub updated_at: DateTime<Utc>,
}

impl VendorProfile {
    /// Rating rounded to one decimal for display. Full precision stays in
    /// `rating_average`.
    pub fn display_rating(&self) -> f64 {
        (self.rating_average * 10.0).round() / 10.0
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewVendorProfile {
    pub business_name: String,
    pub category: VendorCategory,
    pub description: Option<String>,
    pub phone_number: i64,
    pub email: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: i32,
}

// Business name and category are intentionally absent: they cannot be
// changed after creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VendorProfileUpdate {
    pub description: Option<String>,
    pub phone_number: Option<i64>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct DiscoveryQuery {
    pub category: Option<VendorCategory>,
    pub search: Option<String>,
}
