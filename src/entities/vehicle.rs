use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum VehicleCategory {
    #[sea_orm(string_value = "eco")]
    Eco,
    #[sea_orm(string_value = "suv")]
    Suv,
    #[sea_orm(string_value = "convertible")]
    Convertible,
    #[sea_orm(string_value = "sports")]
    Sports,
    #[sea_orm(string_value = "luxury")]
    Luxury,
    #[sea_orm(string_value = "sedan")]
    Sedan,
}

impl VehicleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleCategory::Eco => "eco",
            VehicleCategory::Suv => "suv",
            VehicleCategory::Convertible => "convertible",
            VehicleCategory::Sports => "sports",
            VehicleCategory::Luxury => "luxury",
            VehicleCategory::Sedan => "sedan",
        }
    }

    /// Display theme for views showing a vehicle of this category.
    pub fn theme(&self) -> CategoryTheme {
        let (name, accent, background) = match self {
            VehicleCategory::Eco => ("Nature Green", "#22c55e", "#ecfdf5"),
            VehicleCategory::Suv => ("Deep Forest", "#15803d", "#f0fdf4"),
            VehicleCategory::Convertible => ("Sky Cruise", "#3b82f6", "#f0f9ff"),
            VehicleCategory::Sports => ("Inferno Speed", "#ef4444", "#fef2f2"),
            VehicleCategory::Luxury => ("Black Diamond", "#1f2937", "#f9fafb"),
            VehicleCategory::Sedan => ("Urban Pearl", "#9ca3af", "#f9fafb"),
        };

        CategoryTheme {
            name,
            accent,
            background,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryTheme {
    pub name: &'static str,
    pub accent: &'static str,
    pub background: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    #[sea_orm(string_value = "petrol")]
    Petrol,
    #[sea_orm(string_value = "diesel")]
    Diesel,
    #[sea_orm(string_value = "electric")]
    Electric,
    #[sea_orm(string_value = "hybrid")]
    Hybrid,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicle")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub category: VehicleCategory,
    pub fuel_type: FuelType,
    pub hourly_rate: f64,
    pub image_url: String,
    pub is_available: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
