use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{auth::Credentials, gateway::PaymentGateway, notify::Notifier, store::Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub credentials: Arc<Credentials>,
    pub notifier: Arc<dyn Notifier>,
    pub gateway: Arc<dyn PaymentGateway>,
}

/* -------------------------
   Records
--------------------------*/

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct TreatmentOption {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub slots: Vec<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TreatmentName {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    pub treatment: String,
    pub appoint_date: String,
    pub slot: String,
    pub price: f64,
    pub patient: Option<String>,
    pub phone: Option<String>,
    pub paid: bool,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    None,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::None => "none",
            Role::Admin => "admin",
        }
    }

    /// Anything other than "admin" is the default role.
    pub fn from_db(s: &str) -> Self {
        match s {
            "admin" => Role::Admin,
            _ => Role::None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
}

impl UserRecord {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub booking_id: Uuid,
    pub transaction_id: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Doctor {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub specialty: String,
    pub image: Option<String>,
}

/* -------------------------
   API DTOs
--------------------------*/

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub email: String,
    pub treatment: String,
    pub appoint_date: String,
    pub slot: String,
    pub price: f64,
    #[serde(default)]
    pub patient: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Registration payload. Any client-sent `role` is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub booking_id: Uuid,
    pub transaction_id: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDoctor {
    pub name: String,
    pub email: String,
    pub specialty: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Insert acknowledgement, or a business rejection when `acknowledged` is false.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inserted_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl InsertResult {
    pub fn inserted(id: Uuid) -> Self {
        Self {
            acknowledged: true,
            inserted_id: Some(id),
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            acknowledged: false,
            inserted_id: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/* -------------------------
   Seed data
--------------------------*/

/// Catalog used by the in-memory store; mirrors the rows seeded by the first migration.
pub fn default_catalog() -> Vec<TreatmentOption> {
    let slots = |labels: &[&str]| labels.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let day = [
        "08:00", "08:30", "09:00", "09:30", "10:00", "10:30", "11:00", "11:30", "13:00", "13:30",
    ];

    [
        ("Teeth Orthodontics", 120.0),
        ("Cosmetic Dentistry", 150.0),
        ("Teeth Cleaning", 60.0),
        ("Cavity Protection", 80.0),
        ("Pediatric Dental", 70.0),
        ("Oral Surgery", 200.0),
    ]
    .into_iter()
    .map(|(name, price)| TreatmentOption {
        id: Uuid::new_v4(),
        name: name.to_string(),
        price,
        slots: slots(&day),
    })
    .collect()
}
