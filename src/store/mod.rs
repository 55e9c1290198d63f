// src/store/mod.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    Booking, Doctor, NewBooking, NewDoctor, NewPayment, NewUser, Payment, TreatmentName,
    TreatmentOption, UserRecord,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness rule rejected the write (booking triple, user email, transaction id).
    #[error("duplicate record")]
    Duplicate,
    #[error("db error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Outcome of recording a payment: the inserted payment plus how many bookings were marked paid.
#[derive(Debug)]
pub struct PaymentReceipt {
    pub payment: Payment,
    pub bookings_updated: u64,
    /// The booking was already marked paid by an earlier transaction id.
    pub previously_paid: bool,
}

/// Persistence seam shared by every service. Implementations must enforce
/// uniqueness of `(email, treatment, appoint_date)` on `insert_booking`,
/// of `email` on `insert_user`, and of `transaction_id` on `record_payment`,
/// returning `StoreError::Duplicate` on violation.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_treatments(&self) -> Result<Vec<TreatmentOption>, StoreError>;
    async fn treatment_names(&self) -> Result<Vec<TreatmentName>, StoreError>;
    async fn find_treatment(&self, name: &str) -> Result<Option<TreatmentOption>, StoreError>;

    async fn bookings_on(&self, appoint_date: &str) -> Result<Vec<Booking>, StoreError>;
    async fn bookings_for(&self, email: &str) -> Result<Vec<Booking>, StoreError>;
    async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError>;
    async fn find_booking_conflict(
        &self,
        email: &str,
        treatment: &str,
        appoint_date: &str,
    ) -> Result<Option<Booking>, StoreError>;
    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, StoreError>;

    /// Inserts the payment and marks its booking paid as one unit.
    async fn record_payment(&self, payment: NewPayment) -> Result<PaymentReceipt, StoreError>;

    async fn list_users(&self) -> Result<Vec<UserRecord>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StoreError>;
    /// Returns `(matched, modified)`.
    async fn promote_to_admin(&self, user_id: Uuid) -> Result<(u64, u64), StoreError>;

    async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError>;
    async fn insert_doctor(&self, doctor: NewDoctor) -> Result<Doctor, StoreError>;
    async fn delete_doctor(&self, id: Uuid) -> Result<u64, StoreError>;
}
