// src/store/memory.rs

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{PaymentReceipt, Store, StoreError};
use crate::models::{
    Booking, Doctor, NewBooking, NewDoctor, NewPayment, NewUser, Payment, Role, TreatmentName,
    TreatmentOption, UserRecord,
};

#[derive(Default)]
struct Collections {
    treatments: Vec<TreatmentOption>,
    bookings: Vec<Booking>,
    users: Vec<UserRecord>,
    payments: Vec<Payment>,
    doctors: Vec<Doctor>,
}

/// Process-local store. Every write takes the single write lock, so
/// check-and-insert sequences are atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn with_catalog(treatments: Vec<TreatmentOption>) -> Self {
        Self {
            inner: RwLock::new(Collections {
                treatments,
                ..Collections::default()
            }),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_treatments(&self) -> Result<Vec<TreatmentOption>, StoreError> {
        Ok(self.inner.read().await.treatments.clone())
    }

    async fn treatment_names(&self) -> Result<Vec<TreatmentName>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .treatments
            .iter()
            .map(|t| TreatmentName {
                id: t.id,
                name: t.name.clone(),
            })
            .collect())
    }

    async fn find_treatment(&self, name: &str) -> Result<Option<TreatmentOption>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.treatments.iter().find(|t| t.name == name).cloned())
    }

    async fn bookings_on(&self, appoint_date: &str) -> Result<Vec<Booking>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .bookings
            .iter()
            .filter(|b| b.appoint_date == appoint_date)
            .cloned()
            .collect())
    }

    async fn bookings_for(&self, email: &str) -> Result<Vec<Booking>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .bookings
            .iter()
            .filter(|b| b.email == email)
            .cloned()
            .collect())
    }

    async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn find_booking_conflict(
        &self,
        email: &str,
        treatment: &str,
        appoint_date: &str,
    ) -> Result<Option<Booking>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .bookings
            .iter()
            .find(|b| b.email == email && b.treatment == treatment && b.appoint_date == appoint_date)
            .cloned())
    }

    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, StoreError> {
        let mut inner = self.inner.write().await;
        let taken = inner.bookings.iter().any(|b| {
            b.email == booking.email
                && b.treatment == booking.treatment
                && b.appoint_date == booking.appoint_date
        });
        if taken {
            return Err(StoreError::Duplicate);
        }

        let row = Booking {
            id: Uuid::new_v4(),
            email: booking.email,
            treatment: booking.treatment,
            appoint_date: booking.appoint_date,
            slot: booking.slot,
            price: booking.price,
            patient: booking.patient,
            phone: booking.phone,
            paid: false,
            transaction_id: None,
        };
        inner.bookings.push(row.clone());
        Ok(row)
    }

    async fn record_payment(&self, payment: NewPayment) -> Result<PaymentReceipt, StoreError> {
        let mut inner = self.inner.write().await;
        if inner
            .payments
            .iter()
            .any(|p| p.transaction_id == payment.transaction_id)
        {
            return Err(StoreError::Duplicate);
        }

        let row = Payment {
            id: Uuid::new_v4(),
            booking_id: payment.booking_id,
            transaction_id: payment.transaction_id,
            details: payment.details,
        };
        inner.payments.push(row.clone());

        let mut bookings_updated = 0;
        let mut previously_paid = false;
        if let Some(b) = inner.bookings.iter_mut().find(|b| b.id == row.booking_id) {
            previously_paid = b.paid;
            b.paid = true;
            b.transaction_id = Some(row.transaction_id.clone());
            bookings_updated = 1;
        }

        Ok(PaymentReceipt {
            payment: row,
            bookings_updated,
            previously_paid,
        })
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        Ok(self.inner.read().await.users.clone())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate);
        }
        let row = UserRecord {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            role: Role::None,
        };
        inner.users.push(row.clone());
        Ok(row)
    }

    async fn promote_to_admin(&self, user_id: Uuid) -> Result<(u64, u64), StoreError> {
        let mut inner = self.inner.write().await;
        match inner.users.iter_mut().find(|u| u.id == user_id) {
            Some(u) if u.role == Role::Admin => Ok((1, 0)),
            Some(u) => {
                u.role = Role::Admin;
                Ok((1, 1))
            }
            None => Ok((0, 0)),
        }
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError> {
        Ok(self.inner.read().await.doctors.clone())
    }

    async fn insert_doctor(&self, doctor: NewDoctor) -> Result<Doctor, StoreError> {
        let row = Doctor {
            id: Uuid::new_v4(),
            name: doctor.name,
            email: doctor.email,
            specialty: doctor.specialty,
            image: doctor.image,
        };
        self.inner.write().await.doctors.push(row.clone());
        Ok(row)
    }

    async fn delete_doctor(&self, id: Uuid) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.doctors.len();
        inner.doctors.retain(|d| d.id != id);
        Ok((before - inner.doctors.len()) as u64)
    }
}
