use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{Booking, InsertResult, NewBooking},
    notify::{Notifier, dispatch_confirmation},
    store::{Store, StoreError},
};

fn duplicate_message(appoint_date: &str) -> String {
    format!("You already have booking on {appoint_date}")
}

fn required(field: &str, value: &str) -> Result<String, ApiError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ApiError::validation(format!("{field} is required")));
    }
    Ok(v.to_string())
}

fn validate_new_booking(req: NewBooking) -> Result<NewBooking, ApiError> {
    if !req.price.is_finite() || req.price < 0.0 {
        return Err(ApiError::validation("price must be a non-negative number"));
    }
    Ok(NewBooking {
        email: required("email", &req.email)?,
        treatment: required("treatment", &req.treatment)?,
        appoint_date: required("appointDate", &req.appoint_date)?,
        slot: required("slot", &req.slot)?,
        price: req.price,
        patient: req.patient.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        phone: req.phone.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
    })
}

/// Admit a booking unless the caller already holds one for the same
/// treatment on the same day (any slot).
///
/// The lookup below is a fast path; the store's uniqueness rule is what
/// settles concurrent submissions, and its violation is reported the same way.
pub async fn create_booking(
    store: &dyn Store,
    notifier: &Arc<dyn Notifier>,
    req: NewBooking,
) -> Result<InsertResult, ApiError> {
    let req = validate_new_booking(req)?;

    let option = store
        .find_treatment(&req.treatment)
        .await?
        .ok_or_else(|| ApiError::validation(format!("unknown treatment: {}", req.treatment)))?;
    if !option.slots.iter().any(|s| *s == req.slot) {
        return Err(ApiError::validation(format!(
            "{} has no slot {}",
            option.name, req.slot
        )));
    }

    if store
        .find_booking_conflict(&req.email, &req.treatment, &req.appoint_date)
        .await?
        .is_some()
    {
        tracing::info!(treatment = %req.treatment, date = %req.appoint_date, "duplicate booking refused");
        return Ok(InsertResult::rejected(duplicate_message(&req.appoint_date)));
    }

    let appoint_date = req.appoint_date.clone();
    let booking = match store.insert_booking(req).await {
        Ok(b) => b,
        Err(StoreError::Duplicate) => {
            tracing::info!(date = %appoint_date, "duplicate booking refused by store");
            return Ok(InsertResult::rejected(duplicate_message(&appoint_date)));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(booking_id = %booking.id, treatment = %booking.treatment, "booking created");
    let id = booking.id;
    dispatch_confirmation(Arc::clone(notifier), booking);

    Ok(InsertResult::inserted(id))
}

/// Bookings of `email`, visible only to that same identity.
pub async fn bookings_for(
    store: &dyn Store,
    auth: &AuthContext,
    email: Option<&str>,
) -> Result<Vec<Booking>, ApiError> {
    match email {
        Some(email) if email == auth.email => Ok(store.bookings_for(email).await?),
        _ => Err(ApiError::Forbidden(
            "FORBIDDEN",
            "Unauthorized access".into(),
        )),
    }
}

pub async fn booking_by_id(store: &dyn Store, id: Uuid) -> Result<Option<Booking>, ApiError> {
    Ok(store.find_booking(id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            Doctor, NewDoctor, NewPayment, NewUser, TreatmentName, TreatmentOption, UserRecord,
            default_catalog,
        },
        notify::{LogNotifier, NotifyError},
        store::{MemoryStore, PaymentReceipt},
    };
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn booking_confirmed(&self, _booking: &Booking) -> Result<(), NotifyError> {
            Err(NotifyError::Rejected {
                status: 502,
                body: "bad gateway".into(),
            })
        }
    }

    struct RecordingNotifier(mpsc::UnboundedSender<Uuid>);

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn booking_confirmed(&self, booking: &Booking) -> Result<(), NotifyError> {
            let _ = self.0.send(booking.id);
            Ok(())
        }
    }

    fn request(slot: &str, price: f64) -> NewBooking {
        NewBooking {
            email: "patient@example.com".into(),
            treatment: "Teeth Cleaning".into(),
            appoint_date: "2024-01-05".into(),
            slot: slot.into(),
            price,
            patient: Some("Pat".into()),
            phone: None,
        }
    }

    fn log_notifier() -> Arc<dyn Notifier> {
        Arc::new(LogNotifier)
    }

    /// Store whose conflict lookup never finds anything, so only the
    /// uniqueness rule inside `insert_booking` can refuse a duplicate.
    struct NoLookup(MemoryStore);

    impl NoLookup {
        fn new() -> Self {
            Self(MemoryStore::with_catalog(default_catalog()))
        }
    }

    #[async_trait]
    impl Store for NoLookup {
        async fn list_treatments(&self) -> Result<Vec<TreatmentOption>, StoreError> {
            self.0.list_treatments().await
        }
        async fn treatment_names(&self) -> Result<Vec<TreatmentName>, StoreError> {
            self.0.treatment_names().await
        }
        async fn find_treatment(&self, name: &str) -> Result<Option<TreatmentOption>, StoreError> {
            self.0.find_treatment(name).await
        }
        async fn bookings_on(&self, appoint_date: &str) -> Result<Vec<Booking>, StoreError> {
            self.0.bookings_on(appoint_date).await
        }
        async fn bookings_for(&self, email: &str) -> Result<Vec<Booking>, StoreError> {
            self.0.bookings_for(email).await
        }
        async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
            self.0.find_booking(id).await
        }
        async fn find_booking_conflict(
            &self,
            _email: &str,
            _treatment: &str,
            _appoint_date: &str,
        ) -> Result<Option<Booking>, StoreError> {
            Ok(None)
        }
        async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, StoreError> {
            self.0.insert_booking(booking).await
        }
        async fn record_payment(&self, payment: NewPayment) -> Result<PaymentReceipt, StoreError> {
            self.0.record_payment(payment).await
        }
        async fn list_users(&self) -> Result<Vec<UserRecord>, StoreError> {
            self.0.list_users().await
        }
        async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
            self.0.find_user_by_email(email).await
        }
        async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
            self.0.insert_user(user).await
        }
        async fn promote_to_admin(&self, user_id: Uuid) -> Result<(u64, u64), StoreError> {
            self.0.promote_to_admin(user_id).await
        }
        async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError> {
            self.0.list_doctors().await
        }
        async fn insert_doctor(&self, doctor: NewDoctor) -> Result<Doctor, StoreError> {
            self.0.insert_doctor(doctor).await
        }
        async fn delete_doctor(&self, id: Uuid) -> Result<u64, StoreError> {
            self.0.delete_doctor(id).await
        }
    }

    #[tokio::test]
    async fn test_second_booking_same_day_is_rejected() {
        let store = MemoryStore::with_catalog(default_catalog());
        let notifier = log_notifier();

        let first = create_booking(&store, &notifier, request("09:00", 60.0))
            .await
            .unwrap();
        assert!(first.acknowledged);
        assert!(first.inserted_id.is_some());

        let second = create_booking(&store, &notifier, request("10:00", 75.0))
            .await
            .unwrap();
        assert_eq!(
            second,
            InsertResult::rejected("You already have booking on 2024-01-05")
        );
        assert_eq!(store.bookings_for("patient@example.com").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_other_day_or_treatment_is_admitted() {
        let store = MemoryStore::with_catalog(default_catalog());
        let notifier = log_notifier();

        assert!(create_booking(&store, &notifier, request("09:00", 60.0)).await.unwrap().acknowledged);

        let mut other_day = request("09:00", 60.0);
        other_day.appoint_date = "2024-01-06".into();
        assert!(create_booking(&store, &notifier, other_day).await.unwrap().acknowledged);

        let mut other_treatment = request("09:00", 200.0);
        other_treatment.treatment = "Oral Surgery".into();
        assert!(create_booking(&store, &notifier, other_treatment).await.unwrap().acknowledged);
    }

    #[tokio::test]
    async fn test_store_uniqueness_decides_when_lookup_misses() {
        let store = NoLookup::new();
        let notifier = log_notifier();

        assert!(create_booking(&store, &notifier, request("09:00", 60.0)).await.unwrap().acknowledged);

        let second = create_booking(&store, &notifier, request("10:00", 75.0))
            .await
            .unwrap();
        assert_eq!(
            second,
            InsertResult::rejected("You already have booking on 2024-01-05")
        );
        assert_eq!(store.bookings_for("patient@example.com").await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_duplicates_admit_exactly_one() {
        let store: Arc<dyn Store> = Arc::new(NoLookup::new());
        let notifier = log_notifier();
        let slots = ["08:00", "08:30", "09:00", "09:30", "10:00", "10:30", "11:00", "11:30"];

        let handles: Vec<_> = slots
            .iter()
            .map(|slot| {
                let store = Arc::clone(&store);
                let notifier = Arc::clone(&notifier);
                let req = request(slot, 60.0);
                tokio::spawn(async move { create_booking(store.as_ref(), &notifier, req).await })
            })
            .collect();

        let mut admitted = 0;
        for h in handles {
            if h.await.unwrap().unwrap().acknowledged {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
        assert_eq!(store.bookings_on("2024-01-05").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_notifier_failure_does_not_fail_booking() {
        let store = MemoryStore::with_catalog(default_catalog());
        let notifier: Arc<dyn Notifier> = Arc::new(FailingNotifier);

        let res = create_booking(&store, &notifier, request("09:00", 60.0))
            .await
            .unwrap();
        assert!(res.acknowledged);
    }

    #[tokio::test]
    async fn test_confirmation_is_dispatched_for_new_booking() {
        let store = MemoryStore::with_catalog(default_catalog());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let notifier: Arc<dyn Notifier> = Arc::new(RecordingNotifier(tx));

        let res = create_booking(&store, &notifier, request("09:00", 60.0))
            .await
            .unwrap();
        assert_eq!(rx.recv().await, res.inserted_id);
    }

    #[tokio::test]
    async fn test_validation() {
        let store = MemoryStore::with_catalog(default_catalog());
        let notifier = log_notifier();

        let mut blank_email = request("09:00", 60.0);
        blank_email.email = "  ".into();
        assert!(matches!(
            create_booking(&store, &notifier, blank_email).await,
            Err(ApiError::BadRequest("VALIDATION_ERROR", _))
        ));

        let mut unknown = request("09:00", 60.0);
        unknown.treatment = "Hair Cut".into();
        assert!(create_booking(&store, &notifier, unknown).await.is_err());

        assert!(create_booking(&store, &notifier, request("23:00", 60.0)).await.is_err());
        assert!(create_booking(&store, &notifier, request("09:00", -1.0)).await.is_err());
    }

    #[tokio::test]
    async fn test_bookings_confined_to_caller() {
        let store = MemoryStore::with_catalog(default_catalog());
        let notifier = log_notifier();
        create_booking(&store, &notifier, request("09:00", 60.0)).await.unwrap();

        let me = AuthContext {
            email: "patient@example.com".into(),
        };
        assert_eq!(
            bookings_for(&store, &me, Some("patient@example.com")).await.unwrap().len(),
            1
        );
        assert!(matches!(
            bookings_for(&store, &me, Some("someone@example.com")).await,
            Err(ApiError::Forbidden(..))
        ));
        assert!(bookings_for(&store, &me, None).await.is_err());
    }
}
