// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, Row, types::Json};
use uuid::Uuid;

use super::{PaymentReceipt, Store, StoreError};
use crate::models::{
    Booking, Doctor, NewBooking, NewDoctor, NewPayment, NewUser, Payment, Role, TreatmentName,
    TreatmentOption, UserRecord,
};

pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: Option<String>,
    role: String,
}

impl From<UserRow> for UserRecord {
    fn from(r: UserRow) -> Self {
        UserRecord {
            id: r.id,
            email: r.email,
            name: r.name,
            role: Role::from_db(&r.role),
        }
    }
}

fn map_unique(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate,
        _ => StoreError::Database(e),
    }
}

const BOOKING_COLUMNS: &str =
    "id, email, treatment, appoint_date, slot, price, patient, phone, paid, transaction_id";

#[async_trait]
impl Store for PgStore {
    async fn list_treatments(&self) -> Result<Vec<TreatmentOption>, StoreError> {
        let rows = sqlx::query_as::<_, TreatmentOption>(
            r#"
            SELECT id, name, price, slots
            FROM treatment_option
            ORDER BY display_order ASC, name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn treatment_names(&self) -> Result<Vec<TreatmentName>, StoreError> {
        let rows = sqlx::query_as::<_, TreatmentName>(
            r#"
            SELECT id, name
            FROM treatment_option
            ORDER BY display_order ASC, name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_treatment(&self, name: &str) -> Result<Option<TreatmentOption>, StoreError> {
        let row = sqlx::query_as::<_, TreatmentOption>(
            r#"
            SELECT id, name, price, slots
            FROM treatment_option
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn bookings_on(&self, appoint_date: &str) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM booking WHERE appoint_date = $1"
        ))
        .bind(appoint_date)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn bookings_for(&self, email: &str) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM booking WHERE email = $1 ORDER BY created_at ASC"
        ))
        .bind(email)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM booking WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn find_booking_conflict(
        &self,
        email: &str,
        treatment: &str,
        appoint_date: &str,
    ) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM booking
             WHERE email = $1 AND treatment = $2 AND appoint_date = $3
             LIMIT 1"
        ))
        .bind(email)
        .bind(treatment)
        .bind(appoint_date)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, StoreError> {
        // booking_once_per_day (email, treatment, appoint_date) is the authoritative guard
        sqlx::query_as::<_, Booking>(&format!(
            "INSERT INTO booking (email, treatment, appoint_date, slot, price, patient, phone)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(&booking.email)
        .bind(&booking.treatment)
        .bind(&booking.appoint_date)
        .bind(&booking.slot)
        .bind(booking.price)
        .bind(booking.patient.as_deref())
        .bind(booking.phone.as_deref())
        .fetch_one(&self.db)
        .await
        .map_err(map_unique)
    }

    async fn record_payment(&self, payment: NewPayment) -> Result<PaymentReceipt, StoreError> {
        let mut tx = self.db.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO payment (booking_id, transaction_id, details)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(payment.booking_id)
        .bind(&payment.transaction_id)
        .bind(Json(&payment.details))
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique)?;
        let id: Uuid = row.try_get("id")?;

        let previously_paid: Option<bool> = sqlx::query_scalar(
            r#"
            SELECT paid
            FROM booking
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(payment.booking_id)
        .fetch_optional(&mut *tx)
        .await?;

        let res = sqlx::query(
            r#"
            UPDATE booking
            SET paid = true,
                transaction_id = $2
            WHERE id = $1
            "#,
        )
        .bind(payment.booking_id)
        .bind(&payment.transaction_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(PaymentReceipt {
            payment: Payment {
                id,
                booking_id: payment.booking_id,
                transaction_id: payment.transaction_id,
                details: payment.details,
            },
            bookings_updated: res.rows_affected(),
            previously_paid: previously_paid.unwrap_or(false),
        })
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, role
            FROM app_user
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(UserRecord::from).collect())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, role
            FROM app_user
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(UserRecord::from))
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO app_user (email, name, role)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, role
            "#,
        )
        .bind(&user.email)
        .bind(user.name.as_deref())
        .bind(Role::None.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(map_unique)?;
        Ok(row.into())
    }

    async fn promote_to_admin(&self, user_id: Uuid) -> Result<(u64, u64), StoreError> {
        let matched: Option<String> = sqlx::query_scalar(
            r#"
            SELECT role
            FROM app_user
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        let Some(role) = matched else {
            return Ok((0, 0));
        };
        if Role::from_db(&role) == Role::Admin {
            return Ok((1, 0));
        }

        let res = sqlx::query(
            r#"
            UPDATE app_user
            SET role = $2
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(Role::Admin.as_str())
        .execute(&self.db)
        .await?;

        Ok((1, res.rows_affected()))
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError> {
        let rows = sqlx::query_as::<_, Doctor>(
            r#"
            SELECT id, name, email, specialty, image
            FROM doctor
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn insert_doctor(&self, doctor: NewDoctor) -> Result<Doctor, StoreError> {
        let row = sqlx::query_as::<_, Doctor>(
            r#"
            INSERT INTO doctor (name, email, specialty, image)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, specialty, image
            "#,
        )
        .bind(&doctor.name)
        .bind(&doctor.email)
        .bind(&doctor.specialty)
        .bind(doctor.image.as_deref())
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn delete_doctor(&self, id: Uuid) -> Result<u64, StoreError> {
        let res = sqlx::query(r#"DELETE FROM doctor WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected())
    }
}
