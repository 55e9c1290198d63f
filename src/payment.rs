use crate::{
    error::ApiError,
    models::{InsertResult, NewPayment},
    store::{Store, StoreError},
};

/// Record a payment confirmation and mark its booking paid.
///
/// A transaction id is applied at most once; a replay is answered with
/// `acknowledged: false`. Only the payment insert is reported to the caller.
pub async fn record_payment(store: &dyn Store, req: NewPayment) -> Result<InsertResult, ApiError> {
    let transaction_id = req.transaction_id.trim().to_string();
    if transaction_id.is_empty() {
        return Err(ApiError::validation("transactionId is required"));
    }
    let req = NewPayment {
        transaction_id,
        ..req
    };

    match store.record_payment(req).await {
        Ok(receipt) => {
            if receipt.previously_paid {
                tracing::warn!(
                    booking_id = %receipt.payment.booking_id,
                    "booking was already paid; transaction id replaced"
                );
            }
            if receipt.bookings_updated == 0 {
                tracing::warn!(
                    booking_id = %receipt.payment.booking_id,
                    "payment recorded for unknown booking"
                );
            } else {
                tracing::info!(booking_id = %receipt.payment.booking_id, "booking marked paid");
            }
            Ok(InsertResult::inserted(receipt.payment.id))
        }
        Err(StoreError::Duplicate) => Ok(InsertResult::rejected("Payment already recorded")),
        Err(e) => Err(e.into()),
    }
}
