use std::collections::HashSet;

use crate::models::{Booking, TreatmentOption};

/// Remaining open slots per treatment on `date`.
///
/// Each option's `slots` is reduced to the template labels not taken by a
/// booking for the same treatment on the same day, in template order.
/// `date` is matched verbatim against `Booking::appoint_date`.
pub fn compute_availability(
    date: &str,
    catalog: Vec<TreatmentOption>,
    bookings: &[Booking],
) -> Vec<TreatmentOption> {
    catalog
        .into_iter()
        .map(|mut option| {
            let booked: HashSet<&str> = bookings
                .iter()
                .filter(|b| b.appoint_date == date && b.treatment == option.name)
                .map(|b| b.slot.as_str())
                .collect();

            option.slots.retain(|slot| !booked.contains(slot.as_str()));
            option
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn option(name: &str, slots: &[&str]) -> TreatmentOption {
        TreatmentOption {
            id: Uuid::new_v4(),
            name: name.into(),
            price: 60.0,
            slots: slots.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn booking(treatment: &str, date: &str, slot: &str) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            email: "patient@example.com".into(),
            treatment: treatment.into(),
            appoint_date: date.into(),
            slot: slot.into(),
            price: 60.0,
            patient: None,
            phone: None,
            paid: false,
            transaction_id: None,
        }
    }

    #[test]
    fn test_booked_slot_is_removed() {
        let catalog = vec![option("Teeth Cleaning", &["09:00", "10:00"])];
        let bookings = vec![booking("Teeth Cleaning", "2024-01-05", "09:00")];

        let out = compute_availability("2024-01-05", catalog, &bookings);
        assert_eq!(out[0].slots, vec!["10:00"]);
    }

    #[test]
    fn test_other_treatments_and_dates_are_untouched() {
        let catalog = vec![
            option("Teeth Cleaning", &["09:00", "10:00"]),
            option("Oral Surgery", &["09:00", "10:00", "11:00"]),
        ];
        let bookings = vec![
            booking("Oral Surgery", "2024-01-05", "10:00"),
            booking("Teeth Cleaning", "2024-01-06", "09:00"),
        ];

        let out = compute_availability("2024-01-05", catalog, &bookings);
        assert_eq!(out[0].slots, vec!["09:00", "10:00"]);
        assert_eq!(out[1].slots, vec!["09:00", "11:00"]);
    }

    #[test]
    fn test_template_order_is_preserved() {
        let catalog = vec![option("Pediatric Dental", &["13:00", "08:00", "11:30", "09:00"])];
        let bookings = vec![booking("Pediatric Dental", "Jan 5, 2024", "08:00")];

        let out = compute_availability("Jan 5, 2024", catalog, &bookings);
        assert_eq!(out[0].slots, vec!["13:00", "11:30", "09:00"]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(compute_availability("2024-01-05", vec![], &[]).is_empty());

        let catalog = vec![option("Teeth Cleaning", &["09:00"])];
        assert_eq!(
            compute_availability("2024-01-05", catalog.clone(), &[]),
            catalog
        );
    }

    #[test]
    fn test_never_returns_a_booked_label_and_is_repeatable() {
        let catalog = vec![
            option("A", &["08:00", "08:30", "09:00"]),
            option("B", &["08:00", "08:30"]),
        ];
        let bookings = vec![
            booking("A", "d", "08:00"),
            booking("A", "d", "09:00"),
            booking("B", "d", "08:30"),
            booking("B", "other", "08:00"),
        ];

        let first = compute_availability("d", catalog.clone(), &bookings);
        let second = compute_availability("d", catalog, &bookings);
        assert_eq!(first, second);

        for opt in &first {
            for b in bookings.iter().filter(|b| b.appoint_date == "d" && b.treatment == opt.name) {
                assert!(!opt.slots.contains(&b.slot));
            }
        }
    }
}
