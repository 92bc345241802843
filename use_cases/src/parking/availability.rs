use entities::parking::{ParkingSlot, SlotId, SlotStatus, ZoneName};
use entities::reservations::Reservation;
use serde::Serialize;
use shared_kernel::TimeWindow;
use std::collections::{BTreeMap, HashMap};

use crate::pricing::contention_multiplier;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnavailableReason {
    Maintenance,
    Restricted { reason: String },
    Reserved,
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            UnavailableReason::Maintenance => f.write_str("maintenance"),
            UnavailableReason::Restricted { reason } => f.write_str(reason),
            UnavailableReason::Reserved => f.write_str("reserved"),
        }
    }
}

/// The three availability checks, in the order that decides the reported
/// reason: maintenance first, then admin restrictions, then reservations.
pub fn slot_unavailability(
    slot: &ParkingSlot,
    reserved_windows: &[TimeWindow],
    window: &TimeWindow,
) -> Option<UnavailableReason> {
    if slot.status == SlotStatus::Maintenance {
        return Some(UnavailableReason::Maintenance);
    }

    for restriction in &slot.time_restrictions {
        if restriction.window.overlaps(window) {
            return Some(UnavailableReason::Restricted {
                reason: restriction.reason.clone(),
            });
        }
    }

    if window.conflicts_with_any(reserved_windows.iter()) {
        return Some(UnavailableReason::Reserved);
    }

    None
}

#[derive(Clone, Debug, Serialize)]
pub struct SlotAvailability {
    #[serde(flatten)]
    pub slot: ParkingSlot,
    pub unavailable_reason: Option<UnavailableReason>,
}

impl SlotAvailability {
    pub fn is_available(&self) -> bool {
        self.unavailable_reason.is_none()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct LotAvailability {
    pub total_slots: usize,
    pub available_slots: usize,
    pub availability_percentage: f64,
    pub price_multiplier: f64,
    pub zones: BTreeMap<ZoneName, Vec<SlotAvailability>>,
}

impl LotAvailability {
    pub fn slot(&self, id: SlotId) -> Option<&SlotAvailability> {
        self.zones
            .values()
            .flatten()
            .find(|availability| availability.slot.id == id)
    }
}

/// Evaluates every slot of a lot against the candidate window. `reservations`
/// is the lot's active set; the live percentage feeds the pricing multiplier.
pub fn evaluate_lot(
    slots: Vec<ParkingSlot>,
    reservations: &[Reservation],
    window: &TimeWindow,
) -> LotAvailability {
    let mut windows_by_slot: HashMap<SlotId, Vec<TimeWindow>> = HashMap::new();
    for reservation in reservations.iter().filter(|r| r.is_active()) {
        windows_by_slot
            .entry(reservation.parking_slot_id)
            .or_default()
            .push(reservation.window);
    }

    let total_slots = slots.len();
    let mut available_slots = 0;
    let mut zones: BTreeMap<ZoneName, Vec<SlotAvailability>> = BTreeMap::new();

    for slot in slots {
        let reserved_windows = windows_by_slot.remove(&slot.id).unwrap_or_default();
        let unavailable_reason = slot_unavailability(&slot, &reserved_windows, window);
        if unavailable_reason.is_none() {
            available_slots += 1;
        }
        zones.entry(slot.zone.clone()).or_default().push(SlotAvailability {
            slot,
            unavailable_reason,
        });
    }

    let availability_percentage = if total_slots == 0 {
        100.0
    } else {
        available_slots as f64 / total_slots as f64 * 100.0
    };

    LotAvailability {
        total_slots,
        available_slots,
        availability_percentage,
        price_multiplier: contention_multiplier(availability_percentage),
        zones,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use entities::parking::{LotId, SlotNumber, TimeRestriction};
    use entities::payments::PaymentStatus;
    use entities::qr::QrCode;
    use entities::reservations::{ReservationId, ReservationStatus};
    use entities::users::UserId;

    fn window(start_hour: u32, end_hour: u32) -> TimeWindow {
        TimeWindow::new(
            Utc.with_ymd_and_hms(2023, 6, 14, start_hour, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2023, 6, 14, end_hour, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn slot(number: &str, zone: &str, status: SlotStatus) -> ParkingSlot {
        ParkingSlot {
            id: SlotId::new(),
            lot_id: LotId::new(),
            slot_number: SlotNumber::from(number),
            zone: ZoneName::from(zone),
            status,
            time_restrictions: vec![],
        }
    }

    fn active_reservation(slot: &ParkingSlot, window: TimeWindow) -> Reservation {
        Reservation {
            id: ReservationId::new(),
            user_id: UserId::new(),
            parking_lot_id: slot.lot_id,
            parking_slot_id: slot.id,
            qr_code: QrCode::generate(),
            window,
            status: ReservationStatus::Active,
            payment_status: PaymentStatus::Paid,
            price: 100,
            created_at: Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_maintenance_takes_precedence_over_restrictions() {
        let mut slot = slot("A2", "A", SlotStatus::Maintenance);
        slot.time_restrictions.push(TimeRestriction {
            window: window(9, 18),
            reason: "cleaning".to_string(),
            description: String::new(),
        });

        let reason = slot_unavailability(&slot, &[], &window(10, 12));
        assert_eq!(reason, Some(UnavailableReason::Maintenance));
    }

    #[test]
    fn test_restriction_reason_is_reported_before_reservations() {
        let mut slot = slot("A3", "A", SlotStatus::Available);
        slot.time_restrictions.push(TimeRestriction {
            window: window(9, 18),
            reason: "event parking".to_string(),
            description: String::new(),
        });

        let reason = slot_unavailability(&slot, &[window(10, 12)], &window(10, 12));
        assert_eq!(
            reason,
            Some(UnavailableReason::Restricted {
                reason: "event parking".to_string()
            })
        );
    }

    #[test]
    fn test_overlapping_reservation_marks_slot_reserved() {
        let slot = slot("A1", "A", SlotStatus::Available);
        let reason = slot_unavailability(&slot, &[window(11, 13)], &window(10, 12));
        assert_eq!(reason, Some(UnavailableReason::Reserved));
    }

    #[test]
    fn test_back_to_back_windows_leave_slot_available() {
        let slot = slot("A1", "A", SlotStatus::Available);
        assert_eq!(slot_unavailability(&slot, &[window(12, 14)], &window(10, 12)), None);
    }

    #[test]
    fn test_evaluate_lot_counts_and_groups_by_zone() {
        let lot_id = LotId::new();
        let mut a1 = slot("A1", "A", SlotStatus::Available);
        let mut a2 = slot("A2", "A", SlotStatus::Maintenance);
        let mut b1 = slot("B1", "B", SlotStatus::Available);
        a1.lot_id = lot_id;
        a2.lot_id = lot_id;
        b1.lot_id = lot_id;
        let reserved = active_reservation(&b1, window(10, 12));

        let availability = evaluate_lot(vec![a1, a2, b1], &[reserved], &window(11, 13));

        assert_eq!(availability.total_slots, 3);
        assert_eq!(availability.available_slots, 1);
        let zones: Vec<_> = availability.zones.keys().cloned().collect();
        assert_eq!(zones, vec![ZoneName::from("A"), ZoneName::from("B")]);
    }

    #[test]
    fn test_low_availability_drives_up_the_multiplier() {
        let slots: Vec<_> = (0..10)
            .map(|i| {
                let status = if i == 0 {
                    SlotStatus::Available
                } else {
                    SlotStatus::Maintenance
                };
                slot(&format!("A{i}"), "A", status)
            })
            .collect();

        let availability = evaluate_lot(slots, &[], &window(10, 12));
        assert_eq!(availability.availability_percentage, 10.0);
        assert_eq!(availability.price_multiplier, 1.15);
    }

    #[test]
    fn test_cancelled_reservations_do_not_block() {
        let slot_entity = slot("A1", "A", SlotStatus::Available);
        let mut reservation = active_reservation(&slot_entity, window(10, 12));
        reservation.status = ReservationStatus::Cancelled;

        let availability = evaluate_lot(vec![slot_entity], &[reservation], &window(10, 12));
        assert_eq!(availability.available_slots, 1);
    }
}
