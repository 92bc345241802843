pub mod book_ride;
pub mod cancel_ride;
pub mod complete_ride;
pub mod queries;
pub mod update_ride;
pub mod vehicle_availability;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::drivers::{Driver, DriverId};
use entities::payments::{PaymentMethod, PaymentStatus};
use entities::rides::{Ride, RideId, RideType};
use entities::users::UserId;
use entities::vehicles::{Vehicle, VehicleType};
#[cfg(test)]
use mockall::automock;
use shared_kernel::TimeWindow;

use crate::rides::book_ride::JoinSharedRideError;
use crate::rides::cancel_ride::CancelRideError;
use crate::rides::complete_ride::CompleteRideError;
use crate::rides::update_ride::UpdateRideError;

/// Pooling candidates must start within this many minutes of the requested
/// reference time.
pub const POOLING_BUFFER_MINUTES: i64 = 10;

#[derive(Clone, Debug)]
pub struct DriverWithVehicle {
    pub driver: Driver,
    pub vehicle: Vehicle,
}

#[derive(Clone, Debug)]
pub struct SharedRideCandidate {
    pub ride: Ride,
    pub vehicle_capacity: u8,
    /// Seats across the candidate itself plus every child referencing it.
    pub booked_seats: u8,
}

impl SharedRideCandidate {
    pub fn remaining_seats(&self) -> u8 {
        self.vehicle_capacity.saturating_sub(self.booked_seats)
    }
}

#[derive(Clone, Debug)]
pub struct RideCancellationOutcome {
    pub ride: Ride,
    pub refund_amount: u64,
    pub refund_description: Option<String>,
}

#[derive(Clone, Debug)]
pub struct RideCompletionOutcome {
    pub ride: Ride,
    pub loyalty_points_awarded: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RideRefund {
    pub amount: u64,
    pub description: &'static str,
}

/// Two tiers only, unlike reservations: everything back if the trip never
/// started, nothing once it did.
pub fn cancellation_refund(ride: &Ride) -> Option<RideRefund> {
    if ride.payment_status != PaymentStatus::Paid {
        return None;
    }

    if ride.start_time.is_none() || ride.ride_type == RideType::Scheduled {
        Some(RideRefund {
            amount: ride.fare,
            description: "Full refund - ride cancelled before start",
        })
    } else {
        Some(RideRefund {
            amount: 0,
            description: "No refund - ride already started",
        })
    }
}

pub fn validate_seats(vehicle_type: VehicleType, seats_required: u8) -> Result<(), u8> {
    let capacity = vehicle_type.capacity();
    if seats_required == 0 || seats_required > capacity {
        return Err(capacity);
    }
    Ok(())
}

/// Store contract for the ride path. Driver acquisition is a compare-and-swap
/// and `join_shared_ride` runs its seat arithmetic and the child insert under
/// the parent ride's guard, so concurrent pool joins cannot oversubscribe the
/// vehicle.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RideHailingRepo: Send + Sync {
    async fn find_ride(&self, id: RideId) -> anyhow::Result<Option<Ride>>;

    async fn rides_for_user(&self, user: UserId) -> anyhow::Result<Vec<Ride>>;

    /// Drivers in status available whose assigned vehicle matches the type
    /// and is itself active.
    async fn available_drivers(
        &self,
        vehicle_type: VehicleType,
    ) -> anyhow::Result<Vec<DriverWithVehicle>>;

    /// `available → on_ride`; false when someone else won the driver first.
    async fn acquire_driver(&self, driver: DriverId) -> anyhow::Result<bool>;

    /// `on_ride → available`, but only when no other pending/active ride
    /// still references the driver. Returns whether the flip happened.
    async fn release_driver_if_idle(
        &self,
        driver: DriverId,
        excluding: RideId,
    ) -> anyhow::Result<bool>;

    /// Active shared rides of the given vehicle type whose start time
    /// (on-demand) or scheduled time (scheduled) falls inside `window`, in
    /// store order.
    async fn shared_ride_candidates(
        &self,
        vehicle_type: VehicleType,
        window: TimeWindow,
    ) -> anyhow::Result<Vec<SharedRideCandidate>>;

    async fn insert_ride(&self, ride: Ride) -> anyhow::Result<Ride>;

    async fn join_shared_ride(&self, parent: RideId, ride: Ride)
        -> Result<Ride, JoinSharedRideError>;

    async fn cancel_ride(
        &self,
        id: RideId,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<RideCancellationOutcome, CancelRideError>;

    /// Completes an active ride: settles payment (debiting the wallet for the
    /// wallet method), stamps the end time and awards `loyalty_percent` of
    /// the fare as points, all in one unit.
    async fn complete_ride(
        &self,
        id: RideId,
        user: UserId,
        method: PaymentMethod,
        loyalty_percent: u8,
        now: DateTime<Utc>,
    ) -> Result<RideCompletionOutcome, CompleteRideError>;

    /// Flips the sharing flag of an active ride and recomputes its fare from
    /// the stored distance, capacity and seats.
    async fn set_ride_sharing(
        &self,
        id: RideId,
        user: UserId,
        is_shared: bool,
    ) -> Result<Ride, UpdateRideError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use entities::geo::GeoPoint;
    use entities::qr::QrCode;
    use entities::rides::{RideStatus, RideStop};
    use entities::vehicles::VehicleId;

    fn ride(ride_type: RideType, started: bool, paid: bool) -> Ride {
        let now = Utc.with_ymd_and_hms(2023, 6, 14, 10, 0, 0).unwrap();
        Ride {
            id: RideId::new(),
            user_id: UserId::new(),
            driver_id: DriverId::new(),
            vehicle_id: VehicleId::new(),
            pickup: RideStop {
                name: "Rajiv Chowk".to_string(),
                point: GeoPoint::new(77.2167, 28.6328),
            },
            dropoff: RideStop {
                name: "Connaught Place".to_string(),
                point: GeoPoint::new(77.2295, 28.6129),
            },
            ride_type,
            scheduled_time: (ride_type == RideType::Scheduled).then_some(now),
            start_time: started.then_some(now),
            end_time: None,
            distance_km: 2.7,
            fare: 240,
            seats_booked: 1,
            is_shared: false,
            status: RideStatus::Active,
            payment_status: if paid {
                PaymentStatus::Paid
            } else {
                PaymentStatus::Pending
            },
            qr_code: QrCode::generate(),
            parent_ride_id: None,
            created_at: now,
        }
    }

    #[test]
    fn test_unpaid_rides_refund_nothing() {
        assert_eq!(cancellation_refund(&ride(RideType::OnDemand, true, false)), None);
    }

    #[test]
    fn test_unstarted_paid_ride_refunds_the_full_fare() {
        let refund = cancellation_refund(&ride(RideType::OnDemand, false, true)).unwrap();
        assert_eq!(refund.amount, 240);
    }

    #[test]
    fn test_scheduled_paid_ride_refunds_even_after_start_stamp() {
        let refund = cancellation_refund(&ride(RideType::Scheduled, true, true)).unwrap();
        assert_eq!(refund.amount, 240);
    }

    #[test]
    fn test_started_on_demand_ride_refunds_nothing() {
        let refund = cancellation_refund(&ride(RideType::OnDemand, true, true)).unwrap();
        assert_eq!(refund.amount, 0);
    }

    #[test]
    fn test_seat_bounds_follow_vehicle_capacity() {
        assert!(validate_seats(VehicleType::Cab, 1).is_ok());
        assert!(validate_seats(VehicleType::Cab, 4).is_ok());
        assert_eq!(validate_seats(VehicleType::Cab, 5), Err(4));
        assert_eq!(validate_seats(VehicleType::ERickshaw, 0), Err(3));
        assert!(validate_seats(VehicleType::Shuttle, 8).is_ok());
    }
}
