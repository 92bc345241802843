use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::drivers::{DriverId, DriverStatus};
use entities::payments::{PaymentMethod, PaymentStatus};
use entities::rides::{Ride, RideId, RideStatus, RideType};
use entities::users::UserId;
use entities::vehicles::{VehicleStatus, VehicleType};
use entities::wallet::{BookingRef, TransactionKind};
use shared_kernel::TimeWindow;

use crate::repository::Repository;
use use_cases::pricing::{loyalty_points, ride_fare};
use use_cases::rides::book_ride::JoinSharedRideError;
use use_cases::rides::cancel_ride::CancelRideError;
use use_cases::rides::complete_ride::CompleteRideError;
use use_cases::rides::update_ride::UpdateRideError;
use use_cases::rides::{
    cancellation_refund, DriverWithVehicle, RideCancellationOutcome, RideCompletionOutcome,
    RideHailingRepo, SharedRideCandidate,
};

#[async_trait]
impl RideHailingRepo for Repository {
    async fn find_ride(&self, id: RideId) -> anyhow::Result<Option<Ride>> {
        Ok(self.read().await.rides.get(&id).cloned())
    }

    async fn rides_for_user(&self, user: UserId) -> anyhow::Result<Vec<Ride>> {
        let state = self.read().await;
        Ok(state
            .rides
            .values()
            .filter(|ride| ride.user_id == user)
            .cloned()
            .collect())
    }

    async fn available_drivers(
        &self,
        vehicle_type: VehicleType,
    ) -> anyhow::Result<Vec<DriverWithVehicle>> {
        let state = self.read().await;
        let mut matches = Vec::new();
        for driver_id in &state.driver_order {
            let Some(driver) = state.drivers.get(driver_id) else {
                continue;
            };
            if driver.status != DriverStatus::Available {
                continue;
            }
            let Some(vehicle) = state.vehicles.get(&driver.vehicle_id) else {
                continue;
            };
            if vehicle.vehicle_type == vehicle_type && vehicle.status == VehicleStatus::Active {
                matches.push(DriverWithVehicle {
                    driver: driver.clone(),
                    vehicle: vehicle.clone(),
                });
            }
        }
        Ok(matches)
    }

    async fn acquire_driver(&self, driver: DriverId) -> anyhow::Result<bool> {
        let mut state = self.write().await;
        match state.drivers.get_mut(&driver) {
            Some(driver) if driver.status == DriverStatus::Available => {
                driver.status = DriverStatus::OnRide;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_driver_if_idle(
        &self,
        driver: DriverId,
        excluding: RideId,
    ) -> anyhow::Result<bool> {
        let mut state = self.write().await;
        if state.open_rides_for_driver(driver, Some(excluding)) > 0 {
            return Ok(false);
        }
        match state.drivers.get_mut(&driver) {
            Some(driver) if driver.status == DriverStatus::OnRide => {
                driver.status = DriverStatus::Available;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn shared_ride_candidates(
        &self,
        vehicle_type: VehicleType,
        window: TimeWindow,
    ) -> anyhow::Result<Vec<SharedRideCandidate>> {
        let state = self.read().await;
        let mut candidates = Vec::new();

        for ride_id in &state.ride_order {
            let Some(ride) = state.rides.get(ride_id) else {
                continue;
            };
            if ride.status != RideStatus::Active || !ride.is_shared {
                continue;
            }
            let Some(vehicle) = state.vehicles.get(&ride.vehicle_id) else {
                continue;
            };
            if vehicle.vehicle_type != vehicle_type {
                continue;
            }

            let reference = match ride.ride_type {
                RideType::OnDemand => ride.start_time,
                RideType::Scheduled => ride.scheduled_time,
            };
            let in_window = reference
                .map(|instant| window.contains_instant(instant))
                .unwrap_or(false);
            if !in_window {
                continue;
            }

            candidates.push(SharedRideCandidate {
                ride: ride.clone(),
                vehicle_capacity: vehicle.capacity,
                booked_seats: state.booked_seats(ride.id),
            });
        }

        Ok(candidates)
    }

    async fn insert_ride(&self, ride: Ride) -> anyhow::Result<Ride> {
        let mut state = self.write().await;
        state.ride_order.push(ride.id);
        state.rides.insert(ride.id, ride.clone());
        Ok(ride)
    }

    async fn join_shared_ride(
        &self,
        parent: RideId,
        ride: Ride,
    ) -> Result<Ride, JoinSharedRideError> {
        let mut state = self.write().await;

        let parent_ride = state
            .rides
            .get(&parent)
            .ok_or(JoinSharedRideError::NotJoinable)?;
        if parent_ride.status != RideStatus::Active || !parent_ride.is_shared {
            return Err(JoinSharedRideError::NotJoinable);
        }

        let capacity = state
            .vehicles
            .get(&parent_ride.vehicle_id)
            .map(|vehicle| vehicle.capacity)
            .ok_or_else(|| anyhow::anyhow!("vehicle missing for parent ride {parent}"))?;

        let booked = state.booked_seats(parent);
        if capacity.saturating_sub(booked) < ride.seats_booked {
            return Err(JoinSharedRideError::CapacityExhausted);
        }

        state.ride_order.push(ride.id);
        state.rides.insert(ride.id, ride.clone());
        Ok(ride)
    }

    async fn cancel_ride(
        &self,
        id: RideId,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<RideCancellationOutcome, CancelRideError> {
        let mut state = self.write().await;

        let ride = state
            .rides
            .get(&id)
            .filter(|ride| ride.user_id == user)
            .cloned()
            .ok_or(CancelRideError::NotFound)?;
        if !ride.is_open() {
            return Err(CancelRideError::NotOpen);
        }

        let refund = cancellation_refund(&ride);
        let refund_amount = refund.as_ref().map(|refund| refund.amount).unwrap_or(0);

        if refund_amount > 0 {
            let description = refund
                .as_ref()
                .expect("amount implies a decision")
                .description
                .to_string();
            state.credit(
                user,
                refund_amount,
                TransactionKind::Refund,
                description,
                Some(BookingRef::Ride(id)),
                now,
            );
        }

        let stored = state
            .rides
            .get_mut(&id)
            .expect("ride present under the same guard");
        stored.status = RideStatus::Cancelled;
        if refund_amount > 0 {
            stored.payment_status = PaymentStatus::Refunded;
        }
        let ride = stored.clone();

        Ok(RideCancellationOutcome {
            ride,
            refund_amount,
            refund_description: refund.map(|refund| refund.description.to_string()),
        })
    }

    async fn complete_ride(
        &self,
        id: RideId,
        user: UserId,
        method: PaymentMethod,
        loyalty_percent: u8,
        now: DateTime<Utc>,
    ) -> Result<RideCompletionOutcome, CompleteRideError> {
        let mut state = self.write().await;

        let ride = state
            .rides
            .get(&id)
            .filter(|ride| ride.user_id == user)
            .cloned()
            .ok_or(CompleteRideError::NotFound)?;
        if ride.status != RideStatus::Active {
            return Err(CompleteRideError::NotActive);
        }
        if ride.payment_status == PaymentStatus::Paid {
            return Err(CompleteRideError::AlreadyPaid);
        }

        if method == PaymentMethod::Wallet {
            let description = format!(
                "Payment for ride from {} to {}",
                ride.pickup.name, ride.dropoff.name
            );
            let settled = state.debit(
                user,
                ride.fare,
                description,
                Some(BookingRef::Ride(id)),
                now,
            );
            if !settled {
                return Err(CompleteRideError::InsufficientBalance);
            }
        }

        let points = loyalty_points(ride.fare, loyalty_percent);
        if points > 0 {
            state.wallet_mut(user).loyalty_points += points;
        }

        let stored = state
            .rides
            .get_mut(&id)
            .expect("ride present under the same guard");
        stored.status = RideStatus::Completed;
        stored.payment_status = PaymentStatus::Paid;
        stored.end_time = Some(now);
        let ride = stored.clone();

        Ok(RideCompletionOutcome {
            ride,
            loyalty_points_awarded: points,
        })
    }

    async fn set_ride_sharing(
        &self,
        id: RideId,
        user: UserId,
        is_shared: bool,
    ) -> Result<Ride, UpdateRideError> {
        let mut state = self.write().await;

        let ride = state
            .rides
            .get(&id)
            .filter(|ride| ride.user_id == user)
            .cloned()
            .ok_or(UpdateRideError::NotFound)?;
        if ride.status != RideStatus::Active {
            return Err(UpdateRideError::NotActive);
        }

        let capacity = state
            .vehicles
            .get(&ride.vehicle_id)
            .map(|vehicle| vehicle.capacity)
            .ok_or_else(|| anyhow::anyhow!("vehicle missing for ride {id}"))?;

        let stored = state
            .rides
            .get_mut(&id)
            .expect("ride present under the same guard");
        stored.is_shared = is_shared;
        stored.fare = ride_fare(stored.distance_km, capacity, stored.seats_booked, is_shared);
        Ok(stored.clone())
    }
}
