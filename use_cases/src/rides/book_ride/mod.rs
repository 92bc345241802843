use chrono::{DateTime, Duration, Utc};
use entities::payments::PaymentStatus;
use entities::qr::QrCode;
use entities::rides::{Ride, RideId, RideStatus, RideStop, RideType};
use entities::users::UserId;
use entities::vehicles::VehicleType;
use shared_kernel::TimeWindow;
use std::sync::Arc;
use thiserror::Error;

use crate::clock::Clock;
use crate::pricing::ride_fare;
use crate::randomness::Randomness;
use crate::rides::{validate_seats, RideHailingRepo, POOLING_BUFFER_MINUTES};

#[derive(Debug, Clone)]
pub struct RideRequest {
    pub pickup: RideStop,
    pub dropoff: RideStop,
    pub ride_type: RideType,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub vehicle_type: VehicleType,
    pub seats_required: u8,
    pub is_shared: bool,
}

/// Produced by the store when an atomic pool join cannot take the new rider.
#[derive(Error, Debug)]
pub enum JoinSharedRideError {
    #[error("the shared ride no longer has enough free seats")]
    CapacityExhausted,
    #[error("the shared ride is no longer joinable")]
    NotJoinable,
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum BookRideError {
    #[error("scheduled time is required for scheduled rides")]
    MissingScheduledTime,
    #[error("invalid number of seats. Must be between 1 and {max} for {vehicle_type}")]
    InvalidSeatCount { vehicle_type: VehicleType, max: u8 },
    #[error("pickup and dropoff must be distinct locations")]
    IdenticalStops,
    #[error("no available {0} found")]
    NoAvailableVehicle(VehicleType),
    #[error("no suitable shared rides available at this time")]
    NoSuitableSharedRide,
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

pub struct BookRideInteractor {
    repo: Arc<dyn RideHailingRepo>,
    clock: Arc<dyn Clock>,
    randomness: Arc<dyn Randomness>,
}

impl BookRideInteractor {
    pub fn new(
        repo: Arc<dyn RideHailingRepo>,
        clock: Arc<dyn Clock>,
        randomness: Arc<dyn Randomness>,
    ) -> Self {
        Self {
            repo,
            clock,
            randomness,
        }
    }

    /// Shared requests join the first pooling candidate with room inside the
    /// ±10 minute window; private requests draw a random available driver.
    /// Falling back from shared to private is the caller's decision, never
    /// automatic.
    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn book(&self, user_id: UserId, request: RideRequest) -> Result<Ride, BookRideError> {
        if request.ride_type == RideType::Scheduled && request.scheduled_time.is_none() {
            return Err(BookRideError::MissingScheduledTime);
        }
        if let Err(max) = validate_seats(request.vehicle_type, request.seats_required) {
            return Err(BookRideError::InvalidSeatCount {
                vehicle_type: request.vehicle_type,
                max,
            });
        }

        let distance_km = request.pickup.point.distance_km(&request.dropoff.point);
        if distance_km <= 0.0 {
            return Err(BookRideError::IdenticalStops);
        }

        let capacity = request.vehicle_type.capacity();
        let fare = ride_fare(
            distance_km,
            capacity,
            request.seats_required,
            request.is_shared,
        );
        let now = self.clock.now();

        let ride = Ride {
            id: RideId::new(),
            user_id,
            // Placeholders until allocation picks the driver and vehicle.
            driver_id: Default::default(),
            vehicle_id: Default::default(),
            pickup: request.pickup.clone(),
            dropoff: request.dropoff.clone(),
            ride_type: request.ride_type,
            scheduled_time: match request.ride_type {
                RideType::Scheduled => request.scheduled_time,
                RideType::OnDemand => None,
            },
            start_time: match request.ride_type {
                RideType::OnDemand => Some(now),
                RideType::Scheduled => None,
            },
            end_time: None,
            distance_km,
            fare,
            seats_booked: request.seats_required,
            is_shared: request.is_shared,
            status: RideStatus::Active,
            payment_status: PaymentStatus::Pending,
            qr_code: QrCode::generate(),
            parent_ride_id: None,
            created_at: now,
        };

        if request.is_shared {
            self.join_pool(ride, &request, now).await
        } else {
            self.allocate_private(ride, &request).await
        }
    }

    async fn join_pool(
        &self,
        mut ride: Ride,
        request: &RideRequest,
        now: DateTime<Utc>,
    ) -> Result<Ride, BookRideError> {
        let reference_time = match request.ride_type {
            RideType::Scheduled => request.scheduled_time.expect("validated above"),
            RideType::OnDemand => now,
        };
        let window =
            TimeWindow::around(reference_time, Duration::minutes(POOLING_BUFFER_MINUTES));

        let candidates = self
            .repo
            .shared_ride_candidates(request.vehicle_type, window)
            .await?;

        for candidate in candidates {
            if candidate.remaining_seats() < request.seats_required {
                continue;
            }

            ride.driver_id = candidate.ride.driver_id;
            ride.vehicle_id = candidate.ride.vehicle_id;
            ride.parent_ride_id = Some(candidate.ride.id);

            match self
                .repo
                .join_shared_ride(candidate.ride.id, ride.clone())
                .await
            {
                Ok(joined) => return Ok(joined),
                // Lost the seat race or the parent stopped being joinable;
                // keep scanning in store order.
                Err(JoinSharedRideError::CapacityExhausted)
                | Err(JoinSharedRideError::NotJoinable) => continue,
                Err(JoinSharedRideError::Internal(err)) => {
                    return Err(BookRideError::Internal(err))
                }
            }
        }

        Err(BookRideError::NoSuitableSharedRide)
    }

    async fn allocate_private(
        &self,
        mut ride: Ride,
        request: &RideRequest,
    ) -> Result<Ride, BookRideError> {
        let mut candidates = self.repo.available_drivers(request.vehicle_type).await?;
        if candidates.is_empty() {
            return Err(BookRideError::NoAvailableVehicle(request.vehicle_type));
        }

        // Random pick spreads load across the fleet; on a lost
        // compare-and-swap the loser retries among the remaining drivers.
        while !candidates.is_empty() {
            let index = self.randomness.pick_index(candidates.len());
            let candidate = candidates.swap_remove(index);

            if self.repo.acquire_driver(candidate.driver.id).await? {
                ride.driver_id = candidate.driver.id;
                ride.vehicle_id = candidate.vehicle.id;
                return self.repo.insert_ride(ride).await.map_err(Into::into);
            }
        }

        Err(BookRideError::NoAvailableVehicle(request.vehicle_type))
    }
}
