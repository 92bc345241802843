use chrono::{DateTime, Duration, Utc};
use entities::rides::{RideId, RideType};
use entities::vehicles::VehicleType;
use serde::Serialize;
use shared_kernel::TimeWindow;
use std::sync::Arc;
use thiserror::Error;

use crate::clock::Clock;
use crate::rides::{validate_seats, RideHailingRepo, POOLING_BUFFER_MINUTES};

#[derive(Debug, Clone)]
pub struct VehicleAvailabilityQuery {
    pub vehicle_type: VehicleType,
    pub seats_required: u8,
    pub is_shared: bool,
    pub ride_type: RideType,
    pub scheduled_time: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum VehicleAvailability {
    SharedRide {
        ride_id: RideId,
        remaining_seats: u8,
    },
    NoSharedRide,
    Private {
        available_count: usize,
    },
}

#[derive(Error, Debug)]
pub enum VehicleAvailabilityError {
    #[error("scheduled time is required for scheduled rides")]
    MissingScheduledTime,
    #[error("invalid number of seats. Must be between 1 and {max} for {vehicle_type}")]
    InvalidSeatCount { vehicle_type: VehicleType, max: u8 },
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

/// Side-effect-free twin of the pooling matcher: reports what a booking would
/// find without acquiring anything.
pub struct VehicleAvailabilityInteractor {
    repo: Arc<dyn RideHailingRepo>,
    clock: Arc<dyn Clock>,
}

impl VehicleAvailabilityInteractor {
    pub fn new(repo: Arc<dyn RideHailingRepo>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn check(
        &self,
        query: VehicleAvailabilityQuery,
    ) -> Result<VehicleAvailability, VehicleAvailabilityError> {
        if query.ride_type == RideType::Scheduled && query.scheduled_time.is_none() {
            return Err(VehicleAvailabilityError::MissingScheduledTime);
        }
        if let Err(max) = validate_seats(query.vehicle_type, query.seats_required) {
            return Err(VehicleAvailabilityError::InvalidSeatCount {
                vehicle_type: query.vehicle_type,
                max,
            });
        }

        if query.is_shared {
            let reference_time = match query.ride_type {
                RideType::Scheduled => query.scheduled_time.expect("validated above"),
                RideType::OnDemand => self.clock.now(),
            };
            let window =
                TimeWindow::around(reference_time, Duration::minutes(POOLING_BUFFER_MINUTES));

            let candidates = self
                .repo
                .shared_ride_candidates(query.vehicle_type, window)
                .await?;

            let joinable = candidates
                .into_iter()
                .find(|candidate| candidate.remaining_seats() >= query.seats_required);

            return Ok(match joinable {
                Some(candidate) => VehicleAvailability::SharedRide {
                    ride_id: candidate.ride.id,
                    remaining_seats: candidate.remaining_seats(),
                },
                None => VehicleAvailability::NoSharedRide,
            });
        }

        let drivers = self.repo.available_drivers(query.vehicle_type).await?;
        Ok(VehicleAvailability::Private {
            available_count: drivers.len(),
        })
    }
}
