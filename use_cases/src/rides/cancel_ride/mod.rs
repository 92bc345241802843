use entities::rides::RideId;
use entities::users::UserId;
use std::sync::Arc;
use thiserror::Error;

use crate::clock::Clock;
use crate::rides::{RideCancellationOutcome, RideHailingRepo};

#[derive(Error, Debug)]
pub enum CancelRideError {
    #[error("ride not found")]
    NotFound,
    #[error("only active or pending rides can be cancelled")]
    NotOpen,
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

pub struct CancelRideInteractor {
    repo: Arc<dyn RideHailingRepo>,
    clock: Arc<dyn Clock>,
}

impl CancelRideInteractor {
    pub fn new(repo: Arc<dyn RideHailingRepo>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Cancels and refunds per the two-tier ride policy, then frees the
    /// driver when this ride governed the vehicle trip and no other active
    /// ride still needs them. Child rides never touch driver state.
    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn cancel(
        &self,
        user_id: UserId,
        ride_id: RideId,
    ) -> Result<RideCancellationOutcome, CancelRideError> {
        let outcome = self
            .repo
            .cancel_ride(ride_id, user_id, self.clock.now())
            .await?;

        if outcome.ride.governs_vehicle_trip() {
            self.repo
                .release_driver_if_idle(outcome.ride.driver_id, outcome.ride.id)
                .await?;
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::rides::MockRideHailingRepo;
    use chrono::{TimeZone, Utc};
    use entities::drivers::DriverId;
    use entities::geo::GeoPoint;
    use entities::payments::PaymentStatus;
    use entities::qr::QrCode;
    use entities::rides::{Ride, RideStatus, RideStop, RideType};
    use entities::vehicles::VehicleId;

    fn fixed_clock() -> Arc<dyn Clock> {
        let mut clock = MockClock::new();
        clock
            .expect_now()
            .returning(|| Utc.with_ymd_and_hms(2023, 6, 14, 10, 0, 0).unwrap());
        Arc::new(clock)
    }

    fn cancelled_ride(is_shared: bool, parent: Option<RideId>) -> Ride {
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
                name: "Hauz Khas".to_string(),
                point: GeoPoint::new(77.2066, 28.5494),
            },
            ride_type: RideType::OnDemand,
            scheduled_time: None,
            start_time: Some(now),
            end_time: None,
            distance_km: 9.3,
            fare: 800,
            seats_booked: 1,
            is_shared,
            status: RideStatus::Cancelled,
            payment_status: PaymentStatus::Pending,
            qr_code: QrCode::generate(),
            parent_ride_id: parent,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_private_ride_cancellation_releases_the_driver() {
        let ride = cancelled_ride(false, None);
        let driver_id = ride.driver_id;

        let mut repo = MockRideHailingRepo::new();
        {
            let ride = ride.clone();
            repo.expect_cancel_ride().returning(move |_, _, _| {
                Ok(RideCancellationOutcome {
                    ride: ride.clone(),
                    refund_amount: 0,
                    refund_description: None,
                })
            });
        }
        repo.expect_release_driver_if_idle()
            .withf(move |driver, _| *driver == driver_id)
            .returning(|_, _| Ok(true));

        let interactor = CancelRideInteractor::new(Arc::new(repo), fixed_clock());
        interactor.cancel(ride.user_id, ride.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_child_ride_cancellation_never_touches_the_driver() {
        let ride = cancelled_ride(true, Some(RideId::new()));

        let mut repo = MockRideHailingRepo::new();
        {
            let ride = ride.clone();
            repo.expect_cancel_ride().returning(move |_, _, _| {
                Ok(RideCancellationOutcome {
                    ride: ride.clone(),
                    refund_amount: 0,
                    refund_description: None,
                })
            });
        }
        repo.expect_release_driver_if_idle().never();

        let interactor = CancelRideInteractor::new(Arc::new(repo), fixed_clock());
        interactor.cancel(ride.user_id, ride.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_completed_ride_cannot_be_cancelled() {
        let mut repo = MockRideHailingRepo::new();
        repo.expect_cancel_ride()
            .returning(|_, _, _| Err(CancelRideError::NotOpen));

        let interactor = CancelRideInteractor::new(Arc::new(repo), fixed_clock());
        let result = interactor.cancel(UserId::new(), RideId::new()).await;
        assert!(matches!(result, Err(CancelRideError::NotOpen)));
    }
}
