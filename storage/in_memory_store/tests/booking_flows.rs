//! End-to-end flows over the real store: the interactors wired exactly as the
//! server wires them, with a pinned clock and pinned randomness.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

use entities::payments::PaymentMethod;
use entities::users::UserId;
use in_memory_store::{fixtures, Repository};
use use_cases::clock::Clock;
use use_cases::parking::reserve_slot::{ReserveSlotError, ReserveSlotRequest};
use use_cases::payments::{ChargeOutcome, PaymentGateway};
use use_cases::pricing::PricingConfig;
use use_cases::randomness::Randomness;
use use_cases::AppImpl;

#[derive(Clone, Copy)]
struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Always picks the first candidate and the lowest bonus percent.
#[derive(Clone, Copy)]
struct PinnedRandomness;

impl Randomness for PinnedRandomness {
    fn pick_index(&self, _len: usize) -> usize {
        0
    }

    fn percent_between(&self, min: u8, _max: u8) -> u8 {
        min
    }
}

struct ApprovingGateway;

#[async_trait]
impl PaymentGateway for ApprovingGateway {
    async fn charge(&self, _amount: u64) -> anyhow::Result<ChargeOutcome> {
        Ok(ChargeOutcome::Approved)
    }
}

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 6, 14, hour, min, 0).unwrap()
}

fn app(repo: Repository, now: DateTime<Utc>) -> AppImpl {
    AppImpl::new(
        repo,
        Arc::new(FixedClock(now)),
        Arc::new(PinnedRandomness),
        Arc::new(ApprovingGateway),
        PricingConfig::default(),
    )
}

#[tokio::test]
async fn test_parking_happy_path_then_conflicting_request() {
    let repo = Repository::new();
    let (lot, slots) = fixtures::seed_lot(&repo, 1).await;
    let app = app(repo, at(8, 0));
    let user = UserId::new();

    let reservation = app
        .reserve_slot()
        .reserve(
            user,
            ReserveSlotRequest {
                lot_id: lot.id,
                slot_id: slots[0].id,
                start: at(10, 0),
                end: at(12, 0),
            },
        )
        .await
        .unwrap();

    // Two hours at the base rate with an uncontended lot.
    assert_eq!(reservation.price, 100);

    let conflict = app
        .reserve_slot()
        .reserve(
            UserId::new(),
            ReserveSlotRequest {
                lot_id: lot.id,
                slot_id: slots[0].id,
                start: at(11, 0),
                end: at(13, 0),
            },
        )
        .await;

    assert!(matches!(
        conflict,
        Err(ReserveSlotError::SlotUnavailable(_))
    ));
}

#[tokio::test]
async fn test_pay_cancel_refund_lands_back_in_the_wallet() {
    let repo = Repository::new();
    let (lot, slots) = fixtures::seed_lot(&repo, 1).await;
    let user = UserId::new();
    fixtures::seed_wallet(&repo, user, 500).await;

    // Reserve and pay 45 minutes ahead of the window.
    let booking_app = app(repo.clone(), at(9, 15));
    let reservation = booking_app
        .reserve_slot()
        .reserve(
            user,
            ReserveSlotRequest {
                lot_id: lot.id,
                slot_id: slots[0].id,
                start: at(10, 0),
                end: at(12, 0),
            },
        )
        .await
        .unwrap();
    booking_app
        .pay_reservation()
        .pay(user, reservation.id, PaymentMethod::Wallet)
        .await
        .unwrap();

    let outcome = booking_app
        .cancel_reservation()
        .cancel(user, reservation.id)
        .await
        .unwrap();

    assert_eq!(outcome.refund_amount, 100);

    let wallet = booking_app.wallet().wallet(user).await.unwrap();
    // 500 - 100 paid + 100 refunded.
    assert_eq!(wallet.balance, 500);
    // Payment bonus: 5% of 100.
    assert_eq!(wallet.loyalty_points, 5);
}

#[tokio::test]
async fn test_late_cancellation_refunds_half() {
    let repo = Repository::new();
    let (lot, slots) = fixtures::seed_lot(&repo, 1).await;
    let user = UserId::new();
    fixtures::seed_wallet(&repo, user, 500).await;

    let booking_app = app(repo.clone(), at(9, 50));
    let reservation = booking_app
        .reserve_slot()
        .reserve(
            user,
            ReserveSlotRequest {
                lot_id: lot.id,
                slot_id: slots[0].id,
                start: at(10, 0),
                end: at(12, 0),
            },
        )
        .await
        .unwrap();
    booking_app
        .pay_reservation()
        .pay(user, reservation.id, PaymentMethod::Wallet)
        .await
        .unwrap();

    let outcome = booking_app
        .cancel_reservation()
        .cancel(user, reservation.id)
        .await
        .unwrap();

    assert_eq!(outcome.refund_amount, 50);
}

#[tokio::test]
async fn test_shared_ride_pooling_fills_the_cab() {
    use entities::geo::GeoPoint;
    use entities::rides::{RideStop, RideType};
    use entities::vehicles::VehicleType;
    use use_cases::rides::book_ride::{BookRideError, RideRequest};

    let repo = Repository::new();
    fixtures::seed_fleet(&repo, VehicleType::Cab, 1).await;
    let booking_app = app(repo, at(10, 0));

    let request = |seats| RideRequest {
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
        vehicle_type: VehicleType::Cab,
        seats_required: seats,
        is_shared: true,
    };

    // No shared ride exists yet: the first rider cannot pool.
    let result = booking_app.book_ride().book(UserId::new(), request(2)).await;
    assert!(matches!(result, Err(BookRideError::NoSuitableSharedRide)));

    // The caller falls back to a private booking, which seeds the pool.
    let mut private = request(2);
    private.is_shared = false;
    let parent = booking_app
        .book_ride()
        .book(UserId::new(), private)
        .await
        .unwrap();
    booking_app
        .update_ride()
        .set_sharing(parent.user_id, parent.id, true)
        .await
        .unwrap();

    // Two more seats pool onto it.
    let child = booking_app
        .book_ride()
        .book(UserId::new(), request(2))
        .await
        .unwrap();
    assert_eq!(child.parent_ride_id, Some(parent.id));

    // The cab is now full.
    let overflow = booking_app.book_ride().book(UserId::new(), request(1)).await;
    assert!(matches!(overflow, Err(BookRideError::NoSuitableSharedRide)));
}

#[tokio::test]
async fn test_completing_the_only_ride_frees_the_driver() {
    use entities::geo::GeoPoint;
    use entities::rides::{RideStop, RideType};
    use entities::vehicles::VehicleType;
    use use_cases::rides::book_ride::RideRequest;

    let repo = Repository::new();
    let fleet = fixtures::seed_fleet(&repo, VehicleType::Cab, 1).await;
    let driver_id = fleet[0].0.id;
    let user = UserId::new();
    fixtures::seed_wallet(&repo, user, 10_000).await;

    let booking_app = app(repo, at(10, 0));
    let ride = booking_app
        .book_ride()
        .book(
            user,
            RideRequest {
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
                vehicle_type: VehicleType::Cab,
                seats_required: 1,
                is_shared: false,
            },
        )
        .await
        .unwrap();

    let acquired = booking_app
        .ride_queries()
        .get(user, ride.id)
        .await
        .unwrap();
    assert_eq!(acquired.driver_id, driver_id);

    booking_app
        .complete_ride()
        .complete(user, ride.id, PaymentMethod::Wallet)
        .await
        .unwrap();

    let drivers = booking_app.vehicle_availability();
    // The driver is available again: a fresh private probe sees one cab.
    let availability = drivers
        .check(use_cases::rides::vehicle_availability::VehicleAvailabilityQuery {
            vehicle_type: VehicleType::Cab,
            seats_required: 1,
            is_shared: false,
            ride_type: RideType::OnDemand,
            scheduled_time: None,
        })
        .await
        .unwrap();

    match availability {
        use_cases::rides::vehicle_availability::VehicleAvailability::Private {
            available_count,
        } => assert_eq!(available_count, 1),
        other => panic!("expected a private availability report, got {other:?}"),
    }
}
