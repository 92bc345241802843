use std::sync::Arc;

pub mod actor;
pub mod clock;
pub mod inventory;
pub mod parking;
pub mod payments;
pub mod pricing;
pub mod randomness;
mod repositories;
pub mod rides;
pub mod wallet;

pub use repositories::Repository;

use crate::clock::Clock;
use crate::inventory::drivers::DriverAdminInteractor;
use crate::inventory::lots::LotAdminInteractor;
use crate::inventory::slots::SlotAdminInteractor;
use crate::inventory::stations::StationAdminInteractor;
use crate::inventory::vehicles::VehicleAdminInteractor;
use crate::parking::amend_reservation::AmendReservationInteractor;
use crate::parking::cancel_reservation::CancelReservationInteractor;
use crate::parking::check_availability::CheckAvailabilityInteractor;
use crate::parking::pay_reservation::PayReservationInteractor;
use crate::parking::queries::ReservationQueriesInteractor;
use crate::parking::reserve_slot::ReserveSlotInteractor;
use crate::payments::PaymentGateway;
use crate::pricing::PricingConfig;
use crate::randomness::Randomness;
use crate::rides::book_ride::BookRideInteractor;
use crate::rides::cancel_ride::CancelRideInteractor;
use crate::rides::complete_ride::CompleteRideInteractor;
use crate::rides::queries::RideQueriesInteractor;
use crate::rides::update_ride::UpdateRideInteractor;
use crate::rides::vehicle_availability::VehicleAvailabilityInteractor;
use crate::wallet::WalletInteractor;

pub struct AppImpl {
    check_availability: CheckAvailabilityInteractor,
    reserve_slot: ReserveSlotInteractor,
    cancel_reservation: CancelReservationInteractor,
    amend_reservation: AmendReservationInteractor,
    pay_reservation: PayReservationInteractor,
    reservation_queries: ReservationQueriesInteractor,
    book_ride: BookRideInteractor,
    vehicle_availability: VehicleAvailabilityInteractor,
    cancel_ride: CancelRideInteractor,
    complete_ride: CompleteRideInteractor,
    update_ride: UpdateRideInteractor,
    ride_queries: RideQueriesInteractor,
    wallet: WalletInteractor,
    station_admin: StationAdminInteractor,
    lot_admin: LotAdminInteractor,
    slot_admin: SlotAdminInteractor,
    driver_admin: DriverAdminInteractor,
    vehicle_admin: VehicleAdminInteractor,
}

impl AppImpl {
    pub fn new<R: Repository + 'static>(
        repo: R,
        clock: Arc<dyn Clock>,
        randomness: Arc<dyn Randomness>,
        gateway: Arc<dyn PaymentGateway>,
        pricing: PricingConfig,
    ) -> Self {
        let repository = Arc::new(repo);

        Self {
            check_availability: CheckAvailabilityInteractor::new(repository.clone()),
            reserve_slot: ReserveSlotInteractor::new(
                repository.clone(),
                clock.clone(),
                pricing.clone(),
            ),
            cancel_reservation: CancelReservationInteractor::new(
                repository.clone(),
                clock.clone(),
            ),
            amend_reservation: AmendReservationInteractor::new(repository.clone(), clock.clone()),
            pay_reservation: PayReservationInteractor::new(
                repository.clone(),
                clock.clone(),
                randomness.clone(),
                gateway.clone(),
            ),
            reservation_queries: ReservationQueriesInteractor::new(repository.clone()),
            book_ride: BookRideInteractor::new(
                repository.clone(),
                clock.clone(),
                randomness.clone(),
            ),
            vehicle_availability: VehicleAvailabilityInteractor::new(
                repository.clone(),
                clock.clone(),
            ),
            cancel_ride: CancelRideInteractor::new(repository.clone(), clock.clone()),
            complete_ride: CompleteRideInteractor::new(
                repository.clone(),
                clock.clone(),
                randomness,
                gateway,
            ),
            update_ride: UpdateRideInteractor::new(repository.clone()),
            ride_queries: RideQueriesInteractor::new(repository.clone()),
            wallet: WalletInteractor::new(repository.clone(), clock),
            station_admin: StationAdminInteractor::new(repository.clone()),
            lot_admin: LotAdminInteractor::new(repository.clone()),
            slot_admin: SlotAdminInteractor::new(repository.clone()),
            driver_admin: DriverAdminInteractor::new(repository.clone()),
            vehicle_admin: VehicleAdminInteractor::new(repository),
        }
    }

    pub fn check_availability(&self) -> &CheckAvailabilityInteractor {
        &self.check_availability
    }

    pub fn reserve_slot(&self) -> &ReserveSlotInteractor {
        &self.reserve_slot
    }

    pub fn cancel_reservation(&self) -> &CancelReservationInteractor {
        &self.cancel_reservation
    }

    pub fn amend_reservation(&self) -> &AmendReservationInteractor {
        &self.amend_reservation
    }

    pub fn pay_reservation(&self) -> &PayReservationInteractor {
        &self.pay_reservation
    }

    pub fn reservation_queries(&self) -> &ReservationQueriesInteractor {
        &self.reservation_queries
    }

    pub fn book_ride(&self) -> &BookRideInteractor {
        &self.book_ride
    }

    pub fn vehicle_availability(&self) -> &VehicleAvailabilityInteractor {
        &self.vehicle_availability
    }

    pub fn cancel_ride(&self) -> &CancelRideInteractor {
        &self.cancel_ride
    }

    pub fn complete_ride(&self) -> &CompleteRideInteractor {
        &self.complete_ride
    }

    pub fn update_ride(&self) -> &UpdateRideInteractor {
        &self.update_ride
    }

    pub fn ride_queries(&self) -> &RideQueriesInteractor {
        &self.ride_queries
    }

    pub fn wallet(&self) -> &WalletInteractor {
        &self.wallet
    }

    pub fn station_admin(&self) -> &StationAdminInteractor {
        &self.station_admin
    }

    pub fn lot_admin(&self) -> &LotAdminInteractor {
        &self.lot_admin
    }

    pub fn slot_admin(&self) -> &SlotAdminInteractor {
        &self.slot_admin
    }

    pub fn driver_admin(&self) -> &DriverAdminInteractor {
        &self.driver_admin
    }

    pub fn vehicle_admin(&self) -> &VehicleAdminInteractor {
        &self.vehicle_admin
    }
}
