use chrono::{DateTime, Utc};
use entities::drivers::{Driver, DriverId};
use entities::parking::{LotId, ParkingLot, ParkingSlot, SlotId};
use entities::reservations::{Reservation, ReservationId};
use entities::rides::{Ride, RideId, RideStatus};
use entities::stations::{MetroStation, StationId};
use entities::users::{FrequentStation, UserId};
use entities::vehicles::{Vehicle, VehicleId};
use entities::wallet::{BookingRef, TransactionKind, Wallet, WalletTransaction};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
pub(crate) struct State {
    pub stations: HashMap<StationId, MetroStation>,
    pub lots: HashMap<LotId, ParkingLot>,
    pub slots: HashMap<SlotId, ParkingSlot>,
    pub reservations: HashMap<ReservationId, Reservation>,
    pub drivers: HashMap<DriverId, Driver>,
    pub vehicles: HashMap<VehicleId, Vehicle>,
    pub rides: HashMap<RideId, Ride>,
    pub wallets: HashMap<UserId, Wallet>,
    pub frequent_stations: HashMap<UserId, Vec<FrequentStation>>,
    /// Insertion order; pooling candidates and driver scans iterate this so
    /// "store order" is deterministic.
    pub ride_order: Vec<RideId>,
    pub driver_order: Vec<DriverId>,
}

impl State {
    pub fn active_windows_for_slot(
        &self,
        slot: SlotId,
        excluding: Option<ReservationId>,
    ) -> Vec<shared_kernel::TimeWindow> {
        self.reservations
            .values()
            .filter(|reservation| {
                reservation.parking_slot_id == slot
                    && reservation.is_active()
                    && Some(reservation.id) != excluding
            })
            .map(|reservation| reservation.window)
            .collect()
    }

    pub fn active_reservation_count_for_slot(&self, slot: SlotId) -> usize {
        self.reservations
            .values()
            .filter(|reservation| reservation.parking_slot_id == slot && reservation.is_active())
            .count()
    }

    pub fn open_rides_for_driver(&self, driver: DriverId, excluding: Option<RideId>) -> usize {
        self.rides
            .values()
            .filter(|ride| {
                ride.driver_id == driver && ride.is_open() && Some(ride.id) != excluding
            })
            .count()
    }

    pub fn open_rides_for_vehicle(&self, vehicle: VehicleId) -> usize {
        self.rides
            .values()
            .filter(|ride| ride.vehicle_id == vehicle && ride.is_open())
            .count()
    }

    /// Seats across a parent and its non-cancelled children.
    pub fn booked_seats(&self, parent: RideId) -> u8 {
        self.rides
            .values()
            .filter(|ride| {
                (ride.id == parent || ride.parent_ride_id == Some(parent))
                    && ride.status != RideStatus::Cancelled
            })
            .map(|ride| ride.seats_booked)
            .sum()
    }

    pub fn wallet_mut(&mut self, user: UserId) -> &mut Wallet {
        self.wallets.entry(user).or_default()
    }

    pub fn credit(
        &mut self,
        user: UserId,
        amount: u64,
        kind: TransactionKind,
        description: String,
        reference: Option<BookingRef>,
        now: DateTime<Utc>,
    ) {
        let wallet = self.wallet_mut(user);
        wallet.balance += amount;
        wallet.transactions.push(WalletTransaction {
            kind,
            amount: amount as i64,
            description,
            reference,
            timestamp: now,
        });
    }

    /// False (and no partial movement) when the balance is short.
    pub fn debit(
        &mut self,
        user: UserId,
        amount: u64,
        description: String,
        reference: Option<BookingRef>,
        now: DateTime<Utc>,
    ) -> bool {
        let wallet = self.wallet_mut(user);
        if wallet.balance < amount {
            return false;
        }
        wallet.balance -= amount;
        wallet.transactions.push(WalletTransaction {
            kind: TransactionKind::Payment,
            amount: -(amount as i64),
            description,
            reference,
            timestamp: now,
        });
        true
    }

    pub fn record_station_visit(&mut self, user: UserId, station: StationId) {
        let visits = self.frequent_stations.entry(user).or_default();
        match visits.iter_mut().find(|entry| entry.station_id == station) {
            Some(entry) => entry.visit_count += 1,
            None => visits.push(FrequentStation {
                station_id: station,
                visit_count: 1,
            }),
        }
    }
}

#[derive(Clone, Default)]
pub struct Repository {
    state: Arc<RwLock<State>>,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, State> {
        self.state.read().await
    }

    pub(crate) async fn write(&self) -> tokio::sync::RwLockWriteGuard<'_, State> {
        self.state.write().await
    }

    /// Frequent-station counters recorded for a user by the slot allocator.
    pub async fn frequent_stations(&self, user: UserId) -> Vec<FrequentStation> {
        self.read()
            .await
            .frequent_stations
            .get(&user)
            .cloned()
            .unwrap_or_default()
    }
}
