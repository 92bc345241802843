//! Seed data for exercising the store in tests.

use entities::drivers::{Driver, DriverId, DriverName, DriverStatus, LicenseNumber, PhoneNumber};
use entities::geo::GeoPoint;
use entities::parking::{LotId, LotName, ParkingLot, ParkingSlot, SlotId, SlotNumber, SlotStatus, ZoneName};
use entities::stations::{MetroStation, StationId, StationName};
use entities::users::UserId;
use entities::vehicles::{RegistrationNumber, Vehicle, VehicleId, VehicleStatus, VehicleType};
use entities::wallet::Wallet;

use crate::repository::Repository;

pub async fn seed_station(repo: &Repository) -> MetroStation {
    let station = MetroStation {
        id: StationId::new(),
        name: StationName::try_from("Rajiv Chowk".to_string()).unwrap(),
        location: GeoPoint::new(77.2167, 28.6328),
    };
    repo.write()
        .await
        .stations
        .insert(station.id, station.clone());
    station
}

/// A lot under a fresh station with `slot_count` available slots in zone A.
pub async fn seed_lot(repo: &Repository, slot_count: usize) -> (ParkingLot, Vec<ParkingSlot>) {
    let station = seed_station(repo).await;

    let lot_id = LotId::new();
    let slots: Vec<ParkingSlot> = (1..=slot_count)
        .map(|number| ParkingSlot {
            id: SlotId::new(),
            lot_id,
            slot_number: SlotNumber::from(format!("A{number}")),
            zone: ZoneName::from("A"),
            status: SlotStatus::Available,
            time_restrictions: vec![],
        })
        .collect();

    let lot = ParkingLot {
        id: lot_id,
        name: LotName::try_from("Central".to_string()).unwrap(),
        location: station.location,
        total_slots: slot_count as u32,
        occupied_slots: 0,
        slot_ids: slots.iter().map(|slot| slot.id).collect(),
        metro_station_id: station.id,
    };

    let mut state = repo.write().await;
    state.lots.insert(lot.id, lot.clone());
    for slot in &slots {
        state.slots.insert(slot.id, slot.clone());
    }
    drop(state);

    (lot, slots)
}

pub async fn seed_wallet(repo: &Repository, user: UserId, balance: u64) {
    repo.write().await.wallets.insert(
        user,
        Wallet {
            balance,
            loyalty_points: 0,
            transactions: vec![],
        },
    );
}

/// `count` available drivers each assigned an active vehicle of the given
/// type, based at a fresh station.
pub async fn seed_fleet(
    repo: &Repository,
    vehicle_type: VehicleType,
    count: usize,
) -> Vec<(Driver, Vehicle)> {
    let station = seed_station(repo).await;
    let mut fleet = Vec::with_capacity(count);

    let mut state = repo.write().await;
    for index in 0..count {
        let vehicle = Vehicle {
            id: VehicleId::new(),
            vehicle_type,
            registration_number: RegistrationNumber::from(format!("DL1RT{index:04}")),
            model: "Fleet".to_string(),
            capacity: vehicle_type.capacity(),
            status: VehicleStatus::Active,
            base_station_id: station.id,
        };
        let driver = Driver {
            id: DriverId::new(),
            name: DriverName::try_from(format!("Driver {index}")).unwrap(),
            phone_number: PhoneNumber::from(format!("98{index:08}")),
            license_number: LicenseNumber::from(format!("DL-{index:010}")),
            rating: 4.5,
            status: DriverStatus::Available,
            vehicle_id: vehicle.id,
            current_location: None,
        };
        state.vehicles.insert(vehicle.id, vehicle.clone());
        state.drivers.insert(driver.id, driver.clone());
        state.driver_order.push(driver.id);
        fleet.push((driver, vehicle));
    }
    drop(state);

    fleet
}
