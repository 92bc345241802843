pub mod drivers;
pub mod geo;
pub mod parking;
pub mod payments;
pub mod qr;
pub mod reservations;
pub mod rides;
pub mod stations;
pub mod users;
pub mod vehicles;
pub mod wallet;
