//! Reference store for the booking core. State lives behind one
//! `tokio::sync::RwLock`; every mutating contract operation runs its checks
//! and its writes inside a single write-guard critical section, which gives
//! the per-slot, per-driver and per-parent-ride serialization the contracts
//! require. A database-backed store would replace the guard with
//! transactions and constraints.

pub mod fixtures;
mod inventory;
mod parking;
pub mod repository;
mod rides;
mod wallets;

pub use repository::Repository;
