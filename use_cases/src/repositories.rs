use crate::inventory::InventoryRepo;
use crate::parking::ParkingRepo;
use crate::rides::RideHailingRepo;
use crate::wallet::WalletRepo;

pub trait Repository:
    ParkingRepo + RideHailingRepo + WalletRepo + InventoryRepo + Clone + Send + Sync
{
}

impl<T> Repository for T where
    T: Clone + Send + Sync + ParkingRepo + RideHailingRepo + WalletRepo + InventoryRepo
{
}
