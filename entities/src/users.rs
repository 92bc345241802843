use crate::stations::StationId;
use serde::{Deserialize, Serialize};
use shared_kernel::uuid_key;

uuid_key!(UserId);

/// Station-visit counter maintained by the slot allocator on each successful
/// reservation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrequentStation {
    pub station_id: StationId,
    pub visit_count: u32,
}
