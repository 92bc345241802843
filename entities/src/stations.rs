use crate::geo::GeoPoint;
use serde::{Deserialize, Serialize};
use shared_kernel::{non_empty_string, uuid_key};

uuid_key!(StationId);
non_empty_string!(StationName);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetroStation {
    pub id: StationId,
    pub name: StationName,
    pub location: GeoPoint,
}
