use chrono::{DateTime, Utc};
use entities::parking::{LotId, ParkingSlot, SlotId, SlotNumber, SlotStatus, TimeRestriction, ZoneName};
use shared_kernel::{InvalidTimeWindow, TimeWindow};
use std::sync::Arc;
use thiserror::Error;

use crate::actor::{Actor, Permission, PermissionDenied};
use crate::inventory::InventoryRepo;

#[derive(Error, Debug)]
pub enum SlotAdminError {
    #[error(transparent)]
    Forbidden(#[from] PermissionDenied),
    #[error("parking slot not found")]
    NotFound,
    #[error("parking lot not found")]
    LotNotFound,
    #[error("a slot with this number already exists in this parking lot")]
    DuplicateSlotNumber,
    #[error("cannot change slot status - there are active reservations for this slot")]
    HasActiveReservations { count: usize },
    #[error("cannot add time restriction - there are active reservations during this period")]
    RestrictionOverlapsReservations { count: usize },
    #[error("invalid restriction index")]
    InvalidRestrictionIndex,
    #[error(transparent)]
    InvalidWindow(#[from] InvalidTimeWindow),
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct NewSlot {
    pub lot_id: LotId,
    pub slot_number: SlotNumber,
    pub zone: ZoneName,
    pub status: Option<SlotStatus>,
}

/// Bulk creation: numbers run `<zone><start>` through `<zone><start+count-1>`.
#[derive(Debug, Clone)]
pub struct NewSlotBatch {
    pub lot_id: LotId,
    pub zone: ZoneName,
    pub start_number: u32,
    pub count: u32,
    pub status: Option<SlotStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct SlotPatch {
    pub slot_number: Option<SlotNumber>,
    pub zone: Option<ZoneName>,
    pub status: Option<SlotStatus>,
}

#[derive(Debug, Clone)]
pub struct NewTimeRestriction {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub reason: Option<String>,
    pub description: Option<String>,
}

pub struct SlotAdminInteractor {
    repo: Arc<dyn InventoryRepo>,
}

impl SlotAdminInteractor {
    pub fn new(repo: Arc<dyn InventoryRepo>) -> Self {
        Self { repo }
    }

    #[tracing::instrument(err, skip(self, actor), level = "info")]
    pub async fn create(
        &self,
        actor: &dyn Actor,
        slot: NewSlot,
    ) -> Result<ParkingSlot, SlotAdminError> {
        actor.check_for_permission(Permission::ManageInventory)?;

        let slot = ParkingSlot {
            id: SlotId::new(),
            lot_id: slot.lot_id,
            slot_number: slot.slot_number,
            zone: slot.zone,
            status: slot.status.unwrap_or(SlotStatus::Available),
            time_restrictions: vec![],
        };

        self.repo.insert_slot(slot).await
    }

    #[tracing::instrument(err, skip(self, actor), level = "info")]
    pub async fn create_batch(
        &self,
        actor: &dyn Actor,
        batch: NewSlotBatch,
    ) -> Result<Vec<ParkingSlot>, SlotAdminError> {
        actor.check_for_permission(Permission::ManageInventory)?;

        let status = batch.status.unwrap_or(SlotStatus::Available);
        let slots = (0..batch.count)
            .map(|offset| ParkingSlot {
                id: SlotId::new(),
                lot_id: batch.lot_id,
                slot_number: SlotNumber::from(format!(
                    "{}{}",
                    batch.zone,
                    batch.start_number + offset
                )),
                zone: batch.zone.clone(),
                status,
                time_restrictions: vec![],
            })
            .collect();

        self.repo.insert_slots(slots).await
    }

    #[tracing::instrument(err, skip(self, actor), level = "info")]
    pub async fn update(
        &self,
        actor: &dyn Actor,
        id: SlotId,
        patch: SlotPatch,
    ) -> Result<ParkingSlot, SlotAdminError> {
        actor.check_for_permission(Permission::ManageInventory)?;
        self.repo.update_slot(id, patch).await
    }

    #[tracing::instrument(err, skip(self, actor), level = "info")]
    pub async fn delete(&self, actor: &dyn Actor, id: SlotId) -> Result<(), SlotAdminError> {
        actor.check_for_permission(Permission::ManageInventory)?;
        self.repo.delete_slot(id).await
    }

    /// Restrictions land only on windows free of active reservations; the
    /// store re-checks that overlap under the slot guard.
    #[tracing::instrument(err, skip(self, actor), level = "info")]
    pub async fn add_restriction(
        &self,
        actor: &dyn Actor,
        id: SlotId,
        restriction: NewTimeRestriction,
    ) -> Result<ParkingSlot, SlotAdminError> {
        actor.check_for_permission(Permission::ManageInventory)?;

        let window = TimeWindow::new(restriction.start, restriction.end)?;
        let restriction = TimeRestriction {
            window,
            reason: restriction
                .reason
                .unwrap_or_else(|| "maintenance".to_string()),
            description: restriction.description.unwrap_or_default(),
        };

        self.repo.add_time_restriction(id, restriction).await
    }

    #[tracing::instrument(err, skip(self, actor), level = "info")]
    pub async fn remove_restriction(
        &self,
        actor: &dyn Actor,
        id: SlotId,
        index: usize,
    ) -> Result<ParkingSlot, SlotAdminError> {
        actor.check_for_permission(Permission::ManageInventory)?;
        self.repo.remove_time_restriction(id, index).await
    }
}
