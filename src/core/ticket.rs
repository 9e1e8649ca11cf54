use crate::domain::{Fare, FareUnit, SlotId, Vehicle};
use crate::utils::error::{ParkingError, Result};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

#[derive(Debug)]
struct TicketRecord {
    id: Uuid,
    facility_id: Uuid,
    vehicle: Vehicle,
    slot: SlotId,
    fare_unit: FareUnit,
    entry_time: DateTime<Utc>,
    exit_time: OnceLock<DateTime<Utc>>,
}

/// Record of one parking session.
///
/// Only a [`Facility`](crate::Facility) can open a ticket. Clones share the same
/// record, so a release through any clone is visible through all of them. The
/// exit time is written exactly once.
#[derive(Debug, Clone)]
pub struct Ticket {
    record: Arc<TicketRecord>,
}

impl Ticket {
    pub(crate) fn open(
        facility_id: Uuid,
        vehicle: Vehicle,
        slot: SlotId,
        fare_unit: FareUnit,
        entry_time: DateTime<Utc>,
    ) -> Self {
        Self {
            record: Arc::new(TicketRecord {
                id: Uuid::new_v4(),
                facility_id,
                vehicle,
                slot,
                fare_unit,
                entry_time,
                exit_time: OnceLock::new(),
            }),
        }
    }

    pub(crate) fn stamp_exit(&self, at: DateTime<Utc>) -> Result<()> {
        self.record
            .exit_time
            .set(at)
            .map_err(|_| ParkingError::invalid_argument("ticket has already been released"))
    }

    pub fn id(&self) -> Uuid {
        self.record.id
    }

    pub fn facility_id(&self) -> Uuid {
        self.record.facility_id
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.record.vehicle
    }

    pub fn slot(&self) -> SlotId {
        self.record.slot
    }

    pub fn fare_unit(&self) -> FareUnit {
        self.record.fare_unit
    }

    pub fn entry_time(&self) -> DateTime<Utc> {
        self.record.entry_time
    }

    /// `None` while the vehicle is still parked.
    pub fn exit_time(&self) -> Option<DateTime<Utc>> {
        self.record.exit_time.get().copied()
    }

    pub fn is_open(&self) -> bool {
        self.exit_time().is_none()
    }

    pub fn dwell_time(&self) -> Option<TimeDelta> {
        self.exit_time().map(|exit| exit - self.record.entry_time)
    }

    /// Vehicle size × whole fare units between entry and exit.
    pub fn compute_fare(&self) -> Result<Fare> {
        let dwell = self
            .dwell_time()
            .ok_or_else(|| ParkingError::invalid_state("vehicle still parked"))?;
        let units = self.record.fare_unit.whole_units(dwell);
        let size = u64::from(self.record.vehicle.size_class().get());
        Ok(Fare(size.saturating_mul(units)))
    }
}

impl PartialEq for Ticket {
    fn eq(&self, other: &Self) -> bool {
        self.record.id == other.record.id
    }
}

impl Eq for Ticket {}
