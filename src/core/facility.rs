use crate::core::ticket::Ticket;
use crate::domain::{Clock, FareUnit, SizeClass, Slot, SlotId, Vehicle};
use crate::utils::error::{ParkingError, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassAvailability {
    pub class: SizeClass,
    pub total: usize,
    pub free: usize,
}

#[derive(Debug, Default)]
struct FacilityState {
    slots: Vec<Slot>,
    // open ticket id -> the slot it holds
    open: HashMap<Uuid, SlotId>,
}

/// Owns the slot inventory and the set of open tickets.
///
/// Issue and release run under a single lock, so finding a free slot and
/// marking it occupied happen as one step. At every point the number of
/// occupied slots equals the number of open tickets.
pub struct Facility {
    id: Uuid,
    name: String,
    fare_unit: FareUnit,
    clock: Arc<dyn Clock>,
    state: Mutex<FacilityState>,
}

impl Facility {
    pub fn new(name: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            fare_unit: FareUnit::default(),
            clock,
            state: Mutex::new(FacilityState::default()),
        }
    }

    pub fn with_fare_unit(mut self, fare_unit: FareUnit) -> Self {
        self.fare_unit = fare_unit;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fare_unit(&self) -> FareUnit {
        self.fare_unit
    }

    fn state(&self) -> MutexGuard<'_, FacilityState> {
        // No critical section can panic halfway through a transition.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers one free slot of the given class.
    pub fn add_slot(&self, class: SizeClass) -> SlotId {
        let mut state = self.state();
        let id = SlotId(state.slots.len());
        state.slots.push(Slot::new(id, class));
        tracing::debug!(facility = %self.name, slot = %id, class = %class, "slot added");
        id
    }

    pub fn add_slots(&self, class: SizeClass, count: usize) -> Vec<SlotId> {
        (0..count).map(|_| self.add_slot(class)).collect()
    }

    /// Assigns a free slot of exactly the vehicle's class and opens a ticket.
    ///
    /// Fails with [`ParkingError::ResourceExhausted`] when no such slot is
    /// free; nothing changes in that case.
    pub fn issue_ticket(&self, vehicle: &Vehicle) -> Result<Ticket> {
        let class = vehicle.size_class();
        let mut state = self.state();

        let Some(slot) = state
            .slots
            .iter_mut()
            .find(|slot| slot.is_free() && slot.class() == class)
        else {
            tracing::warn!(
                facility = %self.name,
                plate = vehicle.plate(),
                class = %class,
                "no free slot for vehicle"
            );
            return Err(ParkingError::ResourceExhausted { class: class.get() });
        };

        slot.occupy()?;
        let slot_id = slot.id();
        let ticket = Ticket::open(
            self.id,
            vehicle.clone(),
            slot_id,
            self.fare_unit,
            self.clock.now(),
        );
        state.open.insert(ticket.id(), slot_id);

        tracing::debug!(
            facility = %self.name,
            ticket = %ticket.id(),
            plate = vehicle.plate(),
            slot = %slot_id,
            "ticket issued"
        );
        Ok(ticket)
    }

    /// Closes an open ticket issued by this facility and frees its slot.
    ///
    /// Foreign tickets, tickets already released, and tickets whose slot is
    /// already free are rejected with [`ParkingError::InvalidArgument`]
    /// without touching any state.
    pub fn release_ticket(&self, ticket: &Ticket) -> Result<()> {
        if ticket.facility_id() != self.id {
            tracing::warn!(facility = %self.name, ticket = %ticket.id(), "foreign ticket rejected");
            return Err(ParkingError::invalid_argument(
                "ticket was not issued by this facility",
            ));
        }

        let mut state = self.state();

        if state.open.get(&ticket.id()) != Some(&ticket.slot()) {
            tracing::warn!(facility = %self.name, ticket = %ticket.id(), "release of closed ticket");
            return Err(ParkingError::invalid_argument(
                "ticket has already been released",
            ));
        }

        let index = ticket.slot().index();
        match state.slots.get(index) {
            Some(slot) if !slot.is_free() => {}
            _ => {
                return Err(ParkingError::invalid_argument(format!(
                    "slot {} held by ticket is already free",
                    ticket.slot()
                )))
            }
        }

        ticket.stamp_exit(self.clock.now())?;
        state.slots[index].vacate()?;
        state.open.remove(&ticket.id());

        tracing::debug!(
            facility = %self.name,
            ticket = %ticket.id(),
            plate = ticket.vehicle().plate(),
            slot = %ticket.slot(),
            "ticket released"
        );
        Ok(())
    }

    /// Snapshot of every slot in registration order.
    pub fn slots(&self) -> Vec<Slot> {
        self.state().slots.clone()
    }

    pub fn slot_count(&self) -> usize {
        self.state().slots.len()
    }

    pub fn open_tickets(&self) -> usize {
        self.state().open.len()
    }

    pub fn occupied_slots(&self) -> usize {
        self.state().slots.iter().filter(|slot| !slot.is_free()).count()
    }

    pub fn free_slots(&self, class: SizeClass) -> usize {
        self.state()
            .slots
            .iter()
            .filter(|slot| slot.is_free() && slot.class() == class)
            .count()
    }

    /// Totals per size class, smallest class first.
    pub fn availability(&self) -> Vec<ClassAvailability> {
        let state = self.state();
        let mut by_class: BTreeMap<SizeClass, ClassAvailability> = BTreeMap::new();
        for slot in &state.slots {
            let entry = by_class
                .entry(slot.class())
                .or_insert_with(|| ClassAvailability {
                    class: slot.class(),
                    total: 0,
                    free: 0,
                });
            entry.total += 1;
            if slot.is_free() {
                entry.free += 1;
            }
        }
        by_class.into_values().collect()
    }
}

impl fmt::Debug for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("Facility")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("fare_unit", &self.fare_unit)
            .field("slots", &state.slots.len())
            .field("open_tickets", &state.open.len())
            .finish_non_exhaustive()
    }
}
