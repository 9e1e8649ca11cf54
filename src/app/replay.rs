use crate::adapters::ManualClock;
use crate::config::{EventAction, EventConfig, FacilityConfig};
use crate::core::{ClassAvailability, Facility, Fare, FareUnit, SlotId, Ticket, Vehicle};
use crate::domain::VehicleKind;
use crate::utils::error::{ParkingError, Result};
use crate::utils::validation::Validate;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Parked { slot: SlotId },
    Left { fare: Fare },
    Rejected { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct EventOutcome {
    pub at_seconds: u64,
    pub action: EventAction,
    pub plate: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletedSession {
    pub plate: String,
    pub kind: VehicleKind,
    pub slot: SlotId,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub fare: Fare,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub facility: String,
    pub fare_unit: FareUnit,
    pub outcomes: Vec<EventOutcome>,
    pub completed: Vec<CompletedSession>,
    pub still_parked: Vec<String>,
    pub total_revenue: Fare,
    pub availability: Vec<ClassAvailability>,
}

impl SessionReport {
    pub fn rejected(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Rejected { .. }))
            .count()
    }
}

/// Drives a facility through the scripted events of a config on a manual clock.
pub struct ScenarioRunner {
    config: FacilityConfig,
    clock: Arc<ManualClock>,
    start: DateTime<Utc>,
    facility: Facility,
}

impl ScenarioRunner {
    pub fn new(config: FacilityConfig) -> Result<Self> {
        Self::starting_at(config, DateTime::<Utc>::UNIX_EPOCH)
    }

    pub fn starting_at(config: FacilityConfig, start: DateTime<Utc>) -> Result<Self> {
        config.validate()?;
        let clock = Arc::new(ManualClock::new(start));
        let facility = config.build_facility(clock.clone())?;
        Ok(Self {
            config,
            clock,
            start,
            facility,
        })
    }

    pub fn facility(&self) -> &Facility {
        &self.facility
    }

    pub fn run(&self) -> SessionReport {
        tracing::info!(
            facility = %self.facility.name(),
            events = self.config.events.len(),
            "replaying session"
        );

        let mut open: HashMap<String, Ticket> = HashMap::new();
        let mut outcomes = Vec::with_capacity(self.config.events.len());
        let mut completed = Vec::new();

        for (i, event) in self.config.events.iter().enumerate() {
            let result = self.advance_to(event).and_then(|()| match event.action {
                EventAction::Park => self.park(i, event, &open).map(|ticket| {
                    let slot = ticket.slot();
                    open.insert(event.plate.clone(), ticket);
                    OutcomeStatus::Parked { slot }
                }),
                EventAction::Leave => self.leave(event, &mut open).map(|session| {
                    let fare = session.fare;
                    completed.push(session);
                    OutcomeStatus::Left { fare }
                }),
            });

            let status = result.unwrap_or_else(|e| {
                tracing::info!(plate = %event.plate, at = event.at_seconds, "event rejected: {}", e);
                OutcomeStatus::Rejected {
                    reason: e.to_string(),
                }
            });

            outcomes.push(EventOutcome {
                at_seconds: event.at_seconds,
                action: event.action,
                plate: event.plate.clone(),
                status,
            });
        }

        let total_revenue: Fare = completed.iter().map(|s| s.fare).sum();
        let mut still_parked: Vec<String> = open.into_keys().collect();
        still_parked.sort();

        tracing::info!(
            facility = %self.facility.name(),
            completed = completed.len(),
            still_parked = still_parked.len(),
            revenue = %total_revenue,
            "session replay finished"
        );

        SessionReport {
            facility: self.facility.name().to_string(),
            fare_unit: self.facility.fare_unit(),
            outcomes,
            completed,
            still_parked,
            total_revenue,
            availability: self.facility.availability(),
        }
    }

    fn advance_to(&self, event: &EventConfig) -> Result<()> {
        let at = i64::try_from(event.at_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|offset| self.start.checked_add_signed(offset))
            .ok_or_else(|| {
                ParkingError::invalid_argument(format!(
                    "event offset {}s is out of range",
                    event.at_seconds
                ))
            })?;
        self.clock.set(at);
        Ok(())
    }

    fn park(&self, index: usize, event: &EventConfig, open: &HashMap<String, Ticket>) -> Result<Ticket> {
        if open.contains_key(&event.plate) {
            return Err(ParkingError::invalid_argument(format!(
                "vehicle {} is already parked",
                event.plate
            )));
        }
        let kind = event.vehicle_kind(&format!("events[{}].kind", index))?;
        let vehicle = Vehicle::new(kind, event.plate.clone())?;
        self.facility.issue_ticket(&vehicle)
    }

    fn leave(&self, event: &EventConfig, open: &mut HashMap<String, Ticket>) -> Result<CompletedSession> {
        let ticket = open.get(&event.plate).ok_or_else(|| {
            ParkingError::invalid_argument(format!("no open ticket for vehicle {}", event.plate))
        })?;

        self.facility.release_ticket(ticket)?;
        let fare = ticket.compute_fare()?;
        let exit_time = ticket
            .exit_time()
            .ok_or_else(|| ParkingError::invalid_state("released ticket has no exit time"))?;

        let session = CompletedSession {
            plate: event.plate.clone(),
            kind: ticket.vehicle().kind(),
            slot: ticket.slot(),
            entry_time: ticket.entry_time(),
            exit_time,
            fare,
        };
        open.remove(&event.plate);
        Ok(session)
    }
}
