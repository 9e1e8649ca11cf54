pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{ManualClock, SystemClock};
pub use app::{ScenarioRunner, SessionReport};
pub use config::FacilityConfig;
pub use crate::core::{ClassAvailability, Facility, Ticket};
pub use domain::{Clock, Fare, FareUnit, SizeClass, Slot, SlotId, SlotStatus, Vehicle, VehicleKind};
pub use utils::error::{ParkingError, Result};
