pub mod facility;
pub mod ticket;

pub use crate::domain::{Clock, Fare, FareUnit, SizeClass, Slot, SlotId, SlotStatus, Vehicle};
pub use crate::utils::error::Result;
pub use facility::{ClassAvailability, Facility};
pub use ticket::Ticket;
