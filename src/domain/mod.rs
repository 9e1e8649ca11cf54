// Domain layer: value types and ports. No dependencies on the registry or adapters.

pub mod model;
pub mod ports;

pub use model::{Fare, FareUnit, SizeClass, Slot, SlotId, SlotStatus, Vehicle, VehicleKind};
pub use ports::Clock;
