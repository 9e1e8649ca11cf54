use crate::utils::error::{ParkingError, Result};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

/// Discrete size category used to match vehicles to slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SizeClass(NonZeroU32);

impl SizeClass {
    pub const BIKE: SizeClass = SizeClass(NonZeroU32::MIN.saturating_add(1));
    pub const CAR: SizeClass = SizeClass(NonZeroU32::MIN.saturating_add(3));
    pub const TRUCK: SizeClass = SizeClass(NonZeroU32::MIN.saturating_add(5));

    pub fn new(size: u32) -> Result<Self> {
        NonZeroU32::new(size)
            .map(Self)
            .ok_or_else(|| ParkingError::invalid_argument("size class must be a positive integer"))
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<u32> for SizeClass {
    type Error = ParkingError;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SizeClass> for u32 {
    fn from(class: SizeClass) -> Self {
        class.get()
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VehicleKind {
    Bike,
    Car,
    Truck,
    Custom(SizeClass),
}

impl VehicleKind {
    pub fn size_class(self) -> SizeClass {
        match self {
            Self::Bike => SizeClass::BIKE,
            Self::Car => SizeClass::CAR,
            Self::Truck => SizeClass::TRUCK,
            Self::Custom(class) => class,
        }
    }
}

impl FromStr for VehicleKind {
    type Err = ParkingError;

    /// Accepts a preset name or a positive integer size.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "bike" => Ok(Self::Bike),
            "car" => Ok(Self::Car),
            "truck" => Ok(Self::Truck),
            other => {
                let size: u32 = other.parse().map_err(|_| {
                    ParkingError::invalid_argument(format!(
                        "unknown vehicle kind '{}', expected bike, car, truck or a positive size",
                        trimmed
                    ))
                })?;
                SizeClass::new(size).map(Self::Custom)
            }
        }
    }
}

impl TryFrom<String> for VehicleKind {
    type Error = ParkingError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<VehicleKind> for String {
    fn from(kind: VehicleKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bike => f.write_str("bike"),
            Self::Car => f.write_str("car"),
            Self::Truck => f.write_str("truck"),
            Self::Custom(class) => write!(f, "{}", class),
        }
    }
}

/// A caller-owned vehicle. Never mutated by the facility.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vehicle {
    kind: VehicleKind,
    plate: String,
}

impl Vehicle {
    pub fn new(kind: VehicleKind, plate: impl Into<String>) -> Result<Self> {
        let plate = plate.into();
        if plate.trim().is_empty() {
            return Err(ParkingError::invalid_argument("number plate cannot be empty"));
        }
        Ok(Self { kind, plate })
    }

    pub fn with_size(size: u32, plate: impl Into<String>) -> Result<Self> {
        Self::new(VehicleKind::Custom(SizeClass::new(size)?), plate)
    }

    pub fn bike(plate: impl Into<String>) -> Result<Self> {
        Self::new(VehicleKind::Bike, plate)
    }

    pub fn car(plate: impl Into<String>) -> Result<Self> {
        Self::new(VehicleKind::Car, plate)
    }

    pub fn truck(plate: impl Into<String>) -> Result<Self> {
        Self::new(VehicleKind::Truck, plate)
    }

    pub fn kind(&self) -> VehicleKind {
        self.kind
    }

    pub fn plate(&self) -> &str {
        &self.plate
    }

    pub fn size_class(&self) -> SizeClass {
        self.kind.size_class()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Free,
    Occupied,
}

/// One physical parking space. Status changes only through the facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    id: SlotId,
    class: SizeClass,
    status: SlotStatus,
}

impl Slot {
    pub(crate) fn new(id: SlotId, class: SizeClass) -> Self {
        Self {
            id,
            class,
            status: SlotStatus::Free,
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn class(&self) -> SizeClass {
        self.class
    }

    pub fn status(&self) -> SlotStatus {
        self.status
    }

    pub fn is_free(&self) -> bool {
        self.status == SlotStatus::Free
    }

    pub(crate) fn occupy(&mut self) -> Result<()> {
        match self.status {
            SlotStatus::Free => {
                self.status = SlotStatus::Occupied;
                Ok(())
            }
            SlotStatus::Occupied => Err(ParkingError::invalid_state(format!(
                "slot {} is already occupied",
                self.id
            ))),
        }
    }

    pub(crate) fn vacate(&mut self) -> Result<()> {
        match self.status {
            SlotStatus::Occupied => {
                self.status = SlotStatus::Free;
                Ok(())
            }
            SlotStatus::Free => Err(ParkingError::invalid_argument(format!(
                "slot {} is already free",
                self.id
            ))),
        }
    }
}

/// Size units × elapsed time units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fare(pub u64);

impl Fare {
    pub fn amount(self) -> u64 {
        self.0
    }
}

impl std::ops::Add for Fare {
    type Output = Fare;

    fn add(self, rhs: Fare) -> Fare {
        Fare(self.0.saturating_add(rhs.0))
    }
}

impl std::iter::Sum for Fare {
    fn sum<I: Iterator<Item = Fare>>(iter: I) -> Fare {
        iter.fold(Fare::default(), |acc, fare| acc + fare)
    }
}

impl fmt::Display for Fare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Time unit the facility bills in. Partial units are not billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FareUnit {
    #[default]
    Second,
    Minute,
    Hour,
}

impl FareUnit {
    pub fn seconds(self) -> i64 {
        match self {
            Self::Second => 1,
            Self::Minute => 60,
            Self::Hour => 3600,
        }
    }

    /// Whole units in `elapsed`; negative durations count as zero.
    pub fn whole_units(self, elapsed: TimeDelta) -> u64 {
        let units = elapsed.num_seconds() / self.seconds();
        u64::try_from(units).unwrap_or(0)
    }
}

impl fmt::Display for FareUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Second => f.write_str("second"),
            Self::Minute => f.write_str("minute"),
            Self::Hour => f.write_str("hour"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_match_size_classes() {
        assert_eq!(Vehicle::bike("B-1").unwrap().size_class().get(), 2);
        assert_eq!(Vehicle::car("C-1").unwrap().size_class().get(), 4);
        assert_eq!(Vehicle::truck("T-1").unwrap().size_class().get(), 6);
        assert_eq!(Vehicle::with_size(3, "X-1").unwrap().size_class().get(), 3);
    }

    #[test]
    fn test_zero_size_and_blank_plate_are_rejected() {
        assert!(SizeClass::new(0).is_err());
        assert!(Vehicle::with_size(0, "X-1").is_err());
        assert!(Vehicle::car("  ").is_err());
    }

    #[test]
    fn test_vehicle_kind_parsing() {
        assert_eq!("Car".parse::<VehicleKind>().unwrap(), VehicleKind::Car);
        assert_eq!(" truck ".parse::<VehicleKind>().unwrap(), VehicleKind::Truck);
        assert_eq!(
            "5".parse::<VehicleKind>().unwrap(),
            VehicleKind::Custom(SizeClass::new(5).unwrap())
        );
        assert!("0".parse::<VehicleKind>().is_err());
        assert!("bus".parse::<VehicleKind>().is_err());
    }

    #[test]
    fn test_slot_transitions() {
        let mut slot = Slot::new(SlotId(0), SizeClass::CAR);
        assert!(slot.is_free());
        assert!(slot.vacate().is_err());

        slot.occupy().unwrap();
        assert_eq!(slot.status(), SlotStatus::Occupied);
        assert!(slot.occupy().is_err());

        slot.vacate().unwrap();
        assert!(slot.is_free());
    }

    #[test]
    fn test_whole_units_truncate() {
        assert_eq!(FareUnit::Second.whole_units(TimeDelta::seconds(10)), 10);
        assert_eq!(FareUnit::Minute.whole_units(TimeDelta::seconds(119)), 1);
        assert_eq!(FareUnit::Hour.whole_units(TimeDelta::minutes(59)), 0);
        assert_eq!(FareUnit::Second.whole_units(TimeDelta::seconds(-5)), 0);
    }
}
