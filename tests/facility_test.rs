use chrono::TimeDelta;
use small_parking::{
    Facility, Fare, FareUnit, ManualClock, ParkingError, SizeClass, SlotStatus, Vehicle,
};
use std::sync::Arc;

fn single_car_slot() -> (Facility, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let facility = Facility::new("single", clock.clone());
    facility.add_slot(SizeClass::new(4).unwrap());
    (facility, clock)
}

#[test]
fn test_full_facility_then_release_then_reissue() {
    let (facility, _clock) = single_car_slot();

    let first = facility
        .issue_ticket(&Vehicle::with_size(4, "AAA-111").unwrap())
        .unwrap();

    let second = facility.issue_ticket(&Vehicle::with_size(4, "BBB-222").unwrap());
    assert!(matches!(
        second,
        Err(ParkingError::ResourceExhausted { class: 4 })
    ));
    assert_eq!(facility.open_tickets(), 1);

    facility.release_ticket(&first).unwrap();

    let third = facility
        .issue_ticket(&Vehicle::with_size(4, "CCC-333").unwrap())
        .unwrap();
    assert_eq!(third.slot(), first.slot());
    assert_eq!(facility.open_tickets(), 1);
}

#[test]
fn test_fare_for_ten_time_units() {
    let (facility, clock) = single_car_slot();
    let ticket = facility
        .issue_ticket(&Vehicle::with_size(4, "AAA-111").unwrap())
        .unwrap();

    clock.advance(TimeDelta::seconds(10));
    facility.release_ticket(&ticket).unwrap();

    assert_eq!(ticket.compute_fare().unwrap(), Fare(40));
    assert_eq!(ticket.dwell_time(), Some(TimeDelta::seconds(10)));
}

#[test]
fn test_fare_in_minutes() {
    let clock = Arc::new(ManualClock::default());
    let facility = Facility::new("hourly", clock.clone()).with_fare_unit(FareUnit::Minute);
    facility.add_slot(SizeClass::TRUCK);

    let ticket = facility.issue_ticket(&Vehicle::truck("TR-1").unwrap()).unwrap();
    clock.advance(TimeDelta::minutes(10) + TimeDelta::seconds(30));
    facility.release_ticket(&ticket).unwrap();

    assert_eq!(ticket.fare_unit(), FareUnit::Minute);
    assert_eq!(ticket.compute_fare().unwrap(), Fare(60));
}

#[test]
fn test_fare_before_release_is_invalid_state() {
    let (facility, clock) = single_car_slot();
    let ticket = facility.issue_ticket(&Vehicle::car("AAA-111").unwrap()).unwrap();

    clock.advance(TimeDelta::seconds(30));
    let err = ticket.compute_fare().unwrap_err();
    assert!(matches!(err, ParkingError::InvalidState { .. }));
    assert!(err.to_string().contains("vehicle still parked"));
}

#[test]
fn test_double_release_is_invalid_argument() {
    let (facility, clock) = single_car_slot();
    let ticket = facility.issue_ticket(&Vehicle::car("AAA-111").unwrap()).unwrap();

    clock.advance(TimeDelta::seconds(5));
    facility.release_ticket(&ticket).unwrap();
    let exit = ticket.exit_time();

    clock.advance(TimeDelta::seconds(5));
    assert!(matches!(
        facility.release_ticket(&ticket),
        Err(ParkingError::InvalidArgument { .. })
    ));

    // the failed release leaves everything as it was
    assert_eq!(ticket.exit_time(), exit);
    assert_eq!(ticket.compute_fare().unwrap(), Fare(20));
    assert_eq!(facility.open_tickets(), 0);
    assert_eq!(facility.occupied_slots(), 0);
}

#[test]
fn test_release_through_clone_closes_original() {
    let (facility, _clock) = single_car_slot();
    let ticket = facility.issue_ticket(&Vehicle::car("AAA-111").unwrap()).unwrap();
    let copy = ticket.clone();

    facility.release_ticket(&copy).unwrap();
    assert!(!ticket.is_open());
    assert!(facility.release_ticket(&ticket).is_err());
}

#[test]
fn test_ticket_from_another_facility_is_rejected() {
    let (ours, _) = single_car_slot();
    let (theirs, _) = single_car_slot();
    let foreign = theirs.issue_ticket(&Vehicle::car("AAA-111").unwrap()).unwrap();

    assert!(matches!(
        ours.release_ticket(&foreign),
        Err(ParkingError::InvalidArgument { .. })
    ));
    assert_eq!(ours.open_tickets(), 0);
    assert_eq!(theirs.open_tickets(), 1);
    assert!(foreign.is_open());
}

#[test]
fn test_exact_class_matching_only() {
    let clock = Arc::new(ManualClock::default());
    let facility = Facility::new("mixed", clock);
    facility.add_slots(SizeClass::TRUCK, 2);
    facility.add_slots(SizeClass::BIKE, 1);

    // no upsizing into a truck slot
    assert!(matches!(
        facility.issue_ticket(&Vehicle::car("CAR-1").unwrap()),
        Err(ParkingError::ResourceExhausted { class: 4 })
    ));

    let bike = facility.issue_ticket(&Vehicle::bike("BK-1").unwrap()).unwrap();
    let truck = facility.issue_ticket(&Vehicle::truck("TR-1").unwrap()).unwrap();

    let slots = facility.slots();
    assert_eq!(slots[bike.slot().index()].class(), SizeClass::BIKE);
    assert_eq!(slots[truck.slot().index()].class(), SizeClass::TRUCK);
    assert_eq!(slots[truck.slot().index()].status(), SlotStatus::Occupied);
    assert_eq!(facility.free_slots(SizeClass::TRUCK), 1);
    assert_eq!(facility.free_slots(SizeClass::BIKE), 0);
}

#[test]
fn test_empty_facility_is_exhausted() {
    let facility = Facility::new("empty", Arc::new(ManualClock::default()));
    let err = facility
        .issue_ticket(&Vehicle::bike("BK-1").unwrap())
        .unwrap_err();
    assert!(err.is_retryable());
    assert!(facility.availability().is_empty());
}
