use chrono::TimeDelta;
use proptest::prelude::*;
use small_parking::{Facility, ManualClock, ParkingError, SizeClass, Ticket, Vehicle};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Op {
    Issue { size: u32 },
    Release { pick: usize },
    ReleaseClosed { pick: usize },
    Wait { seconds: i64 },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (1u32..=4).prop_map(|size| Op::Issue { size }),
        2 => any::<usize>().prop_map(|pick| Op::Release { pick }),
        1 => any::<usize>().prop_map(|pick| Op::ReleaseClosed { pick }),
        1 => (0i64..120).prop_map(|seconds| Op::Wait { seconds }),
    ]
}

fn assert_invariants(facility: &Facility, open: &[Ticket]) {
    let slots = facility.slots();
    let occupied = slots.iter().filter(|s| !s.is_free()).count();

    assert_eq!(occupied, facility.open_tickets());
    assert_eq!(occupied, open.len());

    let held: HashSet<_> = open.iter().map(Ticket::slot).collect();
    assert_eq!(held.len(), open.len(), "slot assigned to two open tickets");

    for ticket in open {
        let slot = &slots[ticket.slot().index()];
        assert!(!slot.is_free());
        assert_eq!(slot.class(), ticket.vehicle().size_class());
    }
}

proptest! {
    #[test]
    fn occupancy_matches_open_tickets(
        inventory in prop::collection::vec((1u32..=4, 1usize..=3), 1..5),
        ops in prop::collection::vec(op(), 0..80),
    ) {
        let clock = Arc::new(ManualClock::default());
        let facility = Facility::new("prop", clock.clone());
        for (size, count) in &inventory {
            facility.add_slots(SizeClass::new(*size).unwrap(), *count);
        }

        let mut open: Vec<Ticket> = Vec::new();
        let mut closed: Vec<Ticket> = Vec::new();

        for (n, op) in ops.into_iter().enumerate() {
            match op {
                Op::Issue { size } => {
                    let vehicle = Vehicle::with_size(size, format!("P-{}", n)).unwrap();
                    let before = facility.free_slots(vehicle.size_class());
                    match facility.issue_ticket(&vehicle) {
                        Ok(ticket) => {
                            prop_assert!(before > 0);
                            prop_assert!(ticket.is_open());
                            open.push(ticket);
                        }
                        Err(ParkingError::ResourceExhausted { class }) => {
                            prop_assert_eq!(before, 0);
                            prop_assert_eq!(class, size);
                        }
                        Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
                    }
                }
                Op::Release { pick } => {
                    if !open.is_empty() {
                        let ticket = open.swap_remove(pick % open.len());
                        facility.release_ticket(&ticket).unwrap();
                        prop_assert!(ticket.compute_fare().is_ok());
                        closed.push(ticket);
                    }
                }
                Op::ReleaseClosed { pick } => {
                    if !closed.is_empty() {
                        let ticket = &closed[pick % closed.len()];
                        let is_invalid_argument = matches!(
                            facility.release_ticket(ticket),
                            Err(ParkingError::InvalidArgument { .. })
                        );
                        prop_assert!(is_invalid_argument);
                    }
                }
                Op::Wait { seconds } => clock.advance(TimeDelta::seconds(seconds)),
            }

            assert_invariants(&facility, &open);
            for ticket in &open {
                prop_assert!(ticket.compute_fare().is_err());
            }
        }
    }
}
