//! Feedback loops must pass through a Sum or Delay, whatever their shape.

use proptest::prelude::*;
use sf_core::CompId;
use sf_signal::Signal;
use sf_system::{ConfigurationError, StepControl, System, SystemError};

/// Stateless processors with an input and an output port 0.
fn add_stateless(system: &mut System, kind: u8) -> CompId {
    match kind % 4 {
        0 => system.add_gain(0.5),
        1 => system.add_add(),
        2 => system.add_split(),
        _ => system.add_function("x / 2").unwrap(),
    }
}

/// A ring of components fed by one Input and observed by one Output.
fn ring(kinds: &[u8], breaker: Option<(usize, bool)>) -> System {
    let mut system = System::new();
    let input = system.add_input(Signal::constant(0.0, 1.0, 4, 1.0).unwrap());
    let members: Vec<CompId> = kinds
        .iter()
        .enumerate()
        .map(|(i, &kind)| match breaker {
            Some((at, true)) if at == i => system.add_sum(),
            Some((at, false)) if at == i => system.add_delay(),
            _ => add_stateless(&mut system, kind),
        })
        .collect();
    let output = system.add_output();

    for (i, &from) in members.iter().enumerate() {
        let to = members[(i + 1) % members.len()];
        system.add_connector((from, 0), (to, 0)).unwrap();
    }
    // Add components in the ring take the external signal on their free port.
    for &member in &members {
        if system.component(member).map(|c| c.num_inputs()) == Some(2) {
            system.add_connector((input, 0), (member, 1)).unwrap();
        }
    }
    system.add_connector((members[0], 0), (output, 0)).unwrap();
    system
}

proptest! {
    #[test]
    fn stateless_rings_are_rejected_before_any_step(
        kinds in prop::collection::vec(any::<u8>(), 1..7)
    ) {
        let mut system = ring(&kinds, None);
        let mut steps = 0usize;
        let err = system
            .simulate_with_progress(&mut |_| {
                steps += 1;
                StepControl::Continue
            })
            .unwrap_err();
        prop_assert_eq!(steps, 0);
        let is_cycle = matches!(
            err,
            SystemError::Configuration(ConfigurationError::UnbrokenCycle { .. })
        );
        prop_assert!(is_cycle);
    }

    #[test]
    fn one_stateful_member_breaks_any_ring(
        kinds in prop::collection::vec(any::<u8>(), 1..7),
        at in any::<prop::sample::Index>(),
        sum in any::<bool>(),
    ) {
        let at = at.index(kinds.len());
        let mut system = ring(&kinds, Some((at, sum)));
        prop_assert!(system.validate().is_ok());
        let outputs = system.simulate().unwrap();
        prop_assert_eq!(outputs[0].len(), 4);
    }
}

#[test]
fn cycle_between_two_rings_sharing_a_delay_is_accepted() {
    let mut system = System::new();
    let delay = system.add_delay();
    let split = system.add_split();
    let a = system.add_gain(0.5);
    let b = system.add_gain(0.25);
    let add = system.add_add();
    system.add_connector((delay, 0), (split, 0)).unwrap();
    system.add_connector((split, 0), (a, 0)).unwrap();
    system.add_connector((split, 1), (b, 0)).unwrap();
    system.add_connector((a, 0), (add, 0)).unwrap();
    system.add_connector((b, 0), (add, 1)).unwrap();
    system.add_connector((add, 0), (delay, 0)).unwrap();

    let order = system.evaluation_order().unwrap();
    assert_eq!(order, vec![delay, split, a, b, add]);
}

#[test]
fn stateless_chord_inside_a_delay_loop_is_rejected() {
    // delay -> a -> b -> delay closes through the Delay, but a <-> b does not.
    let mut system = System::new();
    let delay = system.add_delay();
    let a = system.add_add();
    let b = system.add_split();
    system.add_connector((delay, 0), (a, 0)).unwrap();
    system.add_connector((a, 0), (b, 0)).unwrap();
    system.add_connector((b, 0), (delay, 0)).unwrap();
    system.add_connector((b, 1), (a, 1)).unwrap();

    assert!(matches!(
        system.validate(),
        Err(SystemError::Configuration(ConfigurationError::UnbrokenCycle { .. }))
    ));
}
