//! Property-based tests for power derivation and input labels

use std::sync::Arc;

use pjlink_client::mock::{Call, MockConnector};
use pjlink_client::{InputSource, PowerState};
use pjlink_coordinator::{
    format_input_source, has_power, ConnectionParams, Coordinator, ALIVE_POWER_STATES,
};
use proptest::prelude::*;

fn power_state_strategy() -> impl Strategy<Value = PowerState> {
    prop::sample::select(PowerState::ALL.to_vec())
}

fn input_strategy() -> impl Strategy<Value = InputSource> {
    ("[A-Z]{2,8}", "[1-9A-Z]").prop_map(|(name, number)| InputSource::new(name, number))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_has_power_matches_alive_set(state in power_state_strategy()) {
        prop_assert_eq!(has_power(state), ALIVE_POWER_STATES.contains(&state));
    }

    #[test]
    fn prop_power_commands_only_when_needed(state in power_state_strategy(), on in any::<bool>()) {
        let connector = MockConnector::default();
        let device = connector.device().clone();
        device.update(|s| s.power = state);
        let params = ConnectionParams::new("10.0.0.1", 4352, "P", "utf-8", None);
        let coordinator = Coordinator::new(params, Arc::new(connector));

        let result = if on {
            coordinator.turn_on()
        } else {
            coordinator.turn_off()
        };

        let sent = device.count(|c| matches!(c, Call::SetPower(_)));
        prop_assert_eq!(sent, usize::from(has_power(state) != on));
        // A projector in transition rejects whatever it is sent
        let transitioning = matches!(state, PowerState::Cooling | PowerState::WarmUp);
        prop_assert_eq!(result.is_err(), sent == 1 && transitioning);
    }

    #[test]
    fn prop_labels_resolve_back(inputs in prop::collection::vec(input_strategy(), 1..6), pick in any::<prop::sample::Index>()) {
        let connector = MockConnector::default();
        let device = connector.device().clone();
        let chosen = pick.get(&inputs).clone();
        device.update(|s| {
            s.input = inputs[0].clone();
            s.inputs = inputs.clone();
        });
        let params = ConnectionParams::new("10.0.0.1", 4352, "P", "utf-8", None);
        let coordinator = Coordinator::new(params, Arc::new(connector));
        coordinator.refresh().unwrap();

        coordinator.select_source(&format_input_source(&chosen)).unwrap();

        let snapshot = coordinator.refresh().unwrap();
        // Duplicate labels resolve to the first matching input
        let expected = inputs.iter().find(|i| format_input_source(i) == format_input_source(&chosen)).unwrap();
        prop_assert_eq!(snapshot.input.as_ref(), Some(expected));
    }
}
