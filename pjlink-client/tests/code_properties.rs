//! Property tests for the protocol code parsers

use pjlink_client::{ErrorSeverity, InputSource, PowerState, ProjectorFault};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_power_code_accepts_only_known_codes(code in "\\PC{0,3}") {
        let parsed = PowerState::from_code(&code);
        let known = PowerState::ALL.iter().any(|s| s.code() == code);
        prop_assert_eq!(parsed.is_some(), known);
        if let Some(state) = parsed {
            prop_assert_eq!(state.code(), code.as_str());
        }
    }

    #[test]
    fn prop_input_code_keeps_number(kind in 1u8..=6, number in "[1-9A-Z]") {
        let code = format!("{}{}", kind, number);
        let input = InputSource::from_code(&code).unwrap();
        prop_assert_eq!(input.number, number);
    }

    #[test]
    fn prop_input_code_rejects_unknown_type(kind in "[07-9A-Z]", number in "[1-9]") {
        let code = format!("{}{}", kind, number);
        prop_assert!(InputSource::from_code(&code).is_none());
    }

    #[test]
    fn prop_input_code_rejects_wrong_length(code in "[1-6][1-9]{2,5}") {
        prop_assert!(InputSource::from_code(&code).is_none());
    }

    #[test]
    fn prop_severity_digits(c in any::<char>()) {
        prop_assert_eq!(ErrorSeverity::from_code(c).is_some(), matches!(c, '0'..='2'));
    }

    #[test]
    fn prop_fault_tokens(n in 0u8..10) {
        let token = format!("ERR{}", n);
        prop_assert_eq!(ProjectorFault::from_response(&token).is_some(), (1..=4).contains(&n));
    }
}
