//! Property-based tests for the wire protocol
//!
//! Uses proptest to throw adversarial frames at the decoder and verify the
//! contract: malformed input is an error, never a panic, and anything that
//! decodes can be re-encoded.

use proptest::prelude::*;
use xfform::shared::{FormMessage, ProtocolError};

proptest! {
    #[test]
    fn test_decode_never_panics(frame in ".*") {
        if let Ok(message) = FormMessage::decode(&frame) {
            prop_assert!(message.encode().is_ok());
        }
    }

    #[test]
    fn test_unknown_kinds_are_rejected_not_crashed(kind in "[a-z-]{1,16}") {
        prop_assume!(!matches!(
            kind.as_str(),
            "join" | "welcome" | "leave" | "update" | "lock" | "unlock"
                | "error" | "heartbeat-ping" | "heartbeat-pong"
        ));
        let frame = format!(r#"{{"type":"{}","data":{{}}}}"#, kind);
        prop_assert!(
            matches!(
                FormMessage::decode(&frame),
                Err(ProtocolError::Decode { .. })
            ),
            "expected a decode error for frame {:?}",
            frame
        );
    }

    #[test]
    fn test_update_values_of_any_shape_survive_the_wire(
        field in "[a-zA-Z0-9_]{1,12}",
        n in proptest::num::i64::ANY,
        s in ".{0,32}",
        flag in proptest::bool::ANY,
    ) {
        // Arbitrary value shapes including nesting; last-writer-wins values
        // are opaque JSON to the protocol.
        let value = serde_json::json!({"n": n, "s": s, "nested": {"flag": flag}});
        let encoded = FormMessage::update(&field, value.clone()).encode().unwrap();
        match FormMessage::decode(&encoded) {
            Ok(FormMessage::Update(data)) => {
                prop_assert_eq!(data.field.as_deref(), Some(field.as_str()));
                prop_assert_eq!(data.value, Some(value));
            }
            other => prop_assert!(false, "unexpected decode result: {:?}", other),
        }
    }
}
