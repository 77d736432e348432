#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Property-based tests for the wire schemas.
//!
//! Uses proptest to verify:
//! 1. Room code normalization is idempotent and always uppercase.
//! 2. Status parsing accepts any casing and padding of the wire names.
//! 3. Arbitrary bytes never cause a panic in `decode_validated`.
//! 4. Task ids decode identically from JSON strings and integers.

use proptest::prelude::*;
use taskboard_proto::codec;
use taskboard_proto::room::RoomCode;
use taskboard_proto::task::{Task, TaskId, TaskStatus};

fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::Todo),
        Just(TaskStatus::InProgress),
        Just(TaskStatus::Done),
    ]
}

proptest! {
    #[test]
    fn room_code_normalization_is_idempotent(input in "[ \\t]{0,3}[a-zA-Z0-9]{1,8}[ \\t]{0,3}") {
        let code = RoomCode::parse(&input).unwrap();
        prop_assert_eq!(code.as_str(), input.trim().to_uppercase());
        prop_assert_eq!(RoomCode::parse(code.as_str()).unwrap(), code.clone());
    }

    #[test]
    fn blank_room_code_is_rejected(input in "[ \\t\\n]{0,6}") {
        prop_assert!(RoomCode::parse(&input).is_err());
    }

    #[test]
    fn status_parses_any_casing(status in arb_status(), upper in any::<bool>(), pad in 0usize..3) {
        let name = if upper {
            status.as_str().to_uppercase()
        } else {
            status.as_str().to_string()
        };
        let padded = format!("{}{name}{}", " ".repeat(pad), " ".repeat(pad));
        prop_assert_eq!(padded.parse::<TaskStatus>().unwrap(), status);
        prop_assert_eq!(status.to_string().parse::<TaskStatus>().unwrap(), status);
    }

    #[test]
    fn decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = codec::decode_validated::<Vec<Task>>(&bytes);
    }

    #[test]
    fn numeric_and_string_ids_agree(id in 0u64..u64::MAX, status in arb_status()) {
        let numeric = format!(r#"{{"id":{id},"title":"t","status":"{status}"}}"#);
        let text = format!(r#"{{"id":"{id}","title":"t","status":"{status}"}}"#);
        let a: Task = codec::decode_validated(numeric.as_bytes()).unwrap();
        let b: Task = codec::decode_validated(text.as_bytes()).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.id, TaskId::new(id.to_string()));
    }
}
