//! Property-based tests for the lock table
//!
//! Runs random operation sequences against the table and a trivial
//! sequential model, checking that a field never has more than one holder
//! and that only the holder's operations can release it.

use std::collections::HashMap;

use proptest::prelude::*;
use xfform::backend::coordinator::LockTable;
use xfform::shared::Participant;

#[derive(Debug, Clone)]
enum Op {
    Lock { field: usize, owner: usize },
    Unlock { field: usize, owner: usize },
    ReleaseAll { owner: usize },
}

fn op_sequences() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        (0usize..4, 0usize..3).prop_map(|(field, owner)| Op::Lock { field, owner }),
        (0usize..4, 0usize..3).prop_map(|(field, owner)| Op::Unlock { field, owner }),
        (0usize..3).prop_map(|owner| Op::ReleaseAll { owner }),
    ];
    proptest::collection::vec(op, 0..64)
}

fn field_name(index: usize) -> String {
    format!("field-{}", index)
}

fn owner_id(index: usize) -> String {
    format!("session-{}", index)
}

fn participant(index: usize) -> Participant {
    Participant::with_id(owner_id(index), format!("User {}", index))
}

proptest! {
    #[test]
    fn test_lock_table_matches_a_sequential_model(ops in op_sequences()) {
        let mut table = LockTable::default();
        // field index -> owner index
        let mut model: HashMap<usize, usize> = HashMap::new();

        for op in ops {
            match op {
                Op::Lock { field, owner } => {
                    let result = table.lock(&field_name(field), &participant(owner));
                    let expected = model.get(&field).copied();
                    match (result, expected) {
                        (Ok(lock), None) => {
                            prop_assert_eq!(&lock.owner.id, &owner_id(owner));
                            prop_assert_eq!(&lock.field, &field_name(field));
                            model.insert(field, owner);
                        }
                        (Err(holder), Some(current)) => {
                            prop_assert_eq!(&holder.id, &owner_id(current));
                        }
                        (result, expected) => {
                            prop_assert!(false, "diverged: {:?} vs model {:?}", result, expected);
                        }
                    }
                }
                Op::Unlock { field, owner } => {
                    let released = table.unlock(&field_name(field), &owner_id(owner));
                    if model.get(&field) == Some(&owner) {
                        prop_assert!(released.is_some(), "the holder's release must succeed");
                        model.remove(&field);
                    } else {
                        prop_assert!(released.is_none(), "a foreign release must be a no-op");
                    }
                }
                Op::ReleaseAll { owner } => {
                    let mut released: Vec<String> = table
                        .release_all(&owner_id(owner))
                        .into_iter()
                        .map(|lock| lock.field)
                        .collect();
                    released.sort();

                    let mut expected: Vec<String> = model
                        .iter()
                        .filter(|(_, &o)| o == owner)
                        .map(|(&f, _)| field_name(f))
                        .collect();
                    expected.sort();

                    prop_assert_eq!(released, expected);
                    model.retain(|_, &mut o| o != owner);
                }
            }

            // The table and the model agree on every holder.
            prop_assert_eq!(table.len(), model.len());
            for (&field, &owner) in &model {
                let holder_id = owner_id(owner);
                let holder = table.holder(&field_name(field));
                prop_assert_eq!(holder.map(|p| p.id.as_str()), Some(holder_id.as_str()));
            }
        }
    }
}
