use crate::trace::trace_log;
use crate::value::{RuntimeError, RuntimeErrorCode, Value};

use super::{Entry, Hash, Slot};

impl Hash {
    /// Merge key/value items into the existing entries without clearing.
    /// An absent key inserts as-is; a present key promotes its slot to the
    /// multi-value form and adds the new value as one opaque element, even
    /// when that value is itself a sequence.
    pub fn push(&mut self, items: &[Value]) -> Result<(), RuntimeError> {
        self.merge(items, false)
    }

    /// Same merge trigger as `push`, but a sequence value is flattened
    /// element-wise into the multi-value slot instead of being added as
    /// one nested unit. This is the sole difference between the two.
    pub fn append(&mut self, items: &[Value]) -> Result<(), RuntimeError> {
        self.merge(items, true)
    }

    fn merge(&mut self, items: &[Value], flatten: bool) -> Result<(), RuntimeError> {
        self.ensure_mutable()?;
        let mut iter = items.iter();
        while let Some(item) = iter.next() {
            let (key, value) = match item {
                Value::Pair(k, v) => (Value::Str(k.clone()), v.as_ref().clone()),
                Value::ValuePair(k, v) => (k.as_ref().clone(), v.as_ref().clone()),
                other => {
                    let Some(value) = iter.next() else {
                        return Err(RuntimeError::new(
                            RuntimeErrorCode::LengthMismatch,
                            format!(
                                "Odd number of elements in hash merge: key {} has no value",
                                other.to_string_value()
                            ),
                        ));
                    };
                    (other.clone(), value.clone())
                }
            };
            self.merge_one(key, value, flatten)?;
        }
        Ok(())
    }

    fn merge_one(&mut self, key: Value, value: Value, flatten: bool) -> Result<(), RuntimeError> {
        let token = self.insert_token(&key)?;
        self.check_value(&value)?;
        match self.entries_mut().entry(token) {
            indexmap::map::Entry::Vacant(vacant) => {
                trace_log!("hash", "merge insert {}", key.to_string_value());
                vacant.insert(Entry {
                    key,
                    slot: Slot::Single(value),
                });
            }
            indexmap::map::Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                // an immutable List value cannot take new elements in place
                if let Slot::Single(Value::Array(_, false)) = &entry.slot {
                    return Err(RuntimeError::new(
                        RuntimeErrorCode::ReadonlyValue,
                        format!(
                            "Cannot push into the immutable List under key {}",
                            key.to_string_value()
                        ),
                    ));
                }
                trace_log!("hash", "merge collide {}", key.to_string_value());
                // promote the slot to its multi-value form
                let mut values = match std::mem::replace(&mut entry.slot, Slot::Multi(Vec::new())) {
                    Slot::Multi(values) => values,
                    Slot::Single(Value::Array(items, _)) => items.as_ref().clone(),
                    Slot::Single(old) => vec![old],
                };
                if flatten && let Value::Array(elems, ..) = &value {
                    values.extend(elems.iter().cloned());
                } else {
                    values.push(value);
                }
                entry.slot = Slot::Multi(values);
            }
        }
        Ok(())
    }
}
