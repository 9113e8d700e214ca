use indexmap::IndexMap;

use crate::trace::trace_log;
use crate::value::{RuntimeError, RuntimeErrorCode, Value};

use super::{Entry, Hash, KeyToken, Slot};

impl Hash {
    /// Bulk assignment: clear, then consume `items` left to right. Pair
    /// items store directly; any other item is a key whose value is the
    /// next item. A pair encountered in value position is stored as a
    /// literal value, not decomposed. Duplicate keys last-write-win while
    /// keeping the first occurrence's position. A trailing bare key with
    /// no value fails the whole assignment and leaves the container as it
    /// was.
    pub fn assign(&mut self, items: &[Value]) -> Result<(), RuntimeError> {
        self.ensure_mutable()?;
        let mut staged: IndexMap<KeyToken, Entry> = IndexMap::new();
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
                                "Odd number of elements found where hash initializer expected: key {} has no value",
                                other.to_string_value()
                            ),
                        )
                        .with_hint("pair every bare key with a following value"));
                    };
                    (other.clone(), value.clone())
                }
            };
            let token = self.insert_token(&key)?;
            self.check_value(&value)?;
            match staged.entry(token) {
                indexmap::map::Entry::Occupied(mut occupied) => {
                    occupied.get_mut().slot = Slot::Single(value)
                }
                indexmap::map::Entry::Vacant(vacant) => {
                    vacant.insert(Entry {
                        key,
                        slot: Slot::Single(value),
                    });
                }
            }
        }
        trace_log!("hash", "assign: {} entries", staged.len());
        *self.entries_mut() = staged;
        Ok(())
    }

    /// Slice assignment: a single non-sequence value broadcasts to every
    /// key; a sequence is consumed in key order. Fewer values than keys is
    /// an error; surplus values are ignored.
    pub fn assign_slice(&mut self, keys: &[Value], rhs: &Value) -> Result<(), RuntimeError> {
        self.ensure_mutable()?;
        let values: Vec<Value> = match rhs {
            Value::Array(items, ..) => {
                if items.len() < keys.len() {
                    return Err(RuntimeError::new(
                        RuntimeErrorCode::LengthMismatch,
                        format!(
                            "Slice assignment expected {} values but got {}",
                            keys.len(),
                            items.len()
                        ),
                    ));
                }
                items.iter().take(keys.len()).cloned().collect()
            }
            single => vec![single.clone(); keys.len()],
        };
        // stage all checks so a rejected key or value leaves no trace
        let mut staged = Vec::with_capacity(keys.len());
        for (key, value) in keys.iter().zip(values) {
            let token = self.insert_token(key)?;
            self.check_value(&value)?;
            staged.push((token, key.clone(), value));
        }
        trace_log!("hash", "assign_slice: {} keys", staged.len());
        for (token, key, value) in staged {
            self.insert_entry(token, key, Slot::Single(value));
        }
        Ok(())
    }
}
