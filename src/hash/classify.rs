use std::sync::Arc;

use crate::trace::trace_log;
use crate::value::{RuntimeError, RuntimeErrorCode, Value};

use super::{Entry, Hash, Slot};

/// How classification keys are derived from items: a callable, a lookup
/// table keyed by the item's string form, or a positional list indexed by
/// the item's integer value.
pub enum Mapper<'a> {
    Callable(&'a dyn Fn(&Value) -> Value),
    Table(&'a Hash),
    List(&'a [Value]),
}

impl Mapper<'_> {
    fn apply(&self, item: &Value) -> Value {
        match self {
            Mapper::Callable(f) => f(item),
            Mapper::Table(hash) => hash.get(item),
            Mapper::List(values) => {
                let idx = item.to_int();
                if idx >= 0 {
                    values.get(idx as usize).cloned().unwrap_or(Value::Nil)
                } else {
                    Value::Nil
                }
            }
        }
    }
}

fn structural_conflict(key: &Value) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorCode::StructuralConflict,
        format!(
            "Classification key {} is used as both a leaf bucket and an interior level",
            key.to_string_value()
        ),
    )
}

impl Hash {
    /// Partition `items` into buckets keyed by the mapper's result. A flat
    /// result appends the (optionally transformed) item to the list under
    /// that key; a sequence result is a path of keys descending through
    /// nested hashes created on first use. Entries recorded before a
    /// structural conflict remain visible; their exact state is not part
    /// of the contract.
    pub fn classify(
        &mut self,
        mapper: &Mapper,
        items: &[Value],
        transform: Option<&dyn Fn(&Value) -> Value>,
    ) -> Result<(), RuntimeError> {
        self.ensure_mutable()?;
        for item in items {
            let keys = mapper.apply(item);
            let stored = match transform {
                Some(f) => f(item),
                None => item.clone(),
            };
            let path: Vec<Value> = match keys {
                Value::Array(elems, ..) => elems.as_ref().clone(),
                flat => vec![flat],
            };
            if path.is_empty() {
                return Err(RuntimeError::new(
                    RuntimeErrorCode::LengthMismatch,
                    format!(
                        "Classifier returned an empty key list for item {}",
                        item.to_string_value()
                    ),
                ));
            }
            self.insert_classified(&path, stored)?;
        }
        trace_log!("hash", "classify: {} items into {} buckets", items.len(), self.elems());
        Ok(())
    }

    /// Like `classify`, but the mapper yields a list of zero-or-more
    /// targets per item: an item may land in many buckets or none. Each
    /// target follows the same flat-vs-path rule.
    pub fn categorize(
        &mut self,
        mapper: &Mapper,
        items: &[Value],
        transform: Option<&dyn Fn(&Value) -> Value>,
    ) -> Result<(), RuntimeError> {
        self.ensure_mutable()?;
        for item in items {
            let result = mapper.apply(item);
            let stored = match transform {
                Some(f) => f(item),
                None => item.clone(),
            };
            let targets: Vec<Value> = match result {
                Value::Nil => Vec::new(),
                Value::Array(elems, ..) => elems.as_ref().clone(),
                single => vec![single],
            };
            for target in targets {
                let path: Vec<Value> = match target {
                    Value::Array(elems, ..) => elems.as_ref().clone(),
                    flat => vec![flat],
                };
                if path.is_empty() {
                    return Err(RuntimeError::new(
                        RuntimeErrorCode::LengthMismatch,
                        format!(
                            "Categorizer returned an empty key path for item {}",
                            item.to_string_value()
                        ),
                    ));
                }
                self.insert_classified(&path, stored.clone())?;
            }
        }
        Ok(())
    }

    fn insert_classified(&mut self, path: &[Value], item: Value) -> Result<(), RuntimeError> {
        let (key, rest) = match path.split_first() {
            Some(split) => split,
            None => return Ok(()),
        };
        let token = self.insert_token(key)?;
        if rest.is_empty() {
            // leaf: append to the bucket list
            match self.entries_mut().entry(token) {
                indexmap::map::Entry::Vacant(vacant) => {
                    vacant.insert(Entry {
                        key: key.clone(),
                        slot: Slot::Multi(vec![item]),
                    });
                }
                indexmap::map::Entry::Occupied(mut occupied) => {
                    let entry = occupied.get_mut();
                    match std::mem::replace(&mut entry.slot, Slot::Multi(Vec::new())) {
                        Slot::Multi(mut values) => {
                            values.push(item);
                            entry.slot = Slot::Multi(values);
                        }
                        Slot::Single(Value::Hash(inner)) => {
                            entry.slot = Slot::Single(Value::Hash(inner));
                            return Err(structural_conflict(key));
                        }
                        // a pre-existing list entry takes the item element-wise
                        Slot::Single(Value::Array(existing, true)) => {
                            let mut values = existing.as_ref().clone();
                            values.push(item);
                            entry.slot = Slot::Multi(values);
                        }
                        Slot::Single(list @ Value::Array(_, false)) => {
                            entry.slot = Slot::Single(list);
                            return Err(RuntimeError::new(
                                RuntimeErrorCode::ReadonlyValue,
                                format!(
                                    "Cannot classify into the immutable List under key {}",
                                    key.to_string_value()
                                ),
                            ));
                        }
                        // a pre-existing scalar entry promotes like push
                        Slot::Single(old) => {
                            entry.slot = Slot::Multi(vec![old, item]);
                        }
                    }
                }
            }
        } else {
            // interior: descend, creating the nested hash on first use
            match self.entries_mut().entry(token) {
                indexmap::map::Entry::Vacant(vacant) => {
                    let mut inner = Hash::new();
                    inner.insert_classified(rest, item)?;
                    vacant.insert(Entry {
                        key: key.clone(),
                        slot: Slot::Single(Value::hash(inner)),
                    });
                }
                indexmap::map::Entry::Occupied(mut occupied) => {
                    match &mut occupied.get_mut().slot {
                        Slot::Single(Value::Hash(inner)) => {
                            Arc::make_mut(inner).insert_classified(rest, item)?;
                        }
                        _ => return Err(structural_conflict(key)),
                    }
                }
            }
        }
        Ok(())
    }
}
