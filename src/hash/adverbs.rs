use crate::value::{RuntimeError, Value};

use super::{Entry, Hash, KeyMode};

impl Hash {
    // ---- subscript adverbs ----

    pub fn exists(&self, key: &Value) -> bool {
        self.entries().contains_key(&self.lookup_token(key))
    }

    /// Existence flags for a key set, in the order the keys were given.
    pub fn exists_all(&self, keys: &[Value]) -> Vec<bool> {
        keys.iter().map(|key| self.exists(key)).collect()
    }

    /// Remove an entry and return its value. An absent key is not an
    /// error; it yields the container's default value.
    pub fn delete(&mut self, key: &Value) -> Result<Value, RuntimeError> {
        self.ensure_mutable()?;
        let token = self.lookup_token(key);
        Ok(match self.entries_mut().shift_remove(&token) {
            Some(entry) => entry.slot.project(),
            None => self.default_value(),
        })
    }

    pub fn delete_all(&mut self, keys: &[Value]) -> Result<Vec<Value>, RuntimeError> {
        keys.iter().map(|key| self.delete(key)).collect()
    }

    fn pair_for(&self, entry: &Entry) -> Value {
        let value = self.project_value(entry.slot.project());
        match self.key_mode() {
            KeyMode::Str => Value::pair(entry.key.to_string_value(), value),
            KeyMode::Typed | KeyMode::Identity => Value::value_pair(entry.key.clone(), value),
        }
    }

    /// The `(key, value)` pair projection of one entry, or `Nil` for an
    /// absent key.
    pub fn pair_of(&self, key: &Value) -> Value {
        match self.entries().get(&self.lookup_token(key)) {
            Some(entry) => self.pair_for(entry),
            None => Value::Nil,
        }
    }

    /// Pair projections for a key set; absent keys are filtered out.
    pub fn pairs_of(&self, keys: &[Value]) -> Vec<Value> {
        keys.iter()
            .filter_map(|key| self.entries().get(&self.lookup_token(key)))
            .map(|entry| self.pair_for(entry))
            .collect()
    }

    /// The stored keys among the given set, in the order given.
    pub fn keys_of(&self, keys: &[Value]) -> Vec<Value> {
        keys.iter()
            .filter_map(|key| self.entries().get(&self.lookup_token(key)))
            .map(|entry| entry.key.clone())
            .collect()
    }

    /// The values under the given keys; absent keys are filtered out.
    pub fn values_of(&self, keys: &[Value]) -> Vec<Value> {
        keys.iter()
            .filter_map(|key| self.entries().get(&self.lookup_token(key)))
            .map(|entry| self.project_value(entry.slot.project()))
            .collect()
    }

    // ---- whole-container projections, all in insertion order ----

    pub fn keys(&self) -> Vec<Value> {
        self.entries().values().map(|entry| entry.key.clone()).collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.entries()
            .values()
            .map(|entry| self.project_value(entry.slot.project()))
            .collect()
    }

    pub fn pairs(&self) -> Vec<Value> {
        self.entries()
            .values()
            .map(|entry| self.pair_for(entry))
            .collect()
    }

    /// Keys and values interleaved into one flat list.
    pub fn kv(&self) -> Vec<Value> {
        let mut out = Vec::with_capacity(self.elems() * 2);
        for entry in self.entries().values() {
            out.push(entry.key.clone());
            out.push(self.project_value(entry.slot.project()));
        }
        out
    }

    /// Pairs with key and value exchanged, one per entry.
    pub fn antipairs(&self) -> Vec<Value> {
        self.entries()
            .values()
            .map(|entry| {
                Value::value_pair(
                    self.project_value(entry.slot.project()),
                    entry.key.clone(),
                )
            })
            .collect()
    }

    /// Like `antipairs`, but multi-value slots are expanded element-wise:
    /// each element becomes its own `value => key` pair.
    pub fn invert(&self) -> Vec<Value> {
        let mut out = Vec::new();
        for entry in self.entries().values() {
            match &entry.slot {
                super::Slot::Multi(values) => {
                    for value in values {
                        out.push(Value::value_pair(value.clone(), entry.key.clone()));
                    }
                }
                super::Slot::Single(Value::Array(items, ..)) => {
                    for value in items.iter() {
                        out.push(Value::value_pair(value.clone(), entry.key.clone()));
                    }
                }
                super::Slot::Single(value) => {
                    out.push(Value::value_pair(value.clone(), entry.key.clone()));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::RuntimeErrorCode;

    fn str(s: &str) -> Value {
        Value::Str(s.to_string())
    }

    fn sample() -> Hash {
        Hash::from_list(&[str("a"), Value::Int(1), str("b"), Value::Int(2)]).unwrap()
    }

    #[test]
    fn exists_then_delete_then_default() {
        let mut hash = sample();
        assert!(hash.exists(&str("a")));
        assert_eq!(hash.delete(&str("a")).unwrap(), Value::Int(1));
        assert!(!hash.exists(&str("a")));
        assert_eq!(hash.get(&str("a")), Value::Nil);
        // deleting again is not an error and yields the default
        assert_eq!(hash.delete(&str("a")).unwrap(), Value::Nil);
    }

    #[test]
    fn delete_respects_the_configured_default() {
        let mut hash = Hash::new().with_default(Value::Int(-1));
        assert_eq!(hash.delete(&str("ghost")).unwrap(), Value::Int(-1));
    }

    #[test]
    fn exists_all_preserves_key_order() {
        let hash = sample();
        assert_eq!(
            hash.exists_all(&[str("b"), str("nope"), str("a")]),
            vec![true, false, true]
        );
    }

    #[test]
    fn pair_projection_returns_pairs_not_values() {
        let hash = sample();
        assert_eq!(hash.pair_of(&str("a")), Value::pair("a", Value::Int(1)));
        assert_eq!(hash.pair_of(&str("ghost")), Value::Nil);
        assert_eq!(
            hash.pairs_of(&[str("b"), str("ghost")]),
            vec![Value::pair("b", Value::Int(2))]
        );
    }

    #[test]
    fn key_and_value_projections_filter_absent_keys() {
        let hash = sample();
        assert_eq!(hash.keys_of(&[str("ghost"), str("a")]), vec![str("a")]);
        assert_eq!(
            hash.values_of(&[str("a"), str("ghost"), str("b")]),
            vec![Value::Int(1), Value::Int(2)]
        );
    }

    #[test]
    fn whole_container_projections_follow_insertion_order() {
        let hash = sample();
        assert_eq!(hash.keys(), vec![str("a"), str("b")]);
        assert_eq!(hash.values(), vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(
            hash.kv(),
            vec![str("a"), Value::Int(1), str("b"), Value::Int(2)]
        );
        assert_eq!(
            hash.pairs(),
            vec![
                Value::pair("a", Value::Int(1)),
                Value::pair("b", Value::Int(2))
            ]
        );
    }

    #[test]
    fn antipairs_swap_and_invert_expands_lists() {
        let mut hash = sample();
        hash.push(&[str("a"), Value::Int(3)]).unwrap();

        assert_eq!(
            hash.antipairs(),
            vec![
                Value::value_pair(Value::array(vec![Value::Int(1), Value::Int(3)]), str("a")),
                Value::value_pair(Value::Int(2), str("b")),
            ]
        );
        assert_eq!(
            hash.invert(),
            vec![
                Value::value_pair(Value::Int(1), str("a")),
                Value::value_pair(Value::Int(3), str("a")),
                Value::value_pair(Value::Int(2), str("b")),
            ]
        );
    }

    #[test]
    fn delete_on_readonly_container_is_rejected() {
        let mut hash = sample().into_readonly();
        let err = hash.delete(&str("a")).unwrap_err();
        assert_eq!(err.code, RuntimeErrorCode::ReadonlyValue);
    }
}
