use std::sync::Arc;

use indexmap::IndexMap;

use crate::value::{RuntimeError, RuntimeErrorCode, Value};

mod adverbs;
mod assign;
mod classify;
mod merge;

pub use classify::Mapper;

/// Internal key form entries are indexed by: the key's string form for
/// string- and typed-key containers, or a per-instance identity id for
/// object hashes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum KeyToken {
    Str(String),
    Identity(u64),
}

/// A value slot. Push/append promote `Single` to `Multi` as an explicit
/// state transition; lookups project `Multi` back out as an Array value.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Single(Value),
    Multi(Vec<Value>),
}

impl Slot {
    pub(crate) fn project(&self) -> Value {
        match self {
            Slot::Single(v) => v.clone(),
            Slot::Multi(items) => Value::array(items.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyMode {
    /// Keys are coerced to their string form on insertion (the default).
    Str,
    /// Keys must satisfy the declared type and are stored un-coerced.
    Typed,
    /// Object hash: key equality is instance identity, never structure.
    Identity,
}

#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) key: Value,
    pub(crate) slot: Slot,
}

/// An insertion-order-preserving mapping from keys to value slots.
///
/// Containers are string-keyed by default; `keyed_by` constrains keys to a
/// declared type and `keyed_by_identity` builds an object hash. A declared
/// value type is enforced on every assignment, lookups of absent keys
/// return the configured default (`Nil` unless set), and a readonly
/// container rejects every mutation.
#[derive(Debug, Clone)]
pub struct Hash {
    entries: IndexMap<KeyToken, Entry>,
    key_mode: KeyMode,
    key_type: Option<String>,
    value_type: Option<String>,
    default_value: Option<Value>,
    dynamic: bool,
    readonly: bool,
}

impl Default for Hash {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Hash {
    /// Content equality: same keys mapping to equal slots, order ignored.
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(token, entry)| {
                    other
                        .entries
                        .get(token)
                        .is_some_and(|o| o.slot == entry.slot)
                })
    }
}

impl Hash {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            key_mode: KeyMode::Str,
            key_type: None,
            value_type: None,
            default_value: None,
            dynamic: false,
            readonly: false,
        }
    }

    /// Build a container from an initializer list; the item semantics are
    /// those of bulk assignment.
    pub fn from_list(items: &[Value]) -> Result<Self, RuntimeError> {
        let mut hash = Self::new();
        hash.assign(items)?;
        Ok(hash)
    }

    /// A container whose keys must satisfy the given type, checked on
    /// every insertion. Keys are stored un-coerced.
    pub fn keyed_by(type_name: impl Into<String>) -> Self {
        Self {
            key_mode: KeyMode::Typed,
            key_type: Some(type_name.into()),
            ..Self::new()
        }
    }

    /// An object hash: keys are compared by instance identity, so two
    /// structurally equal but distinct instances occupy separate entries.
    pub fn keyed_by_identity() -> Self {
        Self {
            key_mode: KeyMode::Identity,
            key_type: Some("Any".to_string()),
            ..Self::new()
        }
    }

    /// Constrain values to the given type, checked on every assignment.
    pub fn of(mut self, type_name: impl Into<String>) -> Self {
        self.value_type = Some(type_name.into());
        self
    }

    /// Value returned for lookups of absent keys.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default_value = Some(default);
        self
    }

    pub fn dynamic(mut self) -> Self {
        self.dynamic = true;
        self
    }

    /// Freeze the container: every subsequent mutation fails with a
    /// `ReadonlyValue` error.
    pub fn into_readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    // ---- declaration-time accessors ----

    pub fn key_type(&self) -> Option<&str> {
        self.key_type.as_deref()
    }

    pub fn value_type(&self) -> Option<&str> {
        self.value_type.as_deref()
    }

    pub fn default_value(&self) -> Value {
        self.default_value.clone().unwrap_or(Value::Nil)
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    pub fn is_object_hash(&self) -> bool {
        self.key_mode == KeyMode::Identity
    }

    pub fn elems(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ---- key tokens and constraint checks ----

    pub(crate) fn lookup_token(&self, key: &Value) -> KeyToken {
        match self.key_mode {
            KeyMode::Str | KeyMode::Typed => KeyToken::Str(key.to_string_value()),
            KeyMode::Identity => match key.identity_id() {
                Some(id) => KeyToken::Identity(id),
                // value-kind keys in an object hash collide by kind and value
                None => KeyToken::Str(format!("{}|{}", key.type_name(), key.to_string_value())),
            },
        }
    }

    pub(crate) fn insert_token(&self, key: &Value) -> Result<KeyToken, RuntimeError> {
        if self.key_mode == KeyMode::Typed
            && let Some(expected) = self.key_type.as_deref()
            && !key.isa_check(expected)
        {
            return Err(RuntimeError::new(
                RuntimeErrorCode::TypeMismatch,
                format!(
                    "Type check failed for hash key: expected {} but got {}",
                    expected,
                    key.type_name()
                ),
            ));
        }
        Ok(self.lookup_token(key))
    }

    pub(crate) fn check_value(&self, value: &Value) -> Result<(), RuntimeError> {
        if let Some(expected) = self.value_type.as_deref()
            && !value.isa_check(expected)
        {
            return Err(RuntimeError::new(
                RuntimeErrorCode::TypeMismatch,
                format!(
                    "Type check failed for hash value: expected {} but got {}",
                    expected,
                    value.type_name()
                ),
            ));
        }
        Ok(())
    }

    pub(crate) fn ensure_mutable(&self) -> Result<(), RuntimeError> {
        if self.readonly {
            return Err(RuntimeError::new(
                RuntimeErrorCode::ReadonlyValue,
                "Cannot modify a readonly hash",
            ));
        }
        Ok(())
    }

    // ---- element access ----

    /// Plain lookup. Absent keys yield the configured default value.
    pub fn get(&self, key: &Value) -> Value {
        match self.entries.get(&self.lookup_token(key)) {
            Some(entry) => self.project_value(entry.slot.project()),
            None => self.default_value(),
        }
    }

    /// Readonly containers hand out readonly nested hashes, so write
    /// access cannot be smuggled through a projection.
    pub(crate) fn project_value(&self, value: Value) -> Value {
        if self.readonly
            && let Value::Hash(inner) = &value
            && !inner.is_readonly()
        {
            let mut frozen = (**inner).clone();
            frozen.readonly = true;
            return Value::Hash(Arc::new(frozen));
        }
        value
    }

    pub fn set(&mut self, key: Value, value: Value) -> Result<(), RuntimeError> {
        self.ensure_mutable()?;
        let token = self.insert_token(&key)?;
        self.check_value(&value)?;
        self.insert_entry(token, key, Slot::Single(value));
        Ok(())
    }

    /// Last-write-wins insert that keeps an existing entry's position.
    pub(crate) fn insert_entry(&mut self, token: KeyToken, key: Value, slot: Slot) {
        match self.entries.entry(token) {
            indexmap::map::Entry::Occupied(mut occupied) => occupied.get_mut().slot = slot,
            indexmap::map::Entry::Vacant(vacant) => {
                vacant.insert(Entry { key, slot });
            }
        }
    }

    pub(crate) fn key_mode(&self) -> KeyMode {
        self.key_mode
    }

    pub(crate) fn entries(&self) -> &IndexMap<KeyToken, Entry> {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut IndexMap<KeyToken, Entry> {
        &mut self.entries
    }

    /// Iterate `(key, value)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, Value)> + '_ {
        self.entries
            .values()
            .map(|entry| (&entry.key, self.project_value(entry.slot.project())))
    }

    // ---- equivalence and stringification ----

    pub(crate) fn eqv(&self, other: &Hash) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().all(|(token, entry)| {
                other
                    .entries
                    .get(token)
                    .is_some_and(|o| match (&entry.slot, &o.slot) {
                        (Slot::Single(a), Slot::Single(b)) => a.eqv(b),
                        (Slot::Multi(a), Slot::Multi(b)) => {
                            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.eqv(y))
                        }
                        _ => false,
                    })
            })
    }

    /// String-context form: one `key\tvalue` line per entry, insertion order.
    pub(crate) fn to_string_value(&self) -> String {
        self.entries
            .values()
            .map(|entry| {
                format!(
                    "{}\t{}",
                    entry.key.to_string_value(),
                    entry.slot.project().to_string_value()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Human-oriented form: `{key => value, ...}` in insertion order.
    pub(crate) fn gist(&self) -> String {
        let inner = self
            .entries
            .values()
            .map(|entry| {
                format!(
                    "{} => {}",
                    entry.key.to_string_value(),
                    entry.slot.project().gist()
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("{{{}}}", inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as StdHashMap;

    #[test]
    fn absent_key_yields_default() {
        let hash = Hash::new();
        assert_eq!(hash.get(&Value::Str("missing".into())), Value::Nil);

        let hash = Hash::new().with_default(Value::Int(0));
        assert_eq!(hash.get(&Value::Str("missing".into())), Value::Int(0));
        assert_eq!(hash.default_value(), Value::Int(0));
    }

    #[test]
    fn declaration_accessors_reflect_configuration() {
        let hash = Hash::keyed_by("Int").of("Str").dynamic();
        assert_eq!(hash.key_type(), Some("Int"));
        assert_eq!(hash.value_type(), Some("Str"));
        assert!(hash.is_dynamic());
        assert!(!hash.is_readonly());
        assert!(!hash.is_object_hash());

        let obj = Hash::keyed_by_identity();
        assert!(obj.is_object_hash());
        assert_eq!(obj.key_type(), Some("Any"));
    }

    #[test]
    fn typed_key_rejection_leaves_container_unchanged() {
        let mut hash = Hash::keyed_by("Int");
        hash.set(Value::Int(1), Value::Str("one".into())).unwrap();

        let err = hash
            .set(Value::Str("two".into()), Value::Int(2))
            .unwrap_err();
        assert_eq!(err.code, RuntimeErrorCode::TypeMismatch);
        assert_eq!(hash.elems(), 1);
        assert_eq!(hash.get(&Value::Int(1)), Value::Str("one".into()));
    }

    #[test]
    fn typed_value_rejection_leaves_container_unchanged() {
        let mut hash = Hash::new().of("Int");
        hash.set(Value::Str("a".into()), Value::Int(1)).unwrap();

        let err = hash
            .set(Value::Str("b".into()), Value::Str("nope".into()))
            .unwrap_err();
        assert_eq!(err.code, RuntimeErrorCode::TypeMismatch);
        assert!(!hash.exists(&Value::Str("b".into())));
    }

    #[test]
    fn allomorph_values_satisfy_both_facet_types() {
        let mut ints = Hash::new().of("Int");
        let mut strs = Hash::new().of("Str");
        ints.set(Value::Str("a".into()), Value::allomorph(1, "one"))
            .unwrap();
        strs.set(Value::Str("a".into()), Value::allomorph(1, "one"))
            .unwrap();
    }

    #[test]
    fn object_hash_keys_do_not_collide_by_structure() {
        let mut hash = Hash::keyed_by_identity();
        let a = Value::make_instance("Point", StdHashMap::new());
        let b = Value::make_instance("Point", StdHashMap::new());
        assert_eq!(a, b); // structurally equal...

        hash.set(a.clone(), Value::Int(1)).unwrap();
        hash.set(b.clone(), Value::Int(2)).unwrap();
        // ...but they occupy distinct entries
        assert_eq!(hash.elems(), 2);
        assert_eq!(hash.get(&a), Value::Int(1));
        assert_eq!(hash.get(&b), Value::Int(2));
    }

    #[test]
    fn readonly_hash_rejects_mutation() {
        let mut hash = Hash::new();
        hash.set(Value::Str("a".into()), Value::Int(1)).unwrap();
        let mut frozen = hash.into_readonly();

        let err = frozen
            .set(Value::Str("b".into()), Value::Int(2))
            .unwrap_err();
        assert_eq!(err.code, RuntimeErrorCode::ReadonlyValue);
        let err = frozen.delete(&Value::Str("a".into())).unwrap_err();
        assert_eq!(err.code, RuntimeErrorCode::ReadonlyValue);
        // state is intact
        assert_eq!(frozen.elems(), 1);
        assert_eq!(frozen.get(&Value::Str("a".into())), Value::Int(1));
    }

    #[test]
    fn readonly_projection_freezes_nested_hashes() {
        let mut inner = Hash::new();
        inner.set(Value::Str("x".into()), Value::Int(1)).unwrap();
        let mut outer = Hash::new();
        outer
            .set(Value::Str("in".into()), Value::hash(inner))
            .unwrap();
        let frozen = outer.into_readonly();

        match frozen.get(&Value::Str("in".into())) {
            Value::Hash(nested) => assert!(nested.is_readonly()),
            other => panic!("expected nested hash, got {:?}", other),
        }
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut hash = Hash::new();
        for key in ["c", "a", "b"] {
            hash.set(Value::Str(key.into()), Value::Str(key.to_uppercase()))
                .unwrap();
        }
        let keys: Vec<String> = hash.iter().map(|(k, _)| k.to_string_value()).collect();
        assert_eq!(keys, ["c", "a", "b"]);
    }

    #[test]
    fn content_equality_ignores_entry_order() {
        let mut a = Hash::new();
        a.set(Value::Str("x".into()), Value::Int(1)).unwrap();
        a.set(Value::Str("y".into()), Value::Int(2)).unwrap();
        let mut b = Hash::new();
        b.set(Value::Str("y".into()), Value::Int(2)).unwrap();
        b.set(Value::Str("x".into()), Value::Int(1)).unwrap();
        assert_eq!(a, b);
    }
}
