use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use num_bigint::BigInt as NumBigInt;
use num_traits::ToPrimitive;

use crate::allomorph::IntStr;
use crate::hash::Hash;

mod display;
mod error;
mod types;

pub use error::{RuntimeError, RuntimeErrorCode};
pub use types::compare_values;

static INSTANCE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_instance_id() -> u64 {
    INSTANCE_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    BigInt(NumBigInt),
    Num(f64),
    Str(String),
    Bool(bool),
    /// Allomorph: an integer and a string facet carried together.
    IntStr(Box<IntStr>),
    /// The bool flag distinguishes a mutable Array (`true`) from an
    /// immutable List (`false`).
    Array(Arc<Vec<Value>>, bool),
    Pair(String, Box<Value>),
    /// Pair with a non-string key (preserves the original key type for `.key`)
    ValuePair(Box<Value>, Box<Value>),
    Hash(Arc<Hash>),
    Instance {
        class_name: String,
        attributes: Arc<HashMap<String, Value>>,
        id: u64,
    },
    Regex(String),
    Nil,
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::BigInt(a), Value::Int(b)) | (Value::Int(b), Value::BigInt(a)) => {
                *a == NumBigInt::from(*b)
            }
            (Value::Num(a), Value::Num(b)) => (a.is_nan() && b.is_nan()) || a == b,
            (Value::Int(a), Value::Num(b)) => (*a as f64) == *b,
            (Value::Num(a), Value::Int(b)) => *a == (*b as f64),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            // Allomorphs compare structurally among themselves, numerically
            // against numbers and stringly against strings.
            (Value::IntStr(a), Value::IntStr(b)) => a == b,
            (Value::IntStr(a), Value::Int(b)) | (Value::Int(b), Value::IntStr(a)) => a.int() == *b,
            (Value::IntStr(a), Value::BigInt(b)) | (Value::BigInt(b), Value::IntStr(a)) => {
                NumBigInt::from(a.int()) == *b
            }
            (Value::IntStr(a), Value::Num(b)) | (Value::Num(b), Value::IntStr(a)) => {
                (a.int() as f64) == *b
            }
            (Value::IntStr(a), Value::Str(b)) | (Value::Str(b), Value::IntStr(a)) => a.str() == b,
            (Value::Array(a, ..), Value::Array(b, ..)) => a == b,
            (Value::Pair(ak, av), Value::Pair(bk, bv)) => ak == bk && av == bv,
            (Value::ValuePair(ak, av), Value::ValuePair(bk, bv)) => ak == bk && av == bv,
            (Value::Pair(ak, av), Value::ValuePair(bk, bv)) => {
                matches!(bk.as_ref(), Value::Str(s) if s == ak) && av == bv
            }
            (Value::ValuePair(ak, av), Value::Pair(bk, bv)) => {
                matches!(ak.as_ref(), Value::Str(s) if s == bk) && av == bv
            }
            (Value::Hash(a), Value::Hash(b)) => a == b,
            (
                Value::Instance {
                    class_name: a,
                    attributes: aa,
                    ..
                },
                Value::Instance {
                    class_name: b,
                    attributes: ba,
                    ..
                },
            ) => a == b && aa == ba,
            (Value::Regex(a), Value::Regex(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            _ => false,
        }
    }
}

impl Value {
    // ---- Arc-wrapping convenience constructors ----

    /// Create an immutable List value.
    pub fn list(items: Vec<Value>) -> Self {
        Value::Array(Arc::new(items), false)
    }

    /// Create a mutable Array value.
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Arc::new(items), true)
    }

    pub fn hash(hash: Hash) -> Self {
        Value::Hash(Arc::new(hash))
    }

    pub fn pair(key: impl Into<String>, value: Value) -> Self {
        Value::Pair(key.into(), Box::new(value))
    }

    pub fn value_pair(key: Value, value: Value) -> Self {
        Value::ValuePair(Box::new(key), Box::new(value))
    }

    pub fn allomorph(int_part: i64, string_part: impl Into<String>) -> Self {
        Value::IntStr(Box::new(IntStr::new(int_part, string_part)))
    }

    pub fn make_instance(class_name: impl Into<String>, attributes: HashMap<String, Value>) -> Self {
        Value::Instance {
            class_name: class_name.into(),
            attributes: Arc::new(attributes),
            id: next_instance_id(),
        }
    }

    /// The per-instance identity token, for identity-keyed containers.
    pub(crate) fn identity_id(&self) -> Option<u64> {
        match self {
            Value::Instance { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Create a Value from a BigInt, normalizing to Int(i64) when possible.
    pub fn from_bigint(n: NumBigInt) -> Value {
        if let Some(i) = n.to_i64() {
            Value::Int(i)
        } else {
            Value::BigInt(n)
        }
    }
}

// Compile-time assertion that Value is Send + Sync
const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Value>();
};
