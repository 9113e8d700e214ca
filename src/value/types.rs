use std::cmp::Ordering;

use super::*;

impl Value {
    /// Identity comparison (`===`). Unlike PartialEq this never allows
    /// cross-kind matches: an allomorph is not identical to a plain Int or
    /// Str of equal value, and aggregates compare by reference.
    pub fn strict_identical(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Num(a), Value::Num(b)) => a.to_bits() == b.to_bits(),
            (Value::IntStr(a), Value::IntStr(b)) => a == b,
            (Value::Int(_) | Value::BigInt(_), Value::Int(_) | Value::BigInt(_)) => self == other,
            (Value::Str(_), Value::Str(_))
            | (Value::Bool(_), Value::Bool(_))
            | (Value::Regex(_), Value::Regex(_))
            | (Value::Nil, Value::Nil) => self == other,
            (Value::Instance { id: a, .. }, Value::Instance { id: b, .. }) => a == b,
            (Value::Array(a, _), Value::Array(b, _)) => Arc::ptr_eq(a, b),
            (Value::Hash(a), Value::Hash(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Type-strict structural equivalence (`eqv`).
    ///
    /// Returns true if two values are from the same kind and (recursively)
    /// contain equivalent values. Unlike PartialEq (used for `==`), this does
    /// NOT allow cross-kind comparisons: an IntStr is never eqv to the plain
    /// Int or Str it coerces to.
    pub fn eqv(&self, other: &Self) -> bool {
        match (self, other) {
            // Arrays/Lists: must be the same container kind and recursively eqv
            (Value::Array(a, a_mut), Value::Array(b, b_mut)) => {
                a_mut == b_mut
                    && a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(x, y)| x.eqv(y))
            }
            (Value::Hash(a), Value::Hash(b)) => a.eqv(b),
            (Value::Pair(ak, av), Value::Pair(bk, bv)) => ak == bk && av.eqv(bv),
            (Value::ValuePair(ak, av), Value::ValuePair(bk, bv)) => ak.eqv(bk) && av.eqv(bv),
            (Value::Pair(ak, av), Value::ValuePair(bk, bv)) => {
                matches!(bk.as_ref(), Value::Str(s) if s == ak) && av.eqv(bv)
            }
            (Value::ValuePair(ak, av), Value::Pair(bk, bv)) => {
                matches!(ak.as_ref(), Value::Str(s) if s == bk) && av.eqv(bv)
            }
            // Num: bit-exact comparison to distinguish signed zeros
            (Value::Num(a), Value::Num(b)) => a.to_bits() == b.to_bits(),
            // Allomorphs: both facets must match
            (Value::IntStr(a), Value::IntStr(b)) => a == b,
            // Same-kind scalar comparisons delegate to PartialEq
            (Value::Int(_), Value::Int(_))
            | (Value::BigInt(_), Value::BigInt(_))
            | (Value::Int(_), Value::BigInt(_))
            | (Value::BigInt(_), Value::Int(_))
            | (Value::Str(_), Value::Str(_))
            | (Value::Bool(_), Value::Bool(_))
            | (Value::Regex(_), Value::Regex(_))
            | (Value::Instance { .. }, Value::Instance { .. })
            | (Value::Nil, Value::Nil) => self == other,
            // Cross-kind comparisons always return false for eqv
            _ => false,
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::BigInt(n) => !num_traits::Zero::is_zero(n),
            Value::Num(f) => *f != 0.0 || f.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::IntStr(allomorph) => allomorph.int() != 0,
            Value::Array(items, ..) => !items.is_empty(),
            Value::Pair(_, _) | Value::ValuePair(_, _) => true,
            Value::Hash(hash) => !hash.is_empty(),
            Value::Instance { .. } => true,
            Value::Regex(_) => true,
            Value::Nil => false,
        }
    }

    /// Check if this value is a numeric kind. Allomorphs count: their
    /// integer facet participates in arithmetic and numeric comparison.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Int(_) | Value::BigInt(_) | Value::Num(_) | Value::IntStr(_)
        )
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) | Value::BigInt(_) => "Int",
            Value::Num(_) => "Num",
            Value::Str(_) => "Str",
            Value::Bool(_) => "Bool",
            Value::IntStr(_) => "IntStr",
            Value::Array(_, true) => "Array",
            Value::Array(_, false) => "List",
            Value::Pair(_, _) | Value::ValuePair(_, _) => "Pair",
            Value::Hash(_) => "Hash",
            Value::Instance { .. } => "Instance",
            Value::Regex(_) => "Regex",
            Value::Nil => "Nil",
        }
    }

    /// Check this value against a type name, walking the built-in hierarchy.
    /// Used by typed-key and typed-value containers at insertion time.
    pub fn isa_check(&self, type_name: &str) -> bool {
        if let Value::Instance { class_name, .. } = self
            && class_name == type_name
        {
            return true;
        }
        if self.type_name() == type_name {
            return true;
        }
        match type_name {
            "Any" | "Mu" => true,
            // Allomorphs satisfy both of their facet types; Bool is an Int
            "Int" => matches!(self, Value::Bool(_) | Value::IntStr(_)),
            "Str" | "Stringy" => matches!(self, Value::Str(_) | Value::IntStr(_)),
            "Numeric" => self.is_numeric(),
            "Cool" => matches!(
                self,
                Value::Int(_)
                    | Value::BigInt(_)
                    | Value::Num(_)
                    | Value::Str(_)
                    | Value::Bool(_)
                    | Value::IntStr(_)
                    | Value::Array(..)
                    | Value::Hash(_)
            ),
            "Positional" => matches!(self, Value::Array(..)),
            "Associative" | "Map" => matches!(self, Value::Hash(_) | Value::Pair(_, _) | Value::ValuePair(_, _)),
            _ => false,
        }
    }

    /// Convert a numeric-context value to f64. Allomorphs yield their
    /// integer facet.
    pub fn to_f64(&self) -> f64 {
        match self {
            Value::Int(i) => *i as f64,
            Value::BigInt(n) => n.to_f64().unwrap_or(0.0),
            Value::Num(f) => *f,
            Value::IntStr(allomorph) => allomorph.int() as f64,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Str(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Convert a numeric-context value to an i64 index or count.
    pub fn to_int(&self) -> i64 {
        match self {
            Value::Int(i) => *i,
            Value::BigInt(n) => n.to_i64().unwrap_or(if n.sign() == num_bigint::Sign::Minus {
                i64::MIN
            } else {
                i64::MAX
            }),
            Value::Num(f) => *f as i64,
            Value::IntStr(allomorph) => allomorph.int(),
            Value::Bool(b) => *b as i64,
            Value::Str(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    /// Convert to a BigInt for arbitrary-precision comparison.
    pub fn to_bigint(&self) -> NumBigInt {
        match self {
            Value::Int(i) => NumBigInt::from(*i),
            Value::BigInt(n) => n.clone(),
            Value::Num(f) => NumBigInt::from(*f as i64),
            Value::IntStr(allomorph) => NumBigInt::from(allomorph.int()),
            Value::Str(s) => s
                .parse::<NumBigInt>()
                .unwrap_or_else(|_| NumBigInt::from(0)),
            _ => NumBigInt::from(0),
        }
    }

    /// Smart-match acceptance with this value as the pattern. Numeric
    /// patterns test numeric equality, strings test string equality, regex
    /// patterns match the topic's string form, allomorphs follow their
    /// facet rule, and anything else falls back to `eqv`.
    pub fn accepts(&self, topic: &Value) -> bool {
        match self {
            Value::Regex(src) => regex::Regex::new(src)
                .map(|re| re.is_match(&topic.to_string_value()))
                .unwrap_or(false),
            Value::IntStr(allomorph) => allomorph.accepts(topic),
            Value::Str(s) => *s == topic.to_string_value(),
            pattern if pattern.is_numeric() => {
                topic.is_numeric() && compare_values(pattern, topic) == Ordering::Equal
            }
            _ => self.eqv(topic),
        }
    }
}

/// Three-way comparison (`cmp`). Numeric kinds compare numerically; two
/// allomorphs compare by integer facet first with the string facet as the
/// tie-break; everything else falls back to string-form comparison.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::IntStr(x), Value::IntStr(y)) => x.cmp(y),
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::BigInt(_), _) | (_, Value::BigInt(_))
            if a.is_numeric() && b.is_numeric() && !matches!(a, Value::Num(_)) && !matches!(b, Value::Num(_)) =>
        {
            a.to_bigint().cmp(&b.to_bigint())
        }
        (x, y) if x.is_numeric() && y.is_numeric() => x
            .to_f64()
            .partial_cmp(&y.to_f64())
            .unwrap_or(Ordering::Equal),
        (Value::Str(x), Value::Str(y)) => x.cmp(y),
        _ => a.to_string_value().cmp(&b.to_string_value()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allomorph_equals_int_and_str_but_not_eqv() {
        let al = Value::allomorph(42, "42");
        assert_eq!(al, Value::Int(42));
        assert_eq!(al, Value::Str("42".to_string()));
        assert!(!al.eqv(&Value::Int(42)));
        assert!(!al.eqv(&Value::Str("42".to_string())));
        assert!(!al.strict_identical(&Value::Int(42)));
        assert!(al.eqv(&Value::allomorph(42, "42")));
    }

    #[test]
    fn compare_values_is_numeric_first() {
        assert_eq!(
            compare_values(&Value::Int(2), &Value::Int(10)),
            Ordering::Less
        );
        // string comparison would say "10" < "2"
        assert_eq!(
            compare_values(&Value::Str("10".into()), &Value::Str("2".into())),
            Ordering::Less
        );
    }

    #[test]
    fn isa_check_covers_allomorph_facets() {
        let al = Value::allomorph(1, "one");
        assert!(al.isa_check("IntStr"));
        assert!(al.isa_check("Int"));
        assert!(al.isa_check("Str"));
        assert!(al.isa_check("Numeric"));
        assert!(al.isa_check("Any"));
        assert!(!al.isa_check("Hash"));
    }

    #[test]
    fn regex_pattern_accepts_string_forms() {
        let pattern = Value::Regex("^ab+c$".to_string());
        assert!(pattern.accepts(&Value::Str("abbbc".to_string())));
        assert!(!pattern.accepts(&Value::Str("ac".to_string())));
    }

    #[test]
    fn instances_compare_by_identity() {
        let a = Value::make_instance("Point", HashMap::new());
        let b = Value::make_instance("Point", HashMap::new());
        // structurally equal, distinct identity
        assert_eq!(a, b);
        assert!(!a.strict_identical(&b));
        assert!(a.strict_identical(&a.clone()));
    }
}
