use super::*;

/// Format a Num in scientific notation (e.g. `1e+40`, `-1e-05`).
fn format_num_scientific(f: f64) -> String {
    // Rust's {:e} produces e.g. "1e40" or "1e-5"; normalize to "1e+40" / "1e-05"
    let s = format!("{:e}", f);
    if let Some(pos) = s.rfind('e') {
        let (mantissa, exp_part) = s.split_at(pos + 1);
        let exp_with_sign = if let Some(stripped) = exp_part.strip_prefix('-') {
            format!("-{:02}", stripped.parse::<i32>().unwrap_or(0).abs())
        } else {
            format!("+{}", exp_part)
        };
        format!("{}{}", mantissa, exp_with_sign)
    } else {
        s
    }
}

impl Value {
    /// The string-context form of a value. Allomorphs yield their string
    /// facet here; numeric contexts go through `to_f64`/`to_bigint` instead.
    pub fn to_string_value(&self) -> String {
        match self {
            Value::Int(i) => i.to_string(),
            Value::BigInt(n) => n.to_string(),
            Value::Num(f) => {
                if f.is_nan() {
                    "NaN".to_string()
                } else if f.is_infinite() {
                    if *f > 0.0 {
                        "Inf".to_string()
                    } else {
                        "-Inf".to_string()
                    }
                } else if *f == 0.0 && f.is_sign_negative() {
                    "-0".to_string()
                } else if f.fract() == 0.0 && f.is_finite() {
                    let abs = f.abs();
                    if abs >= 1e15 || (abs != 0.0 && abs < 1e-4) {
                        format_num_scientific(*f)
                    } else {
                        format!("{}", *f as i64)
                    }
                } else {
                    format!("{}", f)
                }
            }
            Value::Str(s) => s.clone(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::IntStr(allomorph) => allomorph.str().to_string(),
            Value::Array(items, ..) => items
                .iter()
                .map(|v| v.to_string_value())
                .collect::<Vec<_>>()
                .join(" "),
            Value::Pair(k, v) => format!("{}\t{}", k, v.to_string_value()),
            Value::ValuePair(k, v) => {
                format!("{}\t{}", k.to_string_value(), v.to_string_value())
            }
            Value::Hash(hash) => hash.to_string_value(),
            Value::Instance { class_name, id, .. } => format!("{}<{}>", class_name, id),
            Value::Regex(src) => src.clone(),
            Value::Nil => String::new(),
        }
    }

    /// Human-oriented form: arrays bracketed, pairs arrowed, hashes braced.
    pub fn gist(&self) -> String {
        match self {
            Value::Array(items, ..) => format!(
                "[{}]",
                items.iter().map(|v| v.gist()).collect::<Vec<_>>().join(" ")
            ),
            Value::Pair(k, v) => format!("{} => {}", k, v.gist()),
            Value::ValuePair(k, v) => format!("{} => {}", k.gist(), v.gist()),
            Value::Hash(hash) => hash.gist(),
            Value::Nil => "Nil".to_string(),
            _ => self.to_string_value(),
        }
    }
}
