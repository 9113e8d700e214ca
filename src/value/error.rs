#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorCode {
    LengthMismatch,
    TypeMismatch,
    StructuralConflict,
    ReadonlyValue,
}

impl std::fmt::Display for RuntimeErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RuntimeErrorCode::LengthMismatch => "LENGTH_MISMATCH",
            RuntimeErrorCode::TypeMismatch => "TYPE_MISMATCH",
            RuntimeErrorCode::StructuralConflict => "STRUCTURAL_CONFLICT",
            RuntimeErrorCode::ReadonlyValue => "READONLY_VALUE",
        };
        write!(f, "{}", name)
    }
}

impl RuntimeErrorCode {
    /// Codes raised while consuming an assignment or merge item list,
    /// as opposed to classification or mutability failures.
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            RuntimeErrorCode::LengthMismatch | RuntimeErrorCode::TypeMismatch
        )
    }
}

#[derive(Debug)]
pub struct RuntimeError {
    pub message: String,
    pub code: RuntimeErrorCode,
    pub hint: Option<String>,
}

impl RuntimeError {
    pub(crate) fn new(code: RuntimeErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            hint: None,
        }
    }

    pub(crate) fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

impl std::error::Error for RuntimeError {}

#[cfg(test)]
mod tests {
    use super::RuntimeErrorCode;

    #[test]
    fn runtime_error_code_display_names_are_stable() {
        assert_eq!(
            RuntimeErrorCode::LengthMismatch.to_string(),
            "LENGTH_MISMATCH"
        );
        assert_eq!(RuntimeErrorCode::TypeMismatch.to_string(), "TYPE_MISMATCH");
        assert_eq!(
            RuntimeErrorCode::StructuralConflict.to_string(),
            "STRUCTURAL_CONFLICT"
        );
        assert_eq!(RuntimeErrorCode::ReadonlyValue.to_string(), "READONLY_VALUE");
    }

    #[test]
    fn runtime_error_code_assignment_classification() {
        assert!(RuntimeErrorCode::LengthMismatch.is_assignment());
        assert!(RuntimeErrorCode::TypeMismatch.is_assignment());
        assert!(!RuntimeErrorCode::StructuralConflict.is_assignment());
        assert!(!RuntimeErrorCode::ReadonlyValue.is_assignment());
    }
}
