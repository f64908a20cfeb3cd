//! Successful results with accumulated warnings
//!
//! An [`Outcome`] is the success half of every engine result. Warnings are
//! collected while a pass runs and returned alongside the value; a cancelled
//! pass is still a success, flagged by [`Outcome::cancelled`].

/// Non-fatal condition reported alongside a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Stable numeric code
    pub code: i32,
    pub message: String,
}

impl Warning {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Value produced by a pass, plus warnings and the cancellation flag
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
    /// `true` if the pass stopped early; `value` then holds partial results
    pub cancelled: bool,
}

impl<T> Outcome<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
            cancelled: false,
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<Warning>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_cancelled(mut self, cancelled: bool) -> Self {
        self.cancelled = cancelled;
        self
    }

    /// Replace the value, keeping warnings and the cancellation flag
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            warnings: self.warnings,
            cancelled: self.cancelled,
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Record a warning and mirror it to the log
pub fn push_warning(warnings: &mut Vec<Warning>, warning: Warning) {
    tracing::warn!(code = warning.code, "{}", warning.message);
    warnings.push(warning);
}
