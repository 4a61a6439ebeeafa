//! Error taxonomy shared by every validating operation in the core.
//!
//! Every failure is returned synchronously to the immediate caller. A failed
//! mutating call leaves its aggregate exactly as it was before the call.

/// Discriminant of a [`SimError`], for callers that only care about the kind
/// of failure and not its context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    DuplicateKey,
    NotFound,
    InsufficientFunds,
    InsufficientStock,
    CapacityExceeded,
    InvalidState,
    StepLimitReached,
}

/// Errors raised by the simulation state engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// Malformed input: negative quantity, unknown tag, unknown graph node.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An insert targeted an identity that is already present.
    #[error("{entity} '{key}' already exists")]
    DuplicateKey { entity: &'static str, key: String },

    /// A lookup or update targeted an identity that is absent.
    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    /// Capital is below the cost of the requested operation.
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    /// A warehouse holds less of a material than requested.
    #[error("insufficient stock of '{material}': requested {requested}, available {available}")]
    InsufficientStock {
        material: String,
        requested: u64,
        available: u64,
    },

    /// Adding to a warehouse would push its total load above capacity.
    #[error("warehouse capacity exceeded: load {load} + {requested} > capacity {capacity}")]
    CapacityExceeded {
        requested: u64,
        load: u64,
        capacity: u64,
    },

    /// The aggregate lacks state the operation requires.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The step ceiling has been reached.
    #[error("step limit of {limit} reached")]
    StepLimitReached { limit: u32 },
}

impl SimError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SimError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            SimError::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            SimError::NotFound { .. } => ErrorKind::NotFound,
            SimError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            SimError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            SimError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            SimError::InvalidState(_) => ErrorKind::InvalidState,
            SimError::StepLimitReached { .. } => ErrorKind::StepLimitReached,
        }
    }

    pub(crate) fn not_found(entity: &'static str, key: impl ToString) -> Self {
        SimError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub(crate) fn duplicate(entity: &'static str, key: impl ToString) -> Self {
        SimError::DuplicateKey {
            entity,
            key: key.to_string(),
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;

/// Reject negative input, converting the accepted value to `u64`.
pub(crate) fn non_negative(value: i64, what: &str) -> SimResult<u64> {
    u64::try_from(value)
        .map_err(|_| SimError::InvalidArgument(format!("{what} must be >= 0, got {value}")))
}

/// Reject negative input or input too large for a day counter.
pub(crate) fn day_count(value: i64, what: &str) -> SimResult<u32> {
    if value < 0 {
        return Err(SimError::InvalidArgument(format!(
            "{what} must be >= 0, got {value}"
        )));
    }
    u32::try_from(value)
        .map_err(|_| SimError::InvalidArgument(format!("{what} is out of range: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(
            SimError::InvalidArgument("x".into()).kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            SimError::not_found("supplier", "s1").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            SimError::duplicate("tender", "t1").kind(),
            ErrorKind::DuplicateKey
        );
        assert_eq!(
            SimError::StepLimitReached { limit: 4 }.kind(),
            ErrorKind::StepLimitReached
        );
    }

    #[test]
    fn messages_carry_context() {
        let err = SimError::InsufficientFunds {
            required: 500,
            available: 100,
        };
        assert_eq!(
            err.to_string(),
            "insufficient funds: required 500, available 100"
        );
        assert_eq!(
            SimError::not_found("workplace", "wp9").to_string(),
            "workplace 'wp9' not found"
        );
    }

    #[test]
    fn non_negative_rejects_negative() {
        assert_eq!(non_negative(5, "qty").unwrap(), 5);
        assert_eq!(
            non_negative(-1, "qty").unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn day_count_rejects_out_of_range() {
        assert_eq!(day_count(7, "days").unwrap(), 7);
        assert!(day_count(-3, "days").is_err());
        assert!(day_count(i64::MAX, "days").is_err());
    }
}
