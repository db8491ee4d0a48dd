use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Every sorted-iterator contract violation, storage-scan failure and
/// configuration rejection is raised as one of these.
///

#[derive(Clone, Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct an ordering violation: a forward target or a produced value
    /// regressed past the monotonic stream position.
    pub(crate) fn ordering_violation(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::OrderingViolation, origin, message.into())
    }

    /// Construct an undefined-transition error for a sorted combinator.
    pub(crate) fn sorted_illegal_state(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::IllegalState, ErrorOrigin::Sorted, message.into())
    }

    /// Construct an undefined-transition error raised by a storage scan.
    pub(crate) fn storage_illegal_state(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::IllegalState, ErrorOrigin::Storage, message.into())
    }

    /// Construct the exhaustion error for `next`/`peek` on an empty iterator.
    pub(crate) fn no_such_element(origin: ErrorOrigin) -> Self {
        Self::new(
            ErrorClass::NoSuchElement,
            origin,
            format!("{origin} iterator has no further elements"),
        )
    }

    /// Construct a storage-origin resource-closed error.
    pub(crate) fn storage_closed(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::ResourceClosed,
            ErrorOrigin::Storage,
            message.into(),
        )
    }

    /// Construct a configuration rejection.
    pub(crate) fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvalidConfig, ErrorOrigin::Config, message.into())
    }

    #[must_use]
    pub const fn is_ordering_violation(&self) -> bool {
        matches!(self.class, ErrorClass::OrderingViolation)
    }

    #[must_use]
    pub const fn is_illegal_state(&self) -> bool {
        matches!(self.class, ErrorClass::IllegalState)
    }

    #[must_use]
    pub const fn is_no_such_element(&self) -> bool {
        matches!(self.class, ErrorClass::NoSuchElement)
    }

    #[must_use]
    pub const fn is_resource_closed(&self) -> bool {
        matches!(self.class, ErrorClass::ResourceClosed)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    OrderingViolation,
    IllegalState,
    NoSuchElement,
    ResourceClosed,
    InvalidConfig,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::OrderingViolation => "ordering_violation",
            Self::IllegalState => "illegal_state",
            Self::NoSuchElement => "no_such_element",
            Self::ResourceClosed => "resource_closed",
            Self::InvalidConfig => "invalid_config",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Sorted,
    Storage,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Sorted => "sorted",
            Self::Storage => "storage",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}
