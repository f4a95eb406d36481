//! Identifier and validated scalar types for the learning-cycle domain.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Declares a UUID-backed identifier newtype.
macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_identifier!(
    /// Unique identifier for a task record.
    TaskId
);

uuid_identifier!(
    /// Identifier of a user (coordinator or learner) owned by the host application.
    UserId
);

uuid_identifier!(
    /// Identifier of the time-boxed test period a task belongs to.
    TestPeriodId
);

uuid_identifier!(
    /// Identifier of a grade whose members receive distributed tasks.
    GradeId
);

uuid_identifier!(
    /// Unique identifier for a recorded mistake.
    MistakeId
);

uuid_identifier!(
    /// Unique identifier for a parent-to-review relationship edge.
    RelationshipId
);

/// Learning cycle number, starting at one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CycleNumber(u8);

impl CycleNumber {
    /// Initial pass through the material.
    pub const INITIAL: Self = Self(1);
    /// Mistake review pass.
    pub const REVIEW: Self = Self(2);
    /// Finalization (mastery check) pass.
    pub const FINAL: Self = Self(3);

    /// Creates a validated cycle number.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidCycleNumber`] when the value is zero.
    pub const fn new(value: u8) -> Result<Self, TaskDomainError> {
        if value == 0 {
            return Err(TaskDomainError::InvalidCycleNumber(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for CycleNumber {
    type Error = TaskDomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CycleNumber> for u8 {
    fn from(value: CycleNumber) -> Self {
        value.0
    }
}

impl fmt::Display for CycleNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive range of numbered units (for example pages 12 to 15).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitRange {
    start: u32,
    end: u32,
}

impl UnitRange {
    /// Creates a validated inclusive unit range.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidUnitRange`] when `end` precedes
    /// `start`.
    pub const fn new(start: u32, end: u32) -> Result<Self, TaskDomainError> {
        if end < start {
            return Err(TaskDomainError::InvalidUnitRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a range covering a single unit.
    #[must_use]
    pub const fn single(unit: u32) -> Self {
        Self {
            start: unit,
            end: unit,
        }
    }

    /// Returns the first unit in the range.
    #[must_use]
    pub const fn start(self) -> u32 {
        self.start
    }

    /// Returns the last unit in the range.
    #[must_use]
    pub const fn end(self) -> u32 {
        self.end
    }

    /// Returns the number of units covered, both endpoints included.
    #[must_use]
    pub const fn len(self) -> u64 {
        (self.end as u64) - (self.start as u64) + 1
    }

    /// Always `false`: a valid range covers at least one unit.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        false
    }
}

impl fmt::Display for UnitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}
