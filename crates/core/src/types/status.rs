//! Approval lifecycle, student levels and account types.
//!
//! The remote API is inconsistent about approval: older entity versions
//! expose a boolean `isApproved`, newer ones a `PENDING`/`APPROVED`/`REJECTED`
//! enum. Everything in this crate works with the single tri-state
//! [`ApprovalStatus`]; its deserializer absorbs every wire form.

use core::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Approval state of a care business, care home, student or guarantor.
///
/// Transitions are `Pending -> Approved` and `Pending -> Rejected`; both
/// targets are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// An operator decision on a pending record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Approve,
    Reject,
}

/// Error returned when a decision is applied to a resolved record.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot {decision} a record that is already {from}")]
pub struct TransitionError {
    /// Status the record was in.
    pub from: ApprovalStatus,
    /// The decision that was refused.
    pub decision: Decision,
}

impl ApprovalStatus {
    /// Apply an operator decision.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] unless the status is `Pending`.
    pub const fn decide(self, decision: Decision) -> Result<Self, TransitionError> {
        match (self, decision) {
            (Self::Pending, Decision::Approve) => Ok(Self::Approved),
            (Self::Pending, Decision::Reject) => Ok(Self::Rejected),
            (from, decision) => Err(TransitionError { from, decision }),
        }
    }

    /// Whether approve/reject controls should be offered.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Wire value (`PENDING`, `APPROVED`, `REJECTED`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Human label for badges.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    /// CSS modifier used by status badges.
    #[must_use]
    pub const fn badge_class(self) -> &'static str {
        match self {
            Self::Pending => "badge-pending",
            Self::Approved => "badge-approved",
            Self::Rejected => "badge-rejected",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approve => f.write_str("approve"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" | "FALSE" | "" => Ok(Self::Pending),
            "APPROVED" | "TRUE" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            _ => Err(format!("invalid approval status: {s}")),
        }
    }
}

impl From<bool> for ApprovalStatus {
    fn from(approved: bool) -> Self {
        if approved {
            Self::Approved
        } else {
            Self::Pending
        }
    }
}

struct ApprovalStatusVisitor;

impl<'de> Visitor<'de> for ApprovalStatusVisitor {
    type Value = ApprovalStatus;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an approval status string, a boolean or null")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(ApprovalStatus::from(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(ApprovalStatus::Pending)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(ApprovalStatus::Pending)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(Self)
    }
}

impl<'de> Deserialize<'de> for ApprovalStatus {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        d.deserialize_any(ApprovalStatusVisitor)
    }
}

/// Seniority assigned to a student when they are approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Level {
    #[serde(alias = "junior", alias = "Junior")]
    Junior,
    #[serde(alias = "intermediate", alias = "Intermediate")]
    Intermediate,
    #[serde(alias = "senior", alias = "Senior")]
    Senior,
}

impl Level {
    /// All levels in ascending seniority, for select controls.
    pub const ALL: [Self; 3] = [Self::Junior, Self::Intermediate, Self::Senior];

    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Junior => "JUNIOR",
            Self::Intermediate => "INTERMEDIATE",
            Self::Senior => "SENIOR",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Junior => "Junior",
            Self::Intermediate => "Intermediate",
            Self::Senior => "Senior",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "JUNIOR" => Ok(Self::Junior),
            "INTERMEDIATE" => Ok(Self::Intermediate),
            "SENIOR" => Ok(Self::Senior),
            _ => Err(format!("invalid level: {s}")),
        }
    }
}

/// Account discriminator on users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    #[serde(alias = "family", alias = "Family")]
    Family,
    #[serde(alias = "provider", alias = "Provider")]
    Provider,
    #[serde(alias = "student", alias = "Student")]
    Student,
    #[serde(alias = "admin", alias = "Admin")]
    Admin,
}

impl AccountType {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Family => "Family",
            Self::Provider => "Provider",
            Self::Student => "Student",
            Self::Admin => "Admin",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
