// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Personal protective equipment catalog and expiry classification.

use crate::error::DomainError;
use crate::validation::require_non_blank;
use serde::{Deserialize, Serialize};
use time::{Date, Duration};

/// Days counted per month of catalog lifespan.
pub const DAYS_PER_LIFESPAN_MONTH: i64 = 30;

/// Window, in days, in which an assignment counts as expiring soon.
pub const EXPIRING_SOON_WINDOW_DAYS: i64 = 30;

/// Lifespan used when a catalog item does not specify one.
pub const DEFAULT_LIFESPAN_MONTHS: u16 = 12;

/// An entry in the PPE catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PpeCatalogItem {
    /// The persisted identifier. `None` before insertion.
    pub item_id: Option<i64>,
    /// Product name.
    pub name: String,
    /// Technical description.
    pub description: String,
    /// Certification standard (ANSI/ISO).
    pub certification: String,
    /// Useful life in months.
    pub lifespan_months: u16,
}

impl PpeCatalogItem {
    /// Validates and creates a new catalog item.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the name is blank (`MissingField`)
    /// - the lifespan is zero (`InvalidInput`)
    pub fn new(
        name: &str,
        description: &str,
        certification: &str,
        lifespan_months: u16,
    ) -> Result<Self, DomainError> {
        require_non_blank("name", name)?;
        if lifespan_months == 0 {
            return Err(DomainError::InvalidInput {
                field: "lifespan_months",
                message: String::from("lifespan must be at least 1 month"),
            });
        }

        Ok(Self {
            item_id: None,
            name: name.trim().to_string(),
            description: description.trim().to_string(),
            certification: certification.trim().to_string(),
            lifespan_months,
        })
    }
}

/// Expiry classification of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryTier {
    /// Past its expiry date.
    Expired,
    /// Expires within the next 30 days (today included).
    ExpiringSoon,
    /// Still valid beyond the warning window.
    Current,
}

impl ExpiryTier {
    /// Returns the display label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Expired => "Vencido",
            Self::ExpiringSoon => "Por Vencer (<30 días)",
            Self::Current => "Vigente",
        }
    }
}

impl std::fmt::Display for ExpiryTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Computes the expected expiry date of an item issued on `issue_date`.
///
/// Each month of lifespan counts as 30 days, so 12 months is 360 days.
///
/// # Errors
///
/// Returns `DomainError::DateArithmeticOverflow` if the result is not
/// representable.
pub fn expected_expiry(issue_date: Date, lifespan_months: u16) -> Result<Date, DomainError> {
    let days: i64 = i64::from(lifespan_months) * DAYS_PER_LIFESPAN_MONTH;
    issue_date
        .checked_add(Duration::days(days))
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: format!("adding {lifespan_months} months of lifespan to {issue_date}"),
        })
}

/// Classifies an expiry date relative to `today`.
#[must_use]
pub fn classify_expiry(expiry_date: Date, today: Date) -> ExpiryTier {
    if expiry_date < today {
        return ExpiryTier::Expired;
    }
    // A window end past the representable range means everything is inside it.
    let window_end: Option<Date> = today.checked_add(Duration::days(EXPIRING_SOON_WINDOW_DAYS));
    match window_end {
        Some(end) if expiry_date > end => ExpiryTier::Current,
        _ => ExpiryTier::ExpiringSoon,
    }
}

/// An item of PPE issued to a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PpeAssignment {
    /// The persisted identifier. `None` before insertion.
    pub assignment_id: Option<i64>,
    /// The catalog item.
    pub item_id: i64,
    /// The worker.
    pub worker_id: i64,
    /// Issue date.
    pub issue_date: Date,
    /// Expiry date.
    pub expiry_date: Date,
}

impl PpeAssignment {
    /// Classifies this assignment relative to `today`.
    #[must_use]
    pub fn tier(&self, today: Date) -> ExpiryTier {
        classify_expiry(self.expiry_date, today)
    }
}

/// Builds a new assignment of `item` to `worker_id`.
///
/// The expiry defaults to [`expected_expiry`]; an explicit override may be
/// supplied but cannot precede the issue date.
///
/// # Errors
///
/// Returns an error if:
/// - the catalog item has not been persisted (`InvalidInput`)
/// - the override precedes the issue date (`InvalidInput`)
/// - the default expiry overflows (`DateArithmeticOverflow`)
pub fn build_assignment(
    item: &PpeCatalogItem,
    worker_id: i64,
    issue_date: Date,
    expiry_override: Option<Date>,
) -> Result<PpeAssignment, DomainError> {
    let item_id: i64 = item.item_id.ok_or_else(|| DomainError::InvalidInput {
        field: "item_id",
        message: format!("catalog item '{}' has not been persisted", item.name),
    })?;

    let expiry_date: Date = match expiry_override {
        Some(expiry) if expiry < issue_date => {
            return Err(DomainError::InvalidInput {
                field: "expiry_date",
                message: format!("expiry {expiry} precedes issue date {issue_date}"),
            });
        }
        Some(expiry) => expiry,
        None => {
            let lifespan: u16 = if item.lifespan_months == 0 {
                DEFAULT_LIFESPAN_MONTHS
            } else {
                item.lifespan_months
            };
            expected_expiry(issue_date, lifespan)?
        }
    };

    Ok(PpeAssignment {
        assignment_id: None,
        item_id,
        worker_id,
        issue_date,
        expiry_date,
    })
}
