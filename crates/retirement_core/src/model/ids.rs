//! Unique identifiers for plan entities
//!
//! Each entity type has its own ID type to provide type safety and prevent
//! mixing up accounts, income sources, and expenses when indexing traces.

use serde::{Deserialize, Serialize};

/// Stable identifier for an account within a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub u16);

/// Stable identifier for an income source within a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IncomeId(pub u16);

/// Stable identifier for an expense within a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExpenseId(pub u16);
