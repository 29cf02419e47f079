//! Retirement-planning Monte Carlo decision engine.
//!
//! Given a plan (age, horizon, filing status, state-tax regime, accounts,
//! income sources, and expenses) and a run configuration, [`simulation::simulate`]
//! produces a probability that the portfolio survives the planning horizon
//! together with year-by-year percentile series suitable for charting.
//!
//! The kernel is layered, leaves first:
//! - [`historical_returns`] — bear/bull-conditioned block-bootstrap sampling
//!   over a bundled monthly equity-return series.
//! - [`taxes`] — federal ordinary/LTCG tax, state tax, Social-Security
//!   taxable-fraction, all pure functions over [`model::TaxTables`].
//! - [`model::RmdTable`] — required-minimum-distribution lookup.
//! - [`withdrawal`] — the tax-efficient account-draining sequencer.
//! - [`year_engine`] — composes the above into one year's state transition.
//! - [`run_engine`] — drives the year engine across a full horizon.
//! - [`aggregator`] — folds a batch of runs into percentiles and
//!   representative-run detail.
//!
//! # Builder DSL
//!
//! ```ignore
//! use retirement_core::config::PlanBuilder;
//!
//! let plan = PlanBuilder::new(65, 30)
//!     .married_jointly()
//!     .flat_state_tax(0.05)
//!     .taxable_stocks("Brokerage", 600_000.0, 0.7)
//!     .traditional("401k", 400_000.0, 0.03)
//!     .social_security("SS", 28_000.0, 67, 95)
//!     .expense("Living", 60_000.0, 65, 95, 0.025)
//!     .build();
//! ```

#![warn(clippy::all)]

pub mod aggregator;
pub mod config;
pub mod error;
pub mod historical_returns;
pub mod model;
pub mod run_engine;
pub mod simulation;
pub mod taxes;
pub mod withdrawal;
pub mod year_engine;

pub use config::PlanBuilder;
pub use error::{EngineError, Result};
pub use model::{AggregateResult, Plan, RunConfig};
pub use simulation::{SimulationProgress, simulate, simulate_with_progress, simulate_with_resources};
