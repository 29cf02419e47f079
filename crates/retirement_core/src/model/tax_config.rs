//! Tax-bracket tables and the other IRS/state constants the tax module reads.
//! Kept as plain data so an annual bracket update touches only this module,
//! never the calculation logic in `taxes.rs` (§4.2).

use serde::{Deserialize, Serialize};

use super::plan::FilingStatus;

/// One piecewise-linear bracket: tax `rate` applies to the slice of income
/// above `threshold` and below the next bracket's threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TaxBracket {
    pub threshold: f64,
    pub rate: f64,
}

/// Threshold at which a long-term capital-gains rate starts applying, used by
/// the stacking rule in §4.2.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LtcgBracket {
    pub threshold: f64,
    pub rate: f64,
}

/// The two-threshold IRS rule for Social-Security taxability (§4.2).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SocialSecurityThresholds {
    pub first_threshold: f64,
    pub second_threshold: f64,
}

/// All bracket tables and filing-status-dependent constants the tax module
/// needs, by filing status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxTables {
    pub federal_brackets: FilingStatusTable<Vec<TaxBracket>>,
    pub standard_deduction: FilingStatusTable<f64>,
    pub ltcg_brackets: FilingStatusTable<Vec<LtcgBracket>>,
    pub california_brackets: FilingStatusTable<Vec<TaxBracket>>,
    pub social_security_thresholds: FilingStatusTable<SocialSecurityThresholds>,
}

/// A value that differs by filing status — single vs married-filing-jointly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingStatusTable<T> {
    pub single: T,
    pub married_jointly: T,
}

impl<T> FilingStatusTable<T> {
    pub fn get(&self, status: FilingStatus) -> &T {
        match status {
            FilingStatus::Single => &self.single,
            FilingStatus::MarriedJointly => &self.married_jointly,
        }
    }
}

impl TaxTables {
    /// Representative 2024-ish bracket tables. Not legal or tax advice; the
    /// point of the `FilingStatusTable` indirection is that this is the only
    /// place such numbers live.
    #[must_use]
    pub fn reference_2024() -> Self {
        let single_federal = vec![
            TaxBracket { threshold: 0.0, rate: 0.10 },
            TaxBracket { threshold: 11_600.0, rate: 0.12 },
            TaxBracket { threshold: 47_150.0, rate: 0.22 },
            TaxBracket { threshold: 100_525.0, rate: 0.24 },
            TaxBracket { threshold: 191_950.0, rate: 0.32 },
            TaxBracket { threshold: 243_725.0, rate: 0.35 },
            TaxBracket { threshold: 609_350.0, rate: 0.37 },
        ];
        let mfj_federal = vec![
            TaxBracket { threshold: 0.0, rate: 0.10 },
            TaxBracket { threshold: 23_200.0, rate: 0.12 },
            TaxBracket { threshold: 94_300.0, rate: 0.22 },
            TaxBracket { threshold: 201_050.0, rate: 0.24 },
            TaxBracket { threshold: 383_900.0, rate: 0.32 },
            TaxBracket { threshold: 487_450.0, rate: 0.35 },
            TaxBracket { threshold: 731_200.0, rate: 0.37 },
        ];

        let single_ltcg = vec![
            LtcgBracket { threshold: 0.0, rate: 0.0 },
            LtcgBracket { threshold: 47_025.0, rate: 0.15 },
            LtcgBracket { threshold: 518_900.0, rate: 0.20 },
        ];
        let mfj_ltcg = vec![
            LtcgBracket { threshold: 0.0, rate: 0.0 },
            LtcgBracket { threshold: 94_050.0, rate: 0.15 },
            LtcgBracket { threshold: 583_750.0, rate: 0.20 },
        ];

        let single_ca = vec![
            TaxBracket { threshold: 0.0, rate: 0.01 },
            TaxBracket { threshold: 10_412.0, rate: 0.02 },
            TaxBracket { threshold: 24_684.0, rate: 0.04 },
            TaxBracket { threshold: 38_959.0, rate: 0.06 },
            TaxBracket { threshold: 54_081.0, rate: 0.08 },
            TaxBracket { threshold: 68_350.0, rate: 0.093 },
            TaxBracket { threshold: 349_137.0, rate: 0.103 },
            TaxBracket { threshold: 418_961.0, rate: 0.113 },
            TaxBracket { threshold: 698_271.0, rate: 0.123 },
        ];
        let mfj_ca = vec![
            TaxBracket { threshold: 0.0, rate: 0.01 },
            TaxBracket { threshold: 20_824.0, rate: 0.02 },
            TaxBracket { threshold: 49_368.0, rate: 0.04 },
            TaxBracket { threshold: 77_918.0, rate: 0.06 },
            TaxBracket { threshold: 108_162.0, rate: 0.08 },
            TaxBracket { threshold: 136_700.0, rate: 0.093 },
            TaxBracket { threshold: 698_274.0, rate: 0.103 },
            TaxBracket { threshold: 837_922.0, rate: 0.113 },
            TaxBracket { threshold: 1_396_542.0, rate: 0.123 },
        ];

        TaxTables {
            federal_brackets: FilingStatusTable { single: single_federal, married_jointly: mfj_federal },
            standard_deduction: FilingStatusTable { single: 14_600.0, married_jointly: 29_200.0 },
            ltcg_brackets: FilingStatusTable { single: single_ltcg, married_jointly: mfj_ltcg },
            california_brackets: FilingStatusTable { single: single_ca, married_jointly: mfj_ca },
            social_security_thresholds: FilingStatusTable {
                single: SocialSecurityThresholds { first_threshold: 25_000.0, second_threshold: 34_000.0 },
                married_jointly: SocialSecurityThresholds { first_threshold: 32_000.0, second_threshold: 44_000.0 },
            },
        }
    }
}
