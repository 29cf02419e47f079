//! Tax module (§4.2): pure, stateless functions over a [`TaxTables`]
//! configuration. Every bracket constant lives in `model::tax_config` so an
//! annual update touches only data, never this control flow.

use crate::model::{FilingStatus, StateTaxRegime, TaxBracket, TaxTables};

/// Progressive piecewise-linear tax over `brackets`, each of which applies
/// its rate to the slice of `income` between its threshold and the next
/// bracket's threshold (or infinity, for the top bracket).
fn progressive_tax(income: f64, brackets: &[TaxBracket]) -> f64 {
    if income <= 0.0 || brackets.is_empty() {
        return 0.0;
    }

    let mut tax = 0.0;
    for (i, bracket) in brackets.iter().enumerate() {
        let next_threshold = brackets.get(i + 1).map(|b| b.threshold).unwrap_or(f64::INFINITY);
        if income <= bracket.threshold {
            break;
        }
        let taxed_in_bracket = (income.min(next_threshold) - bracket.threshold).max(0.0);
        tax += taxed_in_bracket * bracket.rate;
    }
    tax
}

/// Federal tax on ordinary income: progressive over
/// `max(0, ordinary_income - standard_deduction)` (§4.2).
pub fn federal_ordinary_tax(ordinary_income: f64, filing_status: FilingStatus, tables: &TaxTables) -> f64 {
    let deduction = *tables.standard_deduction.get(filing_status);
    let taxable = (ordinary_income - deduction).max(0.0);
    progressive_tax(taxable, tables.federal_brackets.get(filing_status))
}

/// Federal long-term capital-gains tax under the stacking rule: LTCG is
/// stacked on top of ordinary income on the combined progressive scale, so
/// the tax owed is the marginal difference between running the LTCG bracket
/// schedule over `ordinary_taxable + ltcg_income` and over `ordinary_taxable`
/// alone (§4.2 — the equivalent framing the spec calls out).
pub fn federal_ltcg_tax(
    ordinary_taxable: f64,
    ltcg_income: f64,
    filing_status: FilingStatus,
    tables: &TaxTables,
) -> f64 {
    if ltcg_income <= 0.0 {
        return 0.0;
    }
    let ordinary_taxable = ordinary_taxable.max(0.0);
    let brackets = tables.ltcg_brackets.get(filing_status);
    let ltcg_bracket_table: Vec<TaxBracket> = brackets
        .iter()
        .map(|b| TaxBracket { threshold: b.threshold, rate: b.rate })
        .collect();
    let tax_through_total = progressive_tax(ordinary_taxable + ltcg_income, &ltcg_bracket_table);
    let tax_through_ordinary = progressive_tax(ordinary_taxable, &ltcg_bracket_table);
    (tax_through_total - tax_through_ordinary).max(0.0)
}

/// State tax across the three supported regimes (§4.2). `ordinary_taxable`
/// must already exclude the Social-Security taxable portion — every state
/// mode excludes it, per spec.
pub fn state_tax(
    ordinary_taxable: f64,
    ltcg_income: f64,
    filing_status: FilingStatus,
    regime: &StateTaxRegime,
    tables: &TaxTables,
) -> f64 {
    match regime {
        StateTaxRegime::None => 0.0,
        StateTaxRegime::Flat { rate } => rate * ordinary_taxable.max(0.0),
        StateTaxRegime::California => {
            let brackets = tables.california_brackets.get(filing_status);
            progressive_tax(ordinary_taxable.max(0.0) + ltcg_income.max(0.0), brackets)
        }
    }
}

/// Social-Security taxable fraction (§4.2): 0, 0.5, or 0.85 of `ss_gross`
/// depending on provisional income relative to the two IRS thresholds.
pub fn social_security_taxable_fraction(
    provisional_income: f64,
    filing_status: FilingStatus,
    tables: &TaxTables,
) -> f64 {
    let thresholds = tables.social_security_thresholds.get(filing_status);
    if provisional_income <= thresholds.first_threshold {
        0.0
    } else if provisional_income <= thresholds.second_threshold {
        0.5
    } else {
        0.85
    }
}

/// Provisional income per the IRS rule used to derive the Social-Security
/// taxable fraction (§4.2, Glossary).
pub fn provisional_income(adjusted_gross_without_ss: f64, tax_exempt_interest: f64, ss_gross: f64) -> f64 {
    adjusted_gross_without_ss + tax_exempt_interest + 0.5 * ss_gross
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaxTables;

    fn tables() -> TaxTables {
        TaxTables::reference_2024()
    }

    #[test]
    fn federal_ordinary_tax_below_deduction_is_zero() {
        let tax = federal_ordinary_tax(10_000.0, FilingStatus::Single, &tables());
        assert_eq!(tax, 0.0);
    }

    #[test]
    fn federal_ordinary_tax_progressive() {
        let tax = federal_ordinary_tax(100_000.0, FilingStatus::Single, &tables());
        assert!(tax > 0.0);
        let tax_mfj = federal_ordinary_tax(100_000.0, FilingStatus::MarriedJointly, &tables());
        assert!(tax_mfj <= tax, "MFJ should owe no more than single at the same income");
    }

    #[test]
    fn ltcg_zero_when_total_below_zero_bracket_top() {
        // Ordinary + LTCG together under the first LTCG threshold -> 0% bracket.
        let tax = federal_ltcg_tax(10_000.0, 5_000.0, FilingStatus::Single, &tables());
        assert_eq!(tax, 0.0);
    }

    #[test]
    fn ltcg_stacks_on_top_of_ordinary() {
        let tables = tables();
        // With ordinary already above the 15% threshold, all LTCG is taxed at 15%+.
        let ordinary = 100_000.0;
        let gain = 10_000.0;
        let tax = federal_ltcg_tax(ordinary, gain, FilingStatus::Single, &tables);
        assert!((tax - gain * 0.15).abs() < 1.0);
    }

    #[test]
    fn moving_a_dollar_from_ordinary_to_ltcg_never_increases_total_tax() {
        let tables = tables();
        let total = 200_000.0;
        for ordinary in (0..=200_000).step_by(20_000) {
            let ordinary = ordinary as f64;
            let gain = total - ordinary;
            let fed_ord = federal_ordinary_tax(ordinary, FilingStatus::Single, &tables);
            let fed_ltcg = federal_ltcg_tax(ordinary, gain, FilingStatus::Single, &tables);
            let total_tax = fed_ord + fed_ltcg;

            let ordinary2 = (ordinary - 1.0).max(0.0);
            let gain2 = total - ordinary2;
            let fed_ord2 = federal_ordinary_tax(ordinary2, FilingStatus::Single, &tables);
            let fed_ltcg2 = federal_ltcg_tax(ordinary2, gain2, FilingStatus::Single, &tables);
            let total_tax2 = fed_ord2 + fed_ltcg2;

            assert!(
                total_tax2 <= total_tax + 1e-6,
                "shifting $1 from ordinary to LTCG increased tax: {total_tax} -> {total_tax2}"
            );
        }
    }

    #[test]
    fn state_tax_none_is_always_zero() {
        let tax = state_tax(500_000.0, 100_000.0, FilingStatus::Single, &StateTaxRegime::None, &tables());
        assert_eq!(tax, 0.0);
    }

    #[test]
    fn state_tax_flat_ignores_ltcg() {
        let regime = StateTaxRegime::Flat { rate: 0.05 };
        let with_gain = state_tax(100_000.0, 50_000.0, FilingStatus::Single, &regime, &tables());
        let without_gain = state_tax(100_000.0, 0.0, FilingStatus::Single, &regime, &tables());
        assert_eq!(with_gain, without_gain);
        assert!((with_gain - 5_000.0).abs() < 1e-6);
    }

    #[test]
    fn california_taxes_ltcg_as_ordinary() {
        let with_gain =
            state_tax(50_000.0, 50_000.0, FilingStatus::Single, &StateTaxRegime::California, &tables());
        let without_gain =
            state_tax(50_000.0, 0.0, FilingStatus::Single, &StateTaxRegime::California, &tables());
        assert!(with_gain > without_gain);
    }

    #[test]
    fn social_security_fraction_buckets() {
        let tables = tables();
        assert_eq!(
            social_security_taxable_fraction(15_000.0, FilingStatus::Single, &tables),
            0.0
        );
        assert_eq!(
            social_security_taxable_fraction(30_000.0, FilingStatus::Single, &tables),
            0.5
        );
        assert_eq!(
            social_security_taxable_fraction(40_000.0, FilingStatus::Single, &tables),
            0.85
        );
    }

    #[test]
    fn social_security_fraction_is_monotone() {
        let tables = tables();
        let mut prior = 0.0;
        for provisional in (0..100_000).step_by(1_000) {
            let fraction =
                social_security_taxable_fraction(provisional as f64, FilingStatus::Single, &tables);
            assert!(fraction >= prior);
            prior = fraction;
        }
    }

    #[test]
    fn ss_taxability_scenario_from_spec() {
        let tables = tables();
        // Single filer, ss_gross = 30_000, no other income.
        let provisional_1 = provisional_income(0.0, 0.0, 30_000.0);
        assert!((provisional_1 - 15_000.0).abs() < 1e-9);
        assert_eq!(
            social_security_taxable_fraction(provisional_1, FilingStatus::Single, &tables),
            0.0
        );

        // Add a 20_000 pension.
        let provisional_2 = provisional_income(20_000.0, 0.0, 30_000.0);
        assert!((provisional_2 - 35_000.0).abs() < 1e-9);
        let fraction = social_security_taxable_fraction(provisional_2, FilingStatus::Single, &tables);
        assert_eq!(fraction, 0.85);
        assert!((fraction * 30_000.0 - 25_500.0).abs() < 1e-6);
    }
}
