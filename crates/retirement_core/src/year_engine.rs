//! Year engine (§4.5): the single-year state transition. The phase order
//! below is load-bearing — each phase's output feeds the next, and several
//! (RMD before SS taxability, expense withdrawal before tax computation,
//! tax withdrawal after) cannot be reordered without changing the result.

use crate::error::Result;
use crate::model::{
    AccountState, AccountYearRecord, AssetClass, ExpenseYearRecord, IncomeKind, IncomeSource,
    IncomeYearRecord, Plan, RmdTable, TaxBreakdown, TaxTables, TaxTreatment, YearRecord,
};
use crate::taxes;
use crate::withdrawal::sequence_withdrawal;

/// Run the twelve-phase transition for one age, mutating `accounts` in
/// place and returning the committed trace record (§4.5 phase 12).
///
/// `stock_multipliers` holds one compounded annual growth multiplier per
/// entry of `accounts` (same order), used only for `AssetClass::Stocks`
/// accounts; non-stock accounts use their own `annual_return_rate`.
pub fn simulate_year(
    plan: &Plan,
    tax_tables: &TaxTables,
    rmd_table: &RmdTable,
    accounts: &mut [AccountState],
    stock_multipliers: &[f64],
    age: u32,
) -> Result<YearRecord> {
    let n = accounts.len();
    let start_balances: Vec<f64> = accounts.iter().map(|a| a.balance).collect();
    let mut growth_rates = vec![0.0; n];
    let mut required_distributions = vec![0.0; n];

    // Phase 2: growth.
    for (i, account) in accounts.iter_mut().enumerate() {
        let multiplier = match account.asset_class {
            AssetClass::Stocks => stock_multipliers[i],
            _ => 1.0 + account.annual_return_rate.unwrap_or(0.0),
        };
        account.balance *= multiplier;
        growth_rates[i] = multiplier - 1.0;
    }

    // Phase 3: income collection.
    let mut ss_gross = 0.0;
    let mut income_ordinary = 0.0;
    let mut income_nontaxable = 0.0;
    let mut income_records = Vec::new();
    for source in &plan.income_sources {
        if !source.active_at(age) {
            continue;
        }
        income_records.push(IncomeYearRecord { income_id: source.id, gross_amount: source.annual_amount });
        accumulate_income(source, &mut ss_gross, &mut income_ordinary, &mut income_nontaxable);
    }

    // Phase 4: required distributions. RMD cash is folded into the ordinary
    // tax tally here; it is added to the cash-available tally separately in
    // phase 6 so it is counted exactly once there.
    let mut rmd_total = 0.0;
    for (i, account) in accounts.iter_mut().enumerate() {
        if account.tax_treatment != TaxTreatment::Traditional {
            continue;
        }
        let rmd = rmd_table.required_distribution(account.balance, age);
        account.balance -= rmd;
        required_distributions[i] = rmd;
        rmd_total += rmd;
    }
    let ordinary_taxable_tally = income_ordinary + rmd_total;

    // Phase 5: Social-Security taxability.
    let provisional =
        taxes::provisional_income(ordinary_taxable_tally + income_nontaxable, 0.0, ss_gross);
    let ss_fraction = taxes::social_security_taxable_fraction(provisional, plan.filing_status, tax_tables);
    let taxable_ss = ss_fraction * ss_gross;

    // Phase 6: available cash.
    let available_income = ss_gross + income_ordinary + income_nontaxable + rmd_total;

    // Phase 7: expenses.
    let mut total_expenses = 0.0;
    let mut expense_records = Vec::new();
    for expense in &plan.expenses {
        if !expense.active_at(age) {
            continue;
        }
        let adjusted = expense.adjusted_amount(age, plan.current_age);
        expense_records.push(ExpenseYearRecord { expense_id: expense.id, adjusted_amount: adjusted });
        total_expenses += adjusted;
    }

    // Phase 8: expense withdrawal.
    let net_need = (total_expenses - available_income).max(0.0);
    let expense_outcome = sequence_withdrawal(accounts, net_need)?;
    let expense_withdrawn_total = net_need - expense_outcome.shortfall;

    // Phase 9: tax computation, using only the income realized through the
    // expense withdrawal — tax-withdrawal income is deliberately excluded
    // (accepted single-pass simplification, no tax-on-tax).
    let ordinary_for_tax = ordinary_taxable_tally + taxable_ss + expense_outcome.ordinary_income;
    let ltcg_for_tax = expense_outcome.ltcg_income;
    let ordinary_for_state = ordinary_for_tax - taxable_ss;

    let federal_ordinary = taxes::federal_ordinary_tax(ordinary_for_tax, plan.filing_status, tax_tables);
    let deduction = *tax_tables.standard_deduction.get(plan.filing_status);
    let ordinary_taxable_after_deduction = (ordinary_for_tax - deduction).max(0.0);
    let federal_ltcg = taxes::federal_ltcg_tax(
        ordinary_taxable_after_deduction,
        ltcg_for_tax,
        plan.filing_status,
        tax_tables,
    );
    let state = taxes::state_tax(ordinary_for_state, ltcg_for_tax, plan.filing_status, &plan.state_tax, tax_tables);
    let total_tax = federal_ordinary + federal_ltcg + state;
    let taxable_base = ordinary_for_tax + ltcg_for_tax;
    let effective_rate = if taxable_base > 0.0 { total_tax / taxable_base } else { 0.0 };

    // Phase 10: tax withdrawal.
    let surplus = (available_income + expense_withdrawn_total - total_expenses).max(0.0);
    let tax_need = (total_tax - surplus).max(0.0);
    let tax_outcome = sequence_withdrawal(accounts, tax_need)?;

    let mut withdrawn_for_expense = vec![0.0; n];
    let mut withdrawn_for_tax = vec![0.0; n];
    for w in &expense_outcome.withdrawn_by_account {
        if let Some(i) = accounts.iter().position(|a| a.id == w.account_id) {
            withdrawn_for_expense[i] += w.amount;
        }
    }
    for w in &tax_outcome.withdrawn_by_account {
        if let Some(i) = accounts.iter().position(|a| a.id == w.account_id) {
            withdrawn_for_tax[i] += w.amount;
        }
    }

    // Phase 11: failure check.
    let total_balance: f64 = accounts.iter().map(|a| a.balance).sum();
    let failed = total_balance <= 0.0;
    if failed {
        for account in accounts.iter_mut() {
            account.balance = 0.0;
        }
    }

    // Phase 12: commit record.
    let account_records = accounts
        .iter()
        .enumerate()
        .map(|(i, account)| AccountYearRecord {
            account_id: account.id,
            start_balance: start_balances[i],
            end_balance: account.balance,
            growth_rate: growth_rates[i],
            withdrawn_for_expense: withdrawn_for_expense[i],
            withdrawn_for_tax: withdrawn_for_tax[i],
            required_distribution: required_distributions[i],
        })
        .collect();

    Ok(YearRecord {
        age,
        accounts: account_records,
        incomes: income_records,
        taxable_social_security: taxable_ss,
        provisional_income: provisional,
        total_required_distributions: rmd_total,
        expenses: expense_records,
        net_cash_need: net_need,
        ordinary_income: ordinary_for_tax,
        ltcg_income: ltcg_for_tax,
        tax: TaxBreakdown { federal_ordinary, federal_ltcg, state, total: total_tax, effective_rate },
        shortfall: expense_outcome.shortfall + tax_outcome.shortfall,
        failed,
    })
}

fn accumulate_income(
    source: &IncomeSource,
    ss_gross: &mut f64,
    ordinary: &mut f64,
    nontaxable: &mut f64,
) {
    match source.kind {
        IncomeKind::SocialSecurity => *ss_gross += source.annual_amount,
        IncomeKind::Employment
        | IncomeKind::Pension
        | IncomeKind::Rental
        | IncomeKind::TraditionalDistribution => *ordinary += source.annual_amount,
        IncomeKind::Other { taxable: true } => *ordinary += source.annual_amount,
        IncomeKind::Other { taxable: false } => *nontaxable += source.annual_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Account, AccountId, Expense, ExpenseId, FilingStatus, IncomeId, RmdTable, StateTaxRegime,
        TaxTables,
    };

    fn plan_with(accounts: Vec<Account>, incomes: Vec<IncomeSource>, expenses: Vec<Expense>) -> Plan {
        Plan {
            current_age: 65,
            planning_horizon_years: 30,
            filing_status: FilingStatus::Single,
            state_tax: StateTaxRegime::None,
            accounts,
            income_sources: incomes,
            expenses,
        }
    }

    #[test]
    fn balance_conservation_holds_per_account() {
        let plan = plan_with(
            vec![Account {
                id: AccountId(1),
                name: "brokerage".into(),
                tax_treatment: TaxTreatment::TaxableBrokerage,
                asset_class: AssetClass::Bonds,
                starting_balance: 100_000.0,
                annual_return_rate: Some(0.05),
                gains_fraction: Some(1.0),
            }],
            vec![],
            vec![Expense {
                id: ExpenseId(1),
                name: "living".into(),
                annual_amount: 10_000.0,
                start_age: 65,
                end_age: 95,
                inflation_rate: 0.0,
            }],
        );
        let tax_tables = TaxTables::reference_2024();
        let rmd_table = RmdTable::irs_uniform_lifetime_2024();
        let mut accounts: Vec<AccountState> = plan.accounts.iter().map(AccountState::from_account).collect();
        let start = accounts[0].balance;

        let record = simulate_year(&plan, &tax_tables, &rmd_table, &mut accounts, &[], 65).unwrap();
        let acc = &record.accounts[0];
        assert_eq!(acc.start_balance, start);
        let expected_end = acc.start_balance
            + acc.start_balance * acc.growth_rate
            - acc.withdrawn_for_expense
            - acc.withdrawn_for_tax
            - acc.required_distribution;
        assert!((acc.end_balance - expected_end).abs() < 1e-6);
    }

    #[test]
    fn rmd_is_enforced_from_age_73_on_traditional_accounts() {
        let plan = plan_with(
            vec![Account {
                id: AccountId(1),
                name: "401k".into(),
                tax_treatment: TaxTreatment::Traditional,
                asset_class: AssetClass::Bonds,
                starting_balance: 1_000_000.0,
                annual_return_rate: Some(0.0),
                gains_fraction: None,
            }],
            vec![],
            vec![],
        );
        let tax_tables = TaxTables::reference_2024();
        let rmd_table = RmdTable::irs_uniform_lifetime_2024();
        let mut accounts: Vec<AccountState> = plan.accounts.iter().map(AccountState::from_account).collect();

        let record = simulate_year(&plan, &tax_tables, &rmd_table, &mut accounts, &[], 73).unwrap();
        assert!(record.total_required_distributions > 0.0);
        assert!((record.total_required_distributions - 1_000_000.0 / 26.5).abs() < 1.0);
    }

    #[test]
    fn no_rmd_before_start_age() {
        let plan = plan_with(
            vec![Account {
                id: AccountId(1),
                name: "401k".into(),
                tax_treatment: TaxTreatment::Traditional,
                asset_class: AssetClass::Bonds,
                starting_balance: 1_000_000.0,
                annual_return_rate: Some(0.0),
                gains_fraction: None,
            }],
            vec![],
            vec![],
        );
        let tax_tables = TaxTables::reference_2024();
        let rmd_table = RmdTable::irs_uniform_lifetime_2024();
        let mut accounts: Vec<AccountState> = plan.accounts.iter().map(AccountState::from_account).collect();

        let record = simulate_year(&plan, &tax_tables, &rmd_table, &mut accounts, &[], 72).unwrap();
        assert_eq!(record.total_required_distributions, 0.0);
    }

    #[test]
    fn social_security_taxability_scenario_matches_spec_walkthrough() {
        let plan = plan_with(
            vec![],
            vec![
                IncomeSource {
                    id: IncomeId(1),
                    name: "ss".into(),
                    kind: IncomeKind::SocialSecurity,
                    annual_amount: 30_000.0,
                    start_age: 65,
                    end_age: 95,
                },
                IncomeSource {
                    id: IncomeId(2),
                    name: "pension".into(),
                    kind: IncomeKind::Pension,
                    annual_amount: 20_000.0,
                    start_age: 65,
                    end_age: 95,
                },
            ],
            vec![],
        );
        let tax_tables = TaxTables::reference_2024();
        let rmd_table = RmdTable::irs_uniform_lifetime_2024();
        let mut accounts: Vec<AccountState> = vec![];

        let record = simulate_year(&plan, &tax_tables, &rmd_table, &mut accounts, &[], 65).unwrap();
        assert!((record.provisional_income - 35_000.0).abs() < 1e-6);
        assert!((record.taxable_social_security - 25_500.0).abs() < 1e-6);
    }

    #[test]
    fn depletion_latches_failed_and_zeroes_balances() {
        let plan = plan_with(
            vec![Account {
                id: AccountId(1),
                name: "cash".into(),
                tax_treatment: TaxTreatment::CashSavings,
                asset_class: AssetClass::Savings,
                starting_balance: 1_000.0,
                annual_return_rate: Some(0.0),
                gains_fraction: None,
            }],
            vec![],
            vec![Expense {
                id: ExpenseId(1),
                name: "living".into(),
                annual_amount: 50_000.0,
                start_age: 65,
                end_age: 95,
                inflation_rate: 0.0,
            }],
        );
        let tax_tables = TaxTables::reference_2024();
        let rmd_table = RmdTable::irs_uniform_lifetime_2024();
        let mut accounts: Vec<AccountState> = plan.accounts.iter().map(AccountState::from_account).collect();

        let record = simulate_year(&plan, &tax_tables, &rmd_table, &mut accounts, &[], 65).unwrap();
        assert!(record.failed);
        assert_eq!(accounts[0].balance, 0.0);
        assert!(record.shortfall > 0.0);
    }
}
