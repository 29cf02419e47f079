//! Fluent builder for assembling a [`Plan`] in tests and example code,
//! mirroring the engine's own field ordering rather than imposing a new
//! shape on it.

use crate::model::{
    Account, AccountId, AssetClass, Expense, ExpenseId, FilingStatus, IncomeId, IncomeKind,
    IncomeSource, Plan, StateTaxRegime, TaxTreatment,
};

#[derive(Debug, Clone)]
pub struct PlanBuilder {
    current_age: u32,
    planning_horizon_years: u32,
    filing_status: FilingStatus,
    state_tax: StateTaxRegime,
    accounts: Vec<Account>,
    income_sources: Vec<IncomeSource>,
    expenses: Vec<Expense>,
    next_account_id: u16,
    next_income_id: u16,
    next_expense_id: u16,
}

impl PlanBuilder {
    pub fn new(current_age: u32, planning_horizon_years: u32) -> Self {
        PlanBuilder {
            current_age,
            planning_horizon_years,
            filing_status: FilingStatus::Single,
            state_tax: StateTaxRegime::None,
            accounts: Vec::new(),
            income_sources: Vec::new(),
            expenses: Vec::new(),
            next_account_id: 1,
            next_income_id: 1,
            next_expense_id: 1,
        }
    }

    pub fn married_jointly(mut self) -> Self {
        self.filing_status = FilingStatus::MarriedJointly;
        self
    }

    pub fn flat_state_tax(mut self, rate: f64) -> Self {
        self.state_tax = StateTaxRegime::Flat { rate };
        self
    }

    pub fn california_state_tax(mut self) -> Self {
        self.state_tax = StateTaxRegime::California;
        self
    }

    fn push_account(
        &mut self,
        name: &str,
        tax_treatment: TaxTreatment,
        asset_class: AssetClass,
        starting_balance: f64,
        annual_return_rate: Option<f64>,
        gains_fraction: Option<f64>,
    ) -> AccountId {
        let id = AccountId(self.next_account_id);
        self.next_account_id += 1;
        self.accounts.push(Account {
            id,
            name: name.to_string(),
            tax_treatment,
            asset_class,
            starting_balance,
            annual_return_rate,
            gains_fraction,
        });
        id
    }

    /// A taxable brokerage account invested in stocks, drawing growth from
    /// the historical-return service (§4.1).
    pub fn taxable_stocks(mut self, name: &str, starting_balance: f64, gains_fraction: f64) -> Self {
        self.push_account(
            name,
            TaxTreatment::TaxableBrokerage,
            AssetClass::Stocks,
            starting_balance,
            None,
            Some(gains_fraction),
        );
        self
    }

    /// A taxable brokerage account invested in bonds, growing at a fixed
    /// deterministic rate; withdrawals realize the full amount as LTCG.
    pub fn taxable_bonds(mut self, name: &str, starting_balance: f64, annual_return_rate: f64) -> Self {
        self.push_account(
            name,
            TaxTreatment::TaxableBrokerage,
            AssetClass::Bonds,
            starting_balance,
            Some(annual_return_rate),
            None,
        );
        self
    }

    /// A traditional (tax-deferred) account invested in bonds.
    pub fn traditional(mut self, name: &str, starting_balance: f64, annual_return_rate: f64) -> Self {
        self.push_account(
            name,
            TaxTreatment::Traditional,
            AssetClass::Bonds,
            starting_balance,
            Some(annual_return_rate),
            None,
        );
        self
    }

    /// A traditional (tax-deferred) account invested in stocks.
    pub fn traditional_stocks(mut self, name: &str, starting_balance: f64) -> Self {
        self.push_account(
            name,
            TaxTreatment::Traditional,
            AssetClass::Stocks,
            starting_balance,
            None,
            None,
        );
        self
    }

    /// A cash/savings account, withdrawn first and generating no tax event.
    pub fn cash_savings(mut self, name: &str, starting_balance: f64, annual_return_rate: f64) -> Self {
        self.push_account(
            name,
            TaxTreatment::CashSavings,
            AssetClass::Savings,
            starting_balance,
            Some(annual_return_rate),
            None,
        );
        self
    }

    fn push_income(&mut self, name: &str, kind: IncomeKind, annual_amount: f64, start_age: u32, end_age: u32) -> IncomeId {
        let id = IncomeId(self.next_income_id);
        self.next_income_id += 1;
        self.income_sources.push(IncomeSource {
            id,
            name: name.to_string(),
            kind,
            annual_amount,
            start_age,
            end_age,
        });
        id
    }

    pub fn social_security(mut self, name: &str, annual_amount: f64, start_age: u32, end_age: u32) -> Self {
        self.push_income(name, IncomeKind::SocialSecurity, annual_amount, start_age, end_age);
        self
    }

    pub fn pension(mut self, name: &str, annual_amount: f64, start_age: u32, end_age: u32) -> Self {
        self.push_income(name, IncomeKind::Pension, annual_amount, start_age, end_age);
        self
    }

    pub fn employment(mut self, name: &str, annual_amount: f64, start_age: u32, end_age: u32) -> Self {
        self.push_income(name, IncomeKind::Employment, annual_amount, start_age, end_age);
        self
    }

    pub fn rental(mut self, name: &str, annual_amount: f64, start_age: u32, end_age: u32) -> Self {
        self.push_income(name, IncomeKind::Rental, annual_amount, start_age, end_age);
        self
    }

    pub fn other_income(
        mut self,
        name: &str,
        annual_amount: f64,
        start_age: u32,
        end_age: u32,
        taxable: bool,
    ) -> Self {
        self.push_income(name, IncomeKind::Other { taxable }, annual_amount, start_age, end_age);
        self
    }

    pub fn expense(mut self, name: &str, annual_amount: f64, start_age: u32, end_age: u32, inflation_rate: f64) -> Self {
        let id = ExpenseId(self.next_expense_id);
        self.next_expense_id += 1;
        self.expenses.push(Expense { id, name: name.to_string(), annual_amount, start_age, end_age, inflation_rate });
        self
    }

    pub fn build(self) -> Plan {
        Plan {
            current_age: self.current_age,
            planning_horizon_years: self.planning_horizon_years,
            filing_status: self.filing_status,
            state_tax: self.state_tax,
            accounts: self.accounts,
            income_sources: self.income_sources,
            expenses: self.expenses,
        }
    }
}
