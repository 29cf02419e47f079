//! Withdrawal sequencer (§4.4): drains a required cash amount across an
//! ordered set of accounts in tax-efficiency priority order, attributing the
//! realized income to ordinary/LTCG tallies as it goes.

use crate::error::{EngineError, Result};
use crate::model::{AccountId, AccountState, AssetClass, TaxTreatment};

/// Amount debited from a single account during one [`sequence_withdrawal`]
/// call.
#[derive(Debug, Clone, Copy)]
pub struct AccountWithdrawal {
    pub account_id: AccountId,
    pub amount: f64,
}

/// Outcome of draining a need across the account priority order (§4.4).
#[derive(Debug, Clone)]
pub struct WithdrawalOutcome {
    pub withdrawn_by_account: Vec<AccountWithdrawal>,
    pub ordinary_income: f64,
    pub ltcg_income: f64,
    /// Unmet portion of the need, ≥ 0.
    pub shortfall: f64,
}

/// Priority tier per §4.4: lower sorts first. `cash_savings` is tier 0,
/// taxable-brokerage stocks tier 1, taxable-brokerage non-stocks tier 2,
/// traditional tier 3.
fn tier(account: &AccountState) -> u8 {
    match (account.tax_treatment, account.asset_class) {
        (TaxTreatment::CashSavings, _) => 0,
        (TaxTreatment::TaxableBrokerage, AssetClass::Stocks) => 1,
        (TaxTreatment::TaxableBrokerage, _) => 2,
        (TaxTreatment::Traditional, _) => 3,
    }
}

/// Drain `need` from `accounts` in priority order, crediting ordinary/LTCG
/// income as appropriate and debiting balances in place. Ties within a tier
/// are broken by input order. Returns the residual shortfall (never
/// negative) rather than erroring when the portfolio can't cover the need.
pub fn sequence_withdrawal(accounts: &mut [AccountState], need: f64) -> Result<WithdrawalOutcome> {
    if need < 0.0 {
        return Err(EngineError::NegativeWithdrawalNeed(need));
    }

    let mut remaining = need;
    let mut withdrawn_by_account = Vec::new();
    let mut ordinary_income = 0.0;
    let mut ltcg_income = 0.0;

    for current_tier in 0..=3u8 {
        if remaining <= 0.0 {
            break;
        }
        for account in accounts.iter_mut() {
            if remaining <= 0.0 {
                break;
            }
            if tier(account) != current_tier || account.balance <= 0.0 {
                continue;
            }

            let take = remaining.min(account.balance);
            account.balance -= take;
            remaining -= take;

            match current_tier {
                0 => {}
                1 => ltcg_income += take * account.gains_fraction,
                2 => ltcg_income += take,
                3 => ordinary_income += take,
                _ => unreachable!(),
            }

            withdrawn_by_account.push(AccountWithdrawal { account_id: account.id, amount: take });
        }
    }

    Ok(WithdrawalOutcome {
        withdrawn_by_account,
        ordinary_income,
        ltcg_income,
        shortfall: remaining.max(0.0),
    })
}
