//! Historical-return service (§4.1).
//!
//! Owns a fixed monthly-return vector (oldest→newest) loaded once at
//! startup. Precomputes bear/bull twelve-month window start-index pools and
//! two Markov stay-probabilities, then exposes block-bootstrap and
//! regime-conditioned annual-return sampling. Everything here is read-only
//! after construction and safe to share across parallel runs (§5, §9).

use rand::Rng;

use crate::error::{EngineError, Result};
use crate::model::MarketRegime;

/// A bundled, plausible monthly-return series so the engine works without an
/// external data dependency. Real deployments load their own series via
/// [`HistoricalReturnService::from_text`].
const DEFAULT_SERIES: &str = include_str!("../data/historical_monthly_returns.txt");

const WINDOW_MONTHS: usize = 12;

/// Whether the raw text lists months oldest-first or newest-first; the
/// loader normalizes to oldest→newest either way (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOrder {
    OldestFirst,
    NewestFirst,
}

/// Outcome of parsing a raw historical-data text blob: the growth
/// multipliers in oldest→newest order, plus a count of skipped rows for
/// caller-side warning/logging (§6, §7).
#[derive(Debug, Clone)]
pub struct ParsedSeries {
    pub multipliers: Vec<f64>,
    pub skipped_rows: usize,
}

/// Parse a line-oriented historical-return text table. Each non-blank,
/// non-`#`-prefixed line is expected to end in a monthly percentage change
/// (optionally preceded by a date column separated by a comma). Unparseable
/// rows are skipped and counted rather than aborting the whole load.
pub fn parse_monthly_returns(text: &str, order: SourceOrder) -> ParsedSeries {
    let mut multipliers = Vec::new();
    let mut skipped_rows = 0usize;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let field = line.rsplit(',').next().unwrap_or(line).trim();
        match field.parse::<f64>() {
            Ok(pct) => multipliers.push(1.0 + pct / 100.0),
            Err(_) => skipped_rows += 1,
        }
    }

    if order == SourceOrder::NewestFirst {
        multipliers.reverse();
    }

    ParsedSeries { multipliers, skipped_rows }
}

/// Compounded annual return for a contiguous window of `WINDOW_MONTHS`
/// multipliers: `∏(1 + r_m) - 1`.
fn window_return(multipliers: &[f64], start: usize) -> f64 {
    multipliers[start..start + WINDOW_MONTHS].iter().product::<f64>() - 1.0
}

#[derive(Debug, Clone)]
pub struct HistoricalReturnService {
    monthly_multipliers: Vec<f64>,
    bear_starts: Vec<usize>,
    bull_starts: Vec<usize>,
    /// P(bull -> bull) estimated from non-overlapping annual windows.
    p_bull_stay: f64,
    /// P(bear -> bear) estimated from non-overlapping annual windows.
    p_bear_stay: f64,
}

impl HistoricalReturnService {
    /// Build the service from raw text, per §6's loader contract: zero
    /// parsed rows is a fatal initialization error.
    pub fn from_text(text: &str, order: SourceOrder) -> Result<(Self, usize)> {
        let parsed = parse_monthly_returns(text, order);
        let service = Self::from_multipliers(parsed.multipliers)?;
        Ok((service, parsed.skipped_rows))
    }

    /// The bundled default series, for callers that don't supply their own.
    pub fn from_default() -> Result<Self> {
        Self::from_text(DEFAULT_SERIES, SourceOrder::OldestFirst).map(|(service, _)| service)
    }

    fn from_multipliers(monthly_multipliers: Vec<f64>) -> Result<Self> {
        if monthly_multipliers.len() < WINDOW_MONTHS {
            return Err(EngineError::EmptyHistoricalData);
        }

        let num_windows = monthly_multipliers.len() - WINDOW_MONTHS + 1;
        let mut bear_starts = Vec::new();
        let mut bull_starts = Vec::new();
        for start in 0..num_windows {
            if window_return(&monthly_multipliers, start) < 0.0 {
                bear_starts.push(start);
            } else {
                bull_starts.push(start);
            }
        }

        let (p_bull_stay, p_bear_stay) =
            estimate_markov_stay_probabilities(&monthly_multipliers);

        Ok(HistoricalReturnService {
            monthly_multipliers,
            bear_starts,
            bull_starts,
            p_bull_stay,
            p_bear_stay,
        })
    }

    fn pool_for(&self, regime: MarketRegime) -> &[usize] {
        match regime {
            MarketRegime::Bear => &self.bear_starts,
            MarketRegime::Bull | MarketRegime::None => &self.bull_starts,
        }
    }

    /// Draw a uniformly random window start from `regime`'s pool. Falls back
    /// to the union of both pools if the requested regime's pool is empty
    /// (can happen with a short or one-sided historical series).
    fn sample_start<R: Rng + ?Sized>(&self, regime: MarketRegime, rng: &mut R) -> usize {
        let pool = self.pool_for(regime);
        if !pool.is_empty() {
            return pool[rng.random_range(0..pool.len())];
        }
        let max_start = self.monthly_multipliers.len() - WINDOW_MONTHS;
        rng.random_range(0..=max_start)
    }

    fn regime_of_start(&self, start: usize) -> MarketRegime {
        if window_return(&self.monthly_multipliers, start) < 0.0 {
            MarketRegime::Bear
        } else {
            MarketRegime::Bull
        }
    }

    /// Draw `n_years` compounded annual growth multipliers (§4.1).
    ///
    /// With `first_year_regime = None`, every year is an independent uniform
    /// block bootstrap. Otherwise year 0 is drawn from the requested
    /// regime's pool and subsequent years transition via the Markov stay
    /// probabilities before drawing from the resulting regime's pool.
    pub fn sample_annual_returns<R: Rng + ?Sized>(
        &self,
        n_years: usize,
        rng: &mut R,
        first_year_regime: MarketRegime,
    ) -> Vec<f64> {
        let mut out = Vec::with_capacity(n_years);
        if n_years == 0 {
            return out;
        }

        if first_year_regime == MarketRegime::None {
            let max_start = self.monthly_multipliers.len() - WINDOW_MONTHS;
            for _ in 0..n_years {
                let start = rng.random_range(0..=max_start);
                out.push(self.monthly_multipliers[start..start + WINDOW_MONTHS]
                    .iter()
                    .product::<f64>());
            }
            return out;
        }

        let mut regime = first_year_regime;
        for year in 0..n_years {
            if year > 0 {
                let stay_probability = match regime {
                    MarketRegime::Bull => self.p_bull_stay,
                    MarketRegime::Bear | MarketRegime::None => self.p_bear_stay,
                };
                let stays = rng.random::<f64>() < stay_probability;
                regime = if stays {
                    regime
                } else {
                    match regime {
                        MarketRegime::Bull => MarketRegime::Bear,
                        _ => MarketRegime::Bull,
                    }
                };
            }
            let start = self.sample_start(regime, rng);
            let multiplier = self.monthly_multipliers[start..start + WINDOW_MONTHS]
                .iter()
                .product::<f64>();
            out.push(multiplier);
            regime = self.regime_of_start(start);
        }

        out
    }

    pub fn monthly_count(&self) -> usize {
        self.monthly_multipliers.len()
    }

    pub fn bear_window_count(&self) -> usize {
        self.bear_starts.len()
    }

    pub fn bull_window_count(&self) -> usize {
        self.bull_starts.len()
    }
}

/// Estimate `P(bull -> bull)` and `P(bear -> bear)` as maximum-likelihood
/// transition probabilities over non-overlapping, month-aligned annual
/// windows (§4.1).
fn estimate_markov_stay_probabilities(multipliers: &[f64]) -> (f64, f64) {
    let mut regimes = Vec::new();
    let mut start = 0;
    while start + WINDOW_MONTHS <= multipliers.len() {
        let is_bull = window_return(multipliers, start) >= 0.0;
        regimes.push(is_bull);
        start += WINDOW_MONTHS;
    }

    let mut bull_to_bull = 0u32;
    let mut bull_total = 0u32;
    let mut bear_to_bear = 0u32;
    let mut bear_total = 0u32;

    for pair in regimes.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        if from {
            bull_total += 1;
            if to {
                bull_to_bull += 1;
            }
        } else {
            bear_total += 1;
            if !to {
                bear_to_bear += 1;
            }
        }
    }

    let p_bull_stay = if bull_total > 0 {
        f64::from(bull_to_bull) / f64::from(bull_total)
    } else {
        0.5
    };
    let p_bear_stay = if bear_total > 0 {
        f64::from(bear_to_bear) / f64::from(bear_total)
    } else {
        0.5
    };

    (p_bull_stay, p_bear_stay)
}
