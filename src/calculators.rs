// =============================================================================
// Buy-sizing and dividend calculators
// =============================================================================
//
// Pure arithmetic over a price (and, for dividends, a price series). Inputs
// that would divide by zero or are not finite produce `None`.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::PriceSeries;

// =============================================================================
// Currency exchange
// =============================================================================

/// FX rate rounded up to the next multiple of 10 (1337.2 -> 1340).
pub fn applied_fx_rate(rate: f64) -> f64 {
    (rate / 10.0).ceil() * 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeQuote {
    pub price: f64,
    pub shares: u64,
    pub rate: f64,
    pub applied_rate: f64,
    pub total_usd: f64,
    pub total_krw: f64,
}

/// KRW needed to buy `shares` at `price` USD.
pub fn exchange_amount(price: f64, shares: u64, rate: f64) -> Option<ExchangeQuote> {
    if !(price.is_finite() && rate.is_finite()) || price <= 0.0 || rate <= 0.0 {
        return None;
    }
    let applied_rate = applied_fx_rate(rate);
    let total_usd = price * shares as f64;
    Some(ExchangeQuote {
        price,
        shares,
        rate,
        applied_rate,
        total_usd,
        total_krw: total_usd * applied_rate,
    })
}

// =============================================================================
// Max shares / average down
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaxShares {
    pub shares: u64,
    pub leftover: f64,
}

pub fn max_shares(cash: f64, price: f64) -> Option<MaxShares> {
    if !(cash.is_finite() && price.is_finite()) || price <= 0.0 || cash < 0.0 {
        return None;
    }
    let shares = (cash / price).floor();
    Some(MaxShares {
        shares: shares as u64,
        leftover: cash - price * shares,
    })
}

/// New average cost after buying `add_quantity` more at `price`.
pub fn average_down(average_price: f64, quantity: u64, price: f64, add_quantity: u64) -> Option<f64> {
    let total_quantity = quantity + add_quantity;
    if total_quantity == 0 {
        return None;
    }
    let total_cost = average_price * quantity as f64 + price * add_quantity as f64;
    let average = total_cost / total_quantity as f64;
    average.is_finite().then_some(average)
}

// =============================================================================
// Dividends
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DividendRecord {
    pub ex_date: NaiveDate,
    pub cash_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DividendYield {
    pub ex_date: NaiveDate,
    pub cash_amount: f64,
    pub reference_price: Option<f64>,
    pub yield_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DividendSummary {
    pub current_price: Option<f64>,
    /// Sum of cash amounts with an ex-date in the last year.
    pub ttm_total: f64,
    pub ttm_yield_pct: Option<f64>,
    pub yield_on_cost_pct: Option<f64>,
    /// Newest ex-date first.
    pub dividends: Vec<DividendYield>,
}

/// Last close on or before `ex_date`; the first close when the series starts
/// after it.
pub fn reference_price(series: &PriceSeries, ex_date: NaiveDate) -> Option<f64> {
    let points = series.points();
    let idx = points.partition_point(|p| p.date <= ex_date);
    if idx == 0 {
        points.first().map(|p| p.close)
    } else {
        Some(points[idx - 1].close)
    }
}

pub fn dividend_summary(
    records: &[DividendRecord],
    series: &PriceSeries,
    today: NaiveDate,
    average_price: Option<f64>,
) -> DividendSummary {
    let one_year_ago = today.checked_sub_months(Months::new(12)).unwrap_or(NaiveDate::MIN);
    let ttm_total: f64 = records
        .iter()
        .filter(|r| r.ex_date >= one_year_ago && r.ex_date <= today)
        .map(|r| r.cash_amount)
        .sum();

    let current_price = series.last().map(|p| p.close);
    let pct_of = |base: f64| (base > 0.0).then(|| ttm_total / base * 100.0);

    let mut dividends: Vec<DividendYield> = records
        .iter()
        .map(|r| {
            let reference = reference_price(series, r.ex_date);
            DividendYield {
                ex_date: r.ex_date,
                cash_amount: r.cash_amount,
                reference_price: reference,
                yield_pct: reference.filter(|p| *p > 0.0).map(|p| r.cash_amount / p * 100.0),
            }
        })
        .collect();
    dividends.sort_by(|a, b| b.ex_date.cmp(&a.ex_date));

    DividendSummary {
        current_price,
        ttm_total,
        ttm_yield_pct: current_price.and_then(pct_of),
        yield_on_cost_pct: average_price.and_then(pct_of),
        dividends,
    }
}
