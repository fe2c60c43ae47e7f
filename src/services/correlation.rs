//! CCASS shareholding vs. stock price correlation
//!
//! Shareholding is reported on the CCASS date, which trails the trade date by
//! the T+2 settlement cycle. Each row is moved back to its stock position date,
//! joined with that day's close, and every (symbol, participant) pair is then
//! scored with Spearman's rank correlation.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::collections::{BTreeMap, HashMap};

use crate::constants::ALLOWED_P_VALUES;
use crate::error::{Error, Result};
use crate::models::{ClosePrice, MoneyClass, ParticipantCorrelation, ShareholdingRecord};

/// Settlement lag between trade date and CCASS date, in weekdays
pub const SETTLEMENT_DAYS: u32 = 2;

/// Trade date whose position a CCASS date reports
///
/// Weekend dates roll back to Friday first, then the settlement lag is
/// stepped back over weekdays. Exchange holidays are not modeled.
pub fn stock_position_date(ccass_date: NaiveDate) -> NaiveDate {
    let mut date = ccass_date;
    while is_weekend(date) {
        date = date - Duration::days(1);
    }

    let mut remaining = SETTLEMENT_DAYS;
    while remaining > 0 {
        date = date - Duration::days(1);
        if !is_weekend(date) {
            remaining -= 1;
        }
    }
    date
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Min-max scale to [0, 1]; a constant series scales to all zeros
pub fn min_max_scale(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    values
        .iter()
        .map(|v| if range > 0.0 { (v - min) / range } else { 0.0 })
        .collect()
}

/// 1-based ranks; tied values share the average of their ranks
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // positions i..=j hold ranks i+1..=j+1
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = rank;
        }
        i = j + 1;
    }
    ranks
}

fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}

/// Spearman's rho with its two-sided p-value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpearmanResult {
    pub correlation: f64,
    pub p_value: f64,
}

/// Spearman rank correlation of two equally long samples
///
/// Returns `Ok(None)` when the statistic is undefined: fewer than three
/// observations, or a constant sample. The p-value uses Student's t with
/// `n - 2` degrees of freedom.
pub fn spearman(x: &[f64], y: &[f64]) -> Result<Option<SpearmanResult>> {
    if x.len() != y.len() {
        return Err(Error::InvalidInput(format!(
            "samples differ in length: {} vs {}",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 3 {
        return Ok(None);
    }

    let Some(rho) = pearson(&average_ranks(x), &average_ranks(y)) else {
        return Ok(None);
    };

    let df = (x.len() - 2) as f64;
    let p_value = if rho.abs() >= 1.0 {
        0.0
    } else {
        let t = rho * (df / (1.0 - rho * rho)).sqrt();
        let dist = StudentsT::new(0.0, 1.0, df)
            .map_err(|e| Error::Other(format!("Student's t distribution: {}", e)))?;
        (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0)
    };

    Ok(Some(SpearmanResult {
        correlation: rho,
        p_value,
    }))
}

/// One shareholding row matched with the close on its stock position date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedObservation {
    pub symbol: String,
    pub participant_id: String,
    pub participant_name: String,
    pub position_date: NaiveDate,
    pub shareholding_amount: f64,
    pub scaled_shareholding_amount: f64,
    pub close: f64,
    pub scaled_close: f64,
}

/// Join shareholding rows with close prices on (symbol, position date)
///
/// Scaling happens before the join: shareholding per (symbol, participant)
/// over all its rows, close per symbol over all its rows. Rows without a
/// matching close are dropped. Output is ordered by position date.
pub fn join_with_prices(
    holdings: &[ShareholdingRecord],
    closes: &[ClosePrice],
) -> Vec<JoinedObservation> {
    let mut scaled_holdings: HashMap<(&str, &str), Vec<usize>> = HashMap::new();
    for (i, record) in holdings.iter().enumerate() {
        scaled_holdings
            .entry((record.symbol.as_str(), record.participant_id.as_str()))
            .or_default()
            .push(i);
    }
    let mut holding_scale = vec![0.0; holdings.len()];
    for indices in scaled_holdings.values() {
        let amounts: Vec<f64> = indices.iter().map(|&i| holdings[i].shareholding_amount).collect();
        for (&i, scaled) in indices.iter().zip(min_max_scale(&amounts)) {
            holding_scale[i] = scaled;
        }
    }

    let mut closes_by_symbol: HashMap<&str, Vec<&ClosePrice>> = HashMap::new();
    for close in closes {
        closes_by_symbol.entry(close.symbol.as_str()).or_default().push(close);
    }
    let mut close_lookup: HashMap<(&str, NaiveDate), (f64, f64)> = HashMap::new();
    for (symbol, rows) in &closes_by_symbol {
        let values: Vec<f64> = rows.iter().map(|c| c.close).collect();
        for (row, scaled) in rows.iter().zip(min_max_scale(&values)) {
            close_lookup.insert((*symbol, row.as_of_date), (row.close, scaled));
        }
    }

    let mut joined: Vec<JoinedObservation> = holdings
        .iter()
        .enumerate()
        .filter_map(|(i, record)| {
            let position_date = stock_position_date(record.ccass_date);
            let &(close, scaled_close) =
                close_lookup.get(&(record.symbol.as_str(), position_date))?;
            Some(JoinedObservation {
                symbol: record.symbol.clone(),
                participant_id: record.participant_id.clone(),
                participant_name: record.participant_name.clone(),
                position_date,
                shareholding_amount: record.shareholding_amount,
                scaled_shareholding_amount: holding_scale[i],
                close,
                scaled_close,
            })
        })
        .collect();

    joined.sort_by(|a, b| {
        a.position_date
            .cmp(&b.position_date)
            .then_with(|| a.symbol.cmp(&b.symbol))
            .then_with(|| a.participant_id.cmp(&b.participant_id))
    });
    joined
}

/// Reject significance levels other than the ones the report offers
pub fn validate_p_value(max_p_value: f64) -> Result<()> {
    if ALLOWED_P_VALUES.iter().any(|&p| p == max_p_value) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "max p-value must be one of {:?}, got {}",
            ALLOWED_P_VALUES, max_p_value
        )))
    }
}

/// Spearman correlation per (symbol, participant)
///
/// Sorted by symbol, then by average shareholding, largest first.
pub fn correlate_participants(
    joined: &[JoinedObservation],
    max_p_value: f64,
) -> Result<Vec<ParticipantCorrelation>> {
    validate_p_value(max_p_value)?;

    let mut groups: BTreeMap<(&str, &str), Vec<&JoinedObservation>> = BTreeMap::new();
    for row in joined {
        groups
            .entry((row.symbol.as_str(), row.participant_id.as_str()))
            .or_default()
            .push(row);
    }

    let mut results = Vec::with_capacity(groups.len());
    for ((symbol, participant_id), rows) in groups {
        let amounts: Vec<f64> = rows.iter().map(|r| r.shareholding_amount).collect();
        let closes: Vec<f64> = rows.iter().map(|r| r.close).collect();
        let stats = spearman(&amounts, &closes)?;

        let can_reject = stats.map_or(false, |s| s.p_value <= max_p_value);
        if stats.is_none() {
            tracing::debug!(symbol, participant_id, observations = rows.len(), "Correlation undefined");
        }

        results.push(ParticipantCorrelation {
            symbol: symbol.to_string(),
            participant_id: participant_id.to_string(),
            participant_name: rows[0].participant_name.clone(),
            money_class: MoneyClass::of_participant(participant_id),
            average_shareholding_amount: amounts.iter().sum::<f64>() / amounts.len() as f64,
            observations: rows.len(),
            spearman_correlation: stats.map(|s| s.correlation),
            p_value: stats.map(|s| s.p_value),
            can_reject_null_hypothesis: can_reject,
        });
    }

    results.sort_by(|a, b| {
        a.symbol.cmp(&b.symbol).then_with(|| {
            b.average_shareholding_amount
                .total_cmp(&a.average_shareholding_amount)
        })
    });

    tracing::info!(
        pairs = results.len(),
        significant = results.iter().filter(|r| r.can_reject_null_hypothesis).count(),
        max_p_value,
        "Computed participant correlations"
    );

    Ok(results)
}
