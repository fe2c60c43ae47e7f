use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{dumb_money, smart_money};

/// One CCASS participant's holding of a stock on a CCASS date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareholdingRecord {
    pub symbol: String,
    pub participant_id: String,
    pub participant_name: String,
    /// Date shown on the CCASS search page
    pub ccass_date: NaiveDate,
    pub shareholding_amount: f64,
}

/// Daily close of a stock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosePrice {
    pub symbol: String,
    pub as_of_date: NaiveDate,
    pub close: f64,
}

/// Participant bucket used by the smart/dumb money comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoneyClass {
    /// Global investment banks
    Smart,
    /// Retail-facing brokers
    Dumb,
    /// Everyone else
    Other,
}

impl MoneyClass {
    pub fn of_participant(participant_id: &str) -> Self {
        let id = participant_id.trim();
        if smart_money::ALL.contains(&id) {
            MoneyClass::Smart
        } else if dumb_money::ALL.contains(&id) {
            MoneyClass::Dumb
        } else {
            MoneyClass::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoneyClass::Smart => "Smart",
            MoneyClass::Dumb => "Dumb",
            MoneyClass::Other => "Other",
        }
    }
}

impl fmt::Display for MoneyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Spearman correlation between one participant's holding and the close price
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantCorrelation {
    pub symbol: String,
    pub participant_id: String,
    pub participant_name: String,
    pub money_class: MoneyClass,
    pub average_shareholding_amount: f64,
    pub observations: usize,
    /// `None` when fewer than three observations or either side is constant
    pub spearman_correlation: Option<f64>,
    pub p_value: Option<f64>,
    pub can_reject_null_hypothesis: bool,
}
