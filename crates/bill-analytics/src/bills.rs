//! Utility bill data model
//!
//! Bills, budgets and the savings target are owned by the external store.
//! Everything here is read-only input to the analytics pipeline.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::StoreError;
use crate::filter::UtilityFilter;

/// One utility invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    /// Identifier assigned by the store
    pub id: i64,
    pub utility_type: UtilityType,
    pub amount: f64,
    /// Usage quantity; the unit is implied by the utility type
    #[serde(default)]
    pub usage_amount: Option<f64>,
    #[serde(with = "date_field")]
    pub bill_date: NaiveDate,
    #[serde(with = "date_field")]
    pub due_date: NaiveDate,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "pending".to_string()
}

impl Bill {
    /// Zero-based month of the bill date (0 = January)
    pub fn month_index(&self) -> usize {
        self.bill_date.month0() as usize
    }

    pub fn year(&self) -> i32 {
        self.bill_date.year()
    }
}

/// Utility type. Known types get their own variant; anything else the
/// store sends is kept verbatim so it still groups on its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UtilityType {
    Electricity,
    Water,
    Gas,
    Internet,
    Phone,
    CableTv,
    Other,
    Custom(String),
}

impl UtilityType {
    /// Parse a type name, case-insensitively for the known types
    pub fn parse(name: &str) -> Self {
        let trimmed = name.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "electricity" | "electric" => UtilityType::Electricity,
            "water" => UtilityType::Water,
            "gas" => UtilityType::Gas,
            "internet" => UtilityType::Internet,
            "phone" => UtilityType::Phone,
            "cable tv" | "cable_tv" | "cabletv" | "cable" => UtilityType::CableTv,
            "other" => UtilityType::Other,
            _ => UtilityType::Custom(trimmed.to_string()),
        }
    }

    /// Usage unit shown next to `usage_amount`
    pub fn usage_unit(&self) -> Option<&'static str> {
        match self {
            UtilityType::Electricity => Some("kWh"),
            UtilityType::Water => Some("Gallons"),
            UtilityType::Gas => Some("Therms"),
            UtilityType::Internet => Some("GB"),
            _ => None,
        }
    }
}

impl std::fmt::Display for UtilityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UtilityType::Electricity => write!(f, "Electricity"),
            UtilityType::Water => write!(f, "Water"),
            UtilityType::Gas => write!(f, "Gas"),
            UtilityType::Internet => write!(f, "Internet"),
            UtilityType::Phone => write!(f, "Phone"),
            UtilityType::CableTv => write!(f, "Cable TV"),
            UtilityType::Other => write!(f, "Other"),
            UtilityType::Custom(name) => write!(f, "{}", name),
        }
    }
}

impl From<String> for UtilityType {
    fn from(value: String) -> Self {
        UtilityType::parse(&value)
    }
}

impl From<UtilityType> for String {
    fn from(value: UtilityType) -> Self {
        value.to_string()
    }
}

/// Annual budget ceilings keyed by utility type name or "all"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Budgets(BTreeMap<String, f64>);

impl Budgets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, amount: f64) {
        self.0.insert(key.into(), amount);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Budget configured for the active filter.
    ///
    /// Keys match case-insensitively. A zero, negative or non-finite
    /// budget counts as not configured.
    pub fn for_filter(&self, filter: &UtilityFilter) -> Option<f64> {
        let key = filter.budget_key();
        let amount = self.0.get(&key).copied().or_else(|| {
            self.0
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(&key))
                .map(|(_, v)| *v)
        })?;

        (amount.is_finite() && amount > 0.0).then_some(amount)
    }
}

/// Annual target reduction in total spend versus the prior year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavingsTarget {
    pub amount: f64,
}

impl SavingsTarget {
    /// A target must be positive to measure progress against
    pub fn is_configured(&self) -> bool {
        self.amount.is_finite() && self.amount > 0.0
    }
}

/// Sum of bill amounts
pub fn total_amount(bills: &[Bill]) -> f64 {
    bills.iter().map(|b| b.amount).sum()
}

/// Sum of bill amounts for one calendar year
pub fn total_for_year(bills: &[Bill], year: i32) -> f64 {
    bills
        .iter()
        .filter(|b| b.year() == year)
        .map(|b| b.amount)
        .sum()
}

/// Sort bills chronologically by bill date (stable for equal dates)
pub fn sort_by_date(bills: &mut [Bill]) {
    bills.sort_by_key(|b| b.bill_date);
}

/// Load bills from a CSV file with a header row matching the field names
pub fn load_from_csv(path: &Path) -> Result<Vec<Bill>, StoreError> {
    let mut rdr = csv::Reader::from_path(path)?;
    let bills = rdr.deserialize().collect::<Result<Vec<Bill>, _>>()?;
    Ok(bills)
}

/// Load bills from a JSON array
pub fn load_from_json(path: &Path) -> Result<Vec<Bill>, StoreError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Export bills to CSV (for backup)
pub fn export_to_csv(bills: &[Bill], path: &Path) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for bill in bills {
        wtr.serialize(bill)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Bill dates arrive as plain dates or as ISO timestamps; only the
/// calendar date is kept.
mod date_field {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let date_part = raw.trim().get(..10).unwrap_or(raw.trim());
        NaiveDate::parse_from_str(date_part, FORMAT).map_err(serde::de::Error::custom)
    }
}
