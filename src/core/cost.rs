//! Cost records and their input validation

use super::error::{CostError, CostResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "ILS")]
    Ils,
    #[serde(rename = "GBP")]
    Gbp,
    #[serde(rename = "EURO")]
    Euro,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Ils, Currency::Gbp, Currency::Euro];

    /// Code used as the key in rate tables.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Ils => "ILS",
            Currency::Gbp => "GBP",
            Currency::Euro => "EURO",
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = CostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "ILS" => Ok(Currency::Ils),
            "GBP" => Ok(Currency::Gbp),
            "EURO" | "EUR" => Ok(Currency::Euro),
            _ => Err(CostError::Validation(format!("Unknown currency: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Category {
    Food,
    Health,
    Housing,
    Sport,
    Education,
    Transportation,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Food,
        Category::Health,
        Category::Housing,
        Category::Sport,
        Category::Education,
        Category::Transportation,
        Category::Other,
    ];
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Category::Food => "Food",
                Category::Health => "Health",
                Category::Housing => "Housing",
                Category::Sport => "Sport",
                Category::Education => "Education",
                Category::Transportation => "Transportation",
                Category::Other => "Other",
            }
        )
    }
}

impl FromStr for Category {
    type Err = CostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CostError::Validation(format!("Unknown category: {s}")))
    }
}

/// A persisted expense. `sum` is kept in the currency it was entered in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    pub id: u64,
    pub sum: f64,
    pub currency: Currency,
    pub category: Category,
    pub description: String,
    pub date: NaiveDate,
}

/// Input for adding a cost; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCost {
    pub sum: f64,
    pub currency: Currency,
    pub category: Category,
    pub description: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl NewCost {
    pub fn validate(&self) -> CostResult<()> {
        if !self.sum.is_finite() {
            return Err(CostError::Validation(format!(
                "Sum must be a finite number, got {}",
                self.sum
            )));
        }
        if self.sum <= 0.0 {
            return Err(CostError::Validation(format!(
                "Sum must be positive, got {}",
                self.sum
            )));
        }
        if self.description.trim().is_empty() {
            return Err(CostError::Validation(
                "Description cannot be empty".into(),
            ));
        }
        Ok(())
    }

    /// Builds the stored record, falling back to `today` when no date was given.
    /// Callers must run [`NewCost::validate`] first.
    pub fn into_record(self, id: u64, today: NaiveDate) -> CostRecord {
        CostRecord {
            id,
            sum: self.sum,
            currency: self.currency,
            category: self.category,
            description: self.description.trim().to_string(),
            date: self.date.unwrap_or(today),
        }
    }
}
