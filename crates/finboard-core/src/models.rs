//! Domain models for finboard

use num_format::{Locale, ToFormattedString};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Error, Result};

/// Income/expense/savings totals from `/analysis/total-summary`
///
/// Missing fields default to zero; a missing payload is represented by
/// `Option::None` at the call site, never by a zeroed summary.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryPayload {
    #[serde(rename = "totalIncome", default)]
    pub total_income: f64,
    #[serde(rename = "totalExpenses", default)]
    pub total_expenses: f64,
    #[serde(default)]
    pub savings: f64,
}

impl SummaryPayload {
    pub fn from_value(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::InvalidData(format!(
                "expected total summary object, got {}",
                json_kind(value)
            )));
        }
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Savings as a percentage of income, `None` when there is no income
    pub fn savings_rate(&self) -> Option<f64> {
        if self.total_income == 0.0 {
            None
        } else {
            Some(self.savings / self.total_income * 100.0)
        }
    }
}

/// One category of the spending breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpend {
    pub category: String,
    pub amount: f64,
}

/// Spending per category from `/analysis/spending-by-category`
///
/// Keeps the order in which the analysis service listed the categories.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpendingByCategory {
    categories: Vec<CategorySpend>,
}

impl SpendingByCategory {
    /// Build from `(category, amount)` pairs, rejecting duplicates and negative amounts
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut categories: Vec<CategorySpend> = Vec::new();
        for (category, amount) in pairs {
            let category = category.into();
            if !amount.is_finite() || amount < 0.0 {
                return Err(Error::InvalidData(format!(
                    "spending for '{}' must be a non-negative number",
                    category
                )));
            }
            if categories.iter().any(|c| c.category == category) {
                return Err(Error::InvalidData(format!(
                    "duplicate spending category '{}'",
                    category
                )));
            }
            categories.push(CategorySpend { category, amount });
        }
        Ok(Self { categories })
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            Error::InvalidData(format!(
                "expected spending object, got {}",
                json_kind(value)
            ))
        })?;

        let mut pairs = Vec::with_capacity(object.len());
        for (category, amount) in object {
            let amount = amount.as_f64().ok_or_else(|| {
                Error::InvalidData(format!("spending for '{}' is not a number", category))
            })?;
            pairs.push((category.clone(), amount));
        }
        Self::from_pairs(pairs)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategorySpend> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.amount)
    }

    pub fn total(&self) -> f64 {
        self.categories.iter().map(|c| c.amount).sum()
    }

    /// The `n` largest categories, descending; equal amounts keep their original order
    pub fn top(&self, n: usize) -> Vec<&CategorySpend> {
        let mut sorted: Vec<&CategorySpend> = self.categories.iter().collect();
        // sort_by is stable, which is what keeps ties in service order
        sorted.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        sorted.truncate(n);
        sorted
    }
}

impl Serialize for SpendingByCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for c in &self.categories {
            map.serialize_entry(&c.category, &c.amount)?;
        }
        map.end()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Languages offered for generated advice and speech
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(alias = "english", alias = "en")]
    English,
    #[serde(alias = "spanish", alias = "es")]
    Spanish,
    #[serde(alias = "french", alias = "fr")]
    French,
    #[serde(alias = "german", alias = "de")]
    German,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Spanish => "Spanish",
            Self::French => "French",
            Self::German => "German",
        }
    }

    /// ISO 639-1 code used by the speech service
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Spanish => "es",
            Self::French => "fr",
            Self::German => "de",
        }
    }

    pub fn all() -> &'static [Language] {
        &[Self::English, Self::Spanish, Self::French, Self::German]
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "english" | "en" => Ok(Self::English),
            "spanish" | "es" => Ok(Self::Spanish),
            "french" | "fr" => Ok(Self::French),
            "german" | "de" => Ok(Self::German),
            _ => Err(format!(
                "Unknown language: {} (expected English, Spanish, French or German)",
                s
            )),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity of a user-visible message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Error,
    Warning,
    Info,
    Success,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Success => "success",
        }
    }
}

/// A message shown to the user for the current request only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }
}

/// Notices collected during one request
pub type Notices = Vec<Notice>;

/// Format an amount with two decimals and comma thousands separators
pub fn format_amount(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{}{}.{:02}",
        sign,
        (cents / 100).to_formatted_string(&Locale::en),
        cents % 100
    )
}

/// Format a euro amount, e.g. `€1,234.50`
pub fn format_eur(amount: f64) -> String {
    format!("€{}", format_amount(amount))
}

/// Format a percentage with one decimal, e.g. `33.3%`
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}
