//! Analytics query types: measure allow-list, gender category, filters, and
//! response DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::errors::AppError;

/// The six tracked measures in the analytics table.
///
/// This enum is the allow-list between client input and SQL: a feature name
/// from the query string is parsed into a variant first, and only the static
/// identifier returned by [`Feature::column`] ever reaches query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Feature {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Feature {
    /// Parse a client-supplied feature name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "a" => Some(Self::A),
            "b" => Some(Self::B),
            "c" => Some(Self::C),
            "d" => Some(Self::D),
            "e" => Some(Self::E),
            "f" => Some(Self::F),
            _ => None,
        }
    }

    /// Column identifier in the analytics table.
    pub fn column(&self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::D => "d",
            Self::E => "e",
            Self::F => "f",
        }
    }
}

/// Canonical gender category as stored in the analytics table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Parse a client-supplied value, case-insensitively. "male", "MALE" and
    /// "Male" are all the same category; anything else is not a gender.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            _ => None,
        }
    }

    /// Stored representation, matching the analytics table values.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

/// Validated filter set shared by both aggregation queries.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsFilters {
    pub age: Option<String>,
    pub gender: Option<Gender>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

fn parse_gender(raw: Option<String>) -> Result<Option<Gender>, AppError> {
    raw.map(|g| {
        Gender::parse(&g).ok_or_else(|| AppError::Validation(format!("Unknown gender: {g}")))
    })
    .transpose()
}

/// Query parameters for the aggregate summary endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryParams {
    pub age: Option<String>,
    pub gender: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl SummaryParams {
    pub fn into_filters(self) -> Result<AnalyticsFilters, AppError> {
        Ok(AnalyticsFilters {
            age: self.age,
            gender: parse_gender(self.gender)?,
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

/// Query parameters for the timeseries endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeseriesParams {
    pub feature: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl TimeseriesParams {
    /// Resolve the required feature parameter against the allow-list.
    pub fn feature(&self) -> Result<Feature, AppError> {
        let raw = self.feature.as_deref().ok_or_else(|| {
            AppError::Validation("Missing required 'feature' query parameter".to_string())
        })?;
        Feature::parse(raw)
            .ok_or_else(|| AppError::Validation(format!("Unknown feature: {raw}")))
    }

    pub fn into_filters(self) -> Result<AnalyticsFilters, AppError> {
        Ok(AnalyticsFilters {
            age: self.age,
            gender: parse_gender(self.gender)?,
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

/// Summed totals for all six measures. Missing aggregates default to zero at
/// the SQL layer, so an empty table serializes as all zeros.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "UPPERCASE")]
pub struct FeatureTotals {
    pub a: i64,
    pub b: i64,
    pub c: i64,
    pub d: i64,
    pub e: i64,
    pub f: i64,
}

/// One point in a per-day timeseries.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TimeseriesPoint {
    pub date: NaiveDate,
    pub value: i64,
}

/// Timeseries response: feature echo plus ordered per-day sums.
#[derive(Debug, Clone, Serialize)]
pub struct TimeseriesResponse {
    pub feature: Feature,
    pub data: Vec<TimeseriesPoint>,
}
