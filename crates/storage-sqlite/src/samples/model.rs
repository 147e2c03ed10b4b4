//! Database models for price samples.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Text};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use pricewatch_core::errors::{DatabaseError, Result};
use pricewatch_core::PriceSample;

use crate::errors::StorageError;

/// Default name of the samples table.
pub const DEFAULT_SAMPLES_TABLE: &str = "symbols";

/// A validated SQL identifier naming the samples table.
///
/// Table names cannot be bound as query parameters, so only
/// `[A-Za-z_][A-Za-z0-9_]*` is accepted before it is spliced into SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleTable(String);

impl SampleTable {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        };
        if !valid {
            return Err(DatabaseError::InvalidTable(name).into());
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SampleTable {
    fn default() -> Self {
        Self(DEFAULT_SAMPLES_TABLE.to_string())
    }
}

impl fmt::Display for SampleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Row of the samples table.
#[derive(Debug, Clone, PartialEq, QueryableByName)]
pub struct SampleRowDB {
    #[diesel(sql_type = Text)]
    pub id: String,
    #[diesel(sql_type = Text)]
    pub symbol: String,
    #[diesel(sql_type = Double)]
    pub price: f64,
    #[diesel(sql_type = Text)]
    pub timestamp: String,
}

#[derive(Debug, QueryableByName)]
pub(crate) struct CountRow {
    #[diesel(sql_type = BigInt)]
    pub count: i64,
}

/// Fixed-width RFC 3339 so text ordering matches time ordering.
pub(crate) fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl SampleRowDB {
    pub fn from_sample(sample: &PriceSample) -> std::result::Result<Self, StorageError> {
        let price = sample.price.to_f64().ok_or_else(|| {
            StorageError::MalformedRow(format!("price {} does not fit a REAL", sample.price))
        })?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: sample.symbol.clone(),
            price,
            timestamp: format_timestamp(&sample.observed_at),
        })
    }
}

impl TryFrom<SampleRowDB> for PriceSample {
    type Error = StorageError;

    fn try_from(row: SampleRowDB) -> std::result::Result<Self, Self::Error> {
        let price = Decimal::from_f64(row.price)
            .ok_or_else(|| StorageError::MalformedRow(format!("row {}: price {}", row.id, row.price)))?
            .normalize();
        let observed_at = DateTime::parse_from_rfc3339(&row.timestamp)
            .map_err(|e| StorageError::MalformedRow(format!("row {}: timestamp {}", row.id, e)))?
            .with_timezone(&Utc);
        Ok(PriceSample::new(row.symbol, price, observed_at))
    }
}
