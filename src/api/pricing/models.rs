// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Pricing row types and normalization

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    NM,
    LP,
    MP,
    HP,
    DMG,
}

impl Condition {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "NM" => Some(Condition::NM),
            "LP" => Some(Condition::LP),
            "MP" => Some(Condition::MP),
            "HP" => Some(Condition::HP),
            "DMG" => Some(Condition::DMG),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GradeAgency {
    PSA,
    BGS,
    CGC,
    ACE,
    AGS,
}

impl GradeAgency {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PSA" => Some(GradeAgency::PSA),
            "BGS" => Some(GradeAgency::BGS),
            "CGC" => Some(GradeAgency::CGC),
            "ACE" => Some(GradeAgency::ACE),
            "AGS" => Some(GradeAgency::AGS),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    Sold,
    List,
    Auction,
}

impl ListingType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sold" => Some(ListingType::Sold),
            "list" => Some(ListingType::List),
            "auction" => Some(ListingType::Auction),
            _ => None,
        }
    }
}

/// One observed price as submitted. Identity is either `card_id` or the
/// `(set_id, number, variant)` triple; grading fields are used when the
/// raw `condition` is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRow {
    #[serde(default)]
    pub card_id: Option<String>,
    #[serde(default)]
    pub set_id: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub variant: Option<String>,

    pub source: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub price: f64,
    pub observed_at: DateTime<Utc>,

    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub grade_agency: Option<String>,
    #[serde(default)]
    pub grade_value: Option<String>,
    #[serde(default)]
    pub grade_qualifier: Option<String>,

    #[serde(default)]
    pub listing_type: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_quantity() -> i64 {
    1
}

/// A validated row with enums resolved.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedRow {
    pub card_id: Option<String>,
    pub set_id: Option<String>,
    pub number: Option<String>,
    pub variant: Option<String>,

    pub source: String,
    pub price_usd: f64,
    pub observed_at: DateTime<Utc>,

    pub condition: Option<Condition>,
    pub grade_agency: Option<GradeAgency>,
    pub grade_value: Option<String>,
    pub grade_qualifier: Option<String>,
    pub listing_type: Option<ListingType>,
    pub quantity: i64,
    pub notes: Option<String>,
}

impl NormalizedRow {
    /// Dedup key within a batch: the same print from the same source at
    /// the same instant describes one observation.
    pub fn dedup_key(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}",
            self.card_id.as_deref().unwrap_or(""),
            self.set_id.as_deref().unwrap_or(""),
            self.number.as_deref().unwrap_or(""),
            self.variant.as_deref().unwrap_or(""),
            self.source,
            self.observed_at.timestamp_millis(),
        )
    }
}

/// Why a row was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFault {
    MissingIdentity,
    MissingSource,
    NonPositivePrice,
    MissingConditionOrGrade,
    UnknownCondition(String),
    UnknownAgency(String),
    UnknownListingType(String),
}

impl PriceRow {
    /// Validate and normalize one row. Faulty rows are quarantined by
    /// the importer, not fatal to the batch.
    pub fn normalize(&self) -> Result<NormalizedRow, RowFault> {
        let has_card_id = self.card_id.as_deref().map(|s| !s.is_empty()).unwrap_or(false);
        let has_print = self.set_id.as_deref().map(|s| !s.is_empty()).unwrap_or(false)
            && self.number.as_deref().map(|s| !s.is_empty()).unwrap_or(false);
        if !has_card_id && !has_print {
            return Err(RowFault::MissingIdentity);
        }

        if self.source.trim().is_empty() {
            return Err(RowFault::MissingSource);
        }
        if !(self.price > 0.0) || !self.price.is_finite() {
            return Err(RowFault::NonPositivePrice);
        }

        let condition = match &self.condition {
            Some(raw) if !raw.trim().is_empty() => Some(
                Condition::parse(raw).ok_or_else(|| RowFault::UnknownCondition(raw.clone()))?,
            ),
            _ => None,
        };
        let grade_agency = match &self.grade_agency {
            Some(raw) if !raw.trim().is_empty() => Some(
                GradeAgency::parse(raw).ok_or_else(|| RowFault::UnknownAgency(raw.clone()))?,
            ),
            _ => None,
        };
        let graded = grade_agency.is_some() && self.grade_value.is_some();
        if condition.is_none() && !graded {
            return Err(RowFault::MissingConditionOrGrade);
        }

        let listing_type = match &self.listing_type {
            Some(raw) if !raw.trim().is_empty() => Some(
                ListingType::parse(raw)
                    .ok_or_else(|| RowFault::UnknownListingType(raw.clone()))?,
            ),
            _ => None,
        };

        Ok(NormalizedRow {
            card_id: self.card_id.clone(),
            set_id: self.set_id.clone(),
            number: self.number.clone(),
            variant: self.variant.clone(),
            source: self.source.trim().to_string(),
            price_usd: self.price,
            observed_at: self.observed_at,
            condition,
            grade_agency,
            grade_value: self.grade_value.clone(),
            grade_qualifier: self.grade_qualifier.clone(),
            listing_type,
            quantity: self.quantity,
            notes: self.notes.clone(),
        })
    }
}

/// Batch import summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub inserted: u64,
    pub updated: u64,
    pub skipped: u64,
    pub errors: u64,
    pub quarantined: u64,
    pub duration_ms: u64,
}
