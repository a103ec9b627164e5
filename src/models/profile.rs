//! Traveler profile model and its stored representation

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Date of birth format used by the profile store
pub const DATE_OF_BIRTH_FORMAT: &str = "%d/%m/%Y";

/// Encoding of multi-valued profile fields as comma-joined text.
///
/// Every split and join of a stored list goes through here. Labels can't
/// contain commas since there is no escaping.
pub mod list_codec {
    use crate::error::StorageError;

    /// Split a stored list, trimming entries and dropping empty ones
    #[must_use]
    pub fn split(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Join labels for storage, rejecting ones that would not split back
    pub fn join(labels: &[String]) -> Result<String, StorageError> {
        let mut cleaned = Vec::with_capacity(labels.len());
        for label in labels {
            let trimmed = label.trim();
            if trimmed.is_empty() {
                return Err(StorageError::InvalidLabel {
                    label: label.clone(),
                    message: "label is blank".to_string(),
                });
            }
            if trimmed.contains(',') {
                return Err(StorageError::InvalidLabel {
                    label: label.clone(),
                    message: "label contains a comma".to_string(),
                });
            }
            cleaned.push(trimmed);
        }
        Ok(cleaned.join(","))
    }
}

/// Profile row as held by the profile store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileRecord {
    /// `DD/MM/YYYY`
    pub date_of_birth: String,
    pub hobbies: String,
    pub dietary_restrictions: String,
    pub accessibilities: String,
}

/// Decoded traveler profile, read-only to the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: u64,
    pub date_of_birth: NaiveDate,
    /// Ordered, may contain duplicates
    pub hobbies: Vec<String>,
    pub dietary_restrictions: Vec<String>,
    pub accessibilities: Vec<String>,
}

impl UserProfile {
    /// Decode a stored record. Missing list fields decode to empty lists.
    pub fn from_record(user_id: u64, record: &ProfileRecord) -> Result<Self, StorageError> {
        let date_of_birth =
            NaiveDate::parse_from_str(record.date_of_birth.trim(), DATE_OF_BIRTH_FORMAT)
                .map_err(|e| {
                    StorageError::corrupt(
                        user_id.to_string(),
                        format!("invalid date of birth '{}': {e}", record.date_of_birth),
                    )
                })?;

        Ok(Self {
            user_id,
            date_of_birth,
            hobbies: list_codec::split(&record.hobbies),
            dietary_restrictions: list_codec::split(&record.dietary_restrictions),
            accessibilities: list_codec::split(&record.accessibilities),
        })
    }

    pub fn to_record(&self) -> Result<ProfileRecord, StorageError> {
        Ok(ProfileRecord {
            date_of_birth: self.date_of_birth.format(DATE_OF_BIRTH_FORMAT).to_string(),
            hobbies: list_codec::join(&self.hobbies)?,
            dietary_restrictions: list_codec::join(&self.dietary_restrictions)?,
            accessibilities: list_codec::join(&self.accessibilities)?,
        })
    }
}

/// Whole years between `date_of_birth` and `today`
#[must_use]
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> u32 {
    today.years_since(date_of_birth).unwrap_or(0)
}

/// Day and month match `today`; 29 February counts on 28 February in common years
#[must_use]
pub fn is_birthday(date_of_birth: NaiveDate, today: NaiveDate) -> bool {
    let (month, day) = (date_of_birth.month(), date_of_birth.day());
    if month == today.month() && day == today.day() {
        return true;
    }
    month == 2 && day == 29 && !today.leap_year() && today.month() == 2 && today.day() == 28
}
