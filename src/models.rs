use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::DateInput;
use crate::error::ApiError;

/// The two record collections. They share one shape and one set of operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    Spend,
    Income,
}

impl RecordKind {
    pub const ALL: [RecordKind; 2] = [RecordKind::Spend, RecordKind::Income];

    pub fn table(self) -> &'static str {
        match self {
            RecordKind::Spend => "spends",
            RecordKind::Income => "incomes",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RecordKind::Spend => "Spend",
            RecordKind::Income => "Income",
        }
    }

    /// Path of a single record, used for `Location` headers.
    pub fn location(self, id: Uuid) -> String {
        format!("/api/{}/{}", self.table(), id)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: Uuid,
    pub name: String,
    pub sector: String,
    pub amount: f64,
    pub note: String,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated record that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub name: String,
    pub sector: String,
    pub amount: f64,
    pub note: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateRecordRequest {
    pub name: Option<String>,
    pub sector: Option<String>,
    pub amount: Option<f64>,
    pub note: Option<String>,
    pub date: Option<DateInput>,
}

impl CreateRecordRequest {
    /// Checks required fields and fills defaults. Naive dates are read in `tz`;
    /// a missing date becomes `now`.
    pub fn validate_in<Tz: TimeZone>(
        self,
        tz: &Tz,
        now: DateTime<Utc>,
    ) -> Result<NewRecord, ApiError> {
        let name = non_blank(self.name);
        let sector = non_blank(self.sector);
        let (Some(name), Some(sector), Some(amount)) = (name, sector, self.amount) else {
            return Err(ApiError::Validation(
                "name, sector and amount are required".into(),
            ));
        };
        let date = match self.date {
            None => now,
            Some(input) => input
                .resolve_in(tz)
                .ok_or_else(|| ApiError::Validation(format!("invalid date: {input:?}")))?,
        };
        Ok(NewRecord {
            name,
            sector,
            amount,
            note: self.note.unwrap_or_default(),
            date,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorTotal {
    pub sector: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: f64,
    pub by_sector: Vec<SectorTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub month: String,
    pub income: f64,
    pub spend: f64,
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteAck {
    pub message: String,
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
