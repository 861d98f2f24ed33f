use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::calendar::MonthRange;
use crate::error::StoreError;
use crate::models::{NewRecord, Record, RecordKind};

/// Document-style access to the spend and income collections.
pub trait RecordStore: Send + Sync {
    /// Stores a record, assigning its id and timestamps.
    fn insert(&self, kind: RecordKind, record: NewRecord) -> Result<Record, StoreError>;

    fn find(&self, kind: RecordKind, id: Uuid) -> Result<Option<Record>, StoreError>;

    /// Returns `false` when no record had that id.
    fn delete(&self, kind: RecordKind, id: Uuid) -> Result<bool, StoreError>;

    /// Records dated inside `range`, newest first, optionally restricted to
    /// one sector (exact match).
    fn list_in_range(
        &self,
        kind: RecordKind,
        range: &MonthRange<Utc>,
        sector: Option<&str>,
    ) -> Result<Vec<Record>, StoreError>;
}

/// The store handle shared through Rocket managed state.
pub type SharedStore = Arc<dyn RecordStore>;
