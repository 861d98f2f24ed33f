//! Operations shared by the spend and income resources. Every function takes
//! the store explicitly and reports failures as `ApiError`.

use chrono::{Local, Utc};
use uuid::Uuid;

use crate::aggregate;
use crate::calendar::MonthRange;
use crate::error::ApiError;
use crate::models::{CreateRecordRequest, DeleteAck, Overview, Record, RecordKind, Summary};
use crate::store::RecordStore;

pub fn create_record(
    store: &dyn RecordStore,
    kind: RecordKind,
    request: CreateRecordRequest,
) -> Result<Record, ApiError> {
    let record = request.validate_in(&Local, Utc::now())?;
    let created = store.insert(kind, record)?;
    tracing::info!(%kind, id = %created.id, sector = %created.sector, "record created");
    Ok(created)
}

pub fn list_by_sector(
    store: &dyn RecordStore,
    kind: RecordKind,
    sector: &str,
    month: Option<&str>,
) -> Result<Vec<Record>, ApiError> {
    let range = MonthRange::resolve(month)?;
    tracing::debug!(%kind, sector, month = %range.label(), "listing sector");
    Ok(store.list_in_range(kind, &range.to_utc(), Some(sector))?)
}

pub fn get_record(store: &dyn RecordStore, kind: RecordKind, id: &str) -> Result<Record, ApiError> {
    let parsed = parse_id(id)?;
    store.find(kind, parsed)?.ok_or_else(|| ApiError::NotFound {
        kind,
        id: id.to_string(),
    })
}

pub fn delete_record(
    store: &dyn RecordStore,
    kind: RecordKind,
    id: &str,
) -> Result<DeleteAck, ApiError> {
    let parsed = parse_id(id)?;
    if !store.delete(kind, parsed)? {
        return Err(ApiError::NotFound {
            kind,
            id: id.to_string(),
        });
    }
    tracing::info!(%kind, id = %parsed, "record deleted");
    Ok(DeleteAck {
        message: format!("{kind} deleted"),
        id: parsed,
    })
}

pub fn month_summary(
    store: &dyn RecordStore,
    kind: RecordKind,
    month: Option<&str>,
) -> Result<Summary, ApiError> {
    let range = MonthRange::resolve(month)?;
    summary_for(store, kind, &range)
}

pub fn month_overview(store: &dyn RecordStore, month: Option<&str>) -> Result<Overview, ApiError> {
    let range = MonthRange::resolve(month)?;
    let income = summary_for(store, RecordKind::Income, &range)?;
    let spend = summary_for(store, RecordKind::Spend, &range)?;
    Ok(aggregate::overview(range.label(), &income, &spend))
}

fn summary_for(
    store: &dyn RecordStore,
    kind: RecordKind,
    range: &MonthRange,
) -> Result<Summary, ApiError> {
    let records = store.list_in_range(kind, &range.to_utc(), None)?;
    tracing::debug!(%kind, month = %range.label(), records = records.len(), "summarizing");
    Ok(aggregate::summarize(&records))
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidId(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{DateInput, YearMonth};
    use crate::models::SectorTotal;
    use crate::store::testing::{FailingStore, MemoryStore};

    fn request(name: &str, sector: &str, amount: f64, date: Option<&str>) -> CreateRecordRequest {
        CreateRecordRequest {
            name: Some(name.to_string()),
            sector: Some(sector.to_string()),
            amount: Some(amount),
            note: None,
            date: date.map(|d| DateInput::Text(d.to_string())),
        }
    }

    #[test]
    fn create_without_date_lands_in_the_current_month() {
        let store = MemoryStore::default();
        let before = Utc::now();
        let created =
            create_record(&store, RecordKind::Spend, request("Coffee", "Food", 4.5, None)).unwrap();
        assert!(created.date >= before && created.date <= Utc::now());
        assert_eq!(created.note, "");

        let summary = month_summary(&store, RecordKind::Spend, None).unwrap();
        let food = summary
            .by_sector
            .iter()
            .find(|group| group.sector == "Food")
            .unwrap();
        assert!(food.amount >= 4.5);
        assert!(summary.total >= 4.5);
    }

    #[test]
    fn invalid_create_persists_nothing() {
        let store = MemoryStore::default();
        let missing_sector = CreateRecordRequest {
            name: Some("Coffee".into()),
            amount: Some(4.5),
            ..Default::default()
        };
        assert!(matches!(
            create_record(&store, RecordKind::Spend, missing_sector),
            Err(ApiError::Validation(_))
        ));
        assert_eq!(store.count(RecordKind::Spend), 0);
    }

    #[test]
    fn delete_then_get_is_not_found() {
        let store = MemoryStore::default();
        let created =
            create_record(&store, RecordKind::Income, request("Salary", "Work", 3000.0, None))
                .unwrap();
        let id = created.id.to_string();

        assert_eq!(get_record(&store, RecordKind::Income, &id).unwrap(), created);
        let ack = delete_record(&store, RecordKind::Income, &id).unwrap();
        assert_eq!(ack.message, "Income deleted");
        assert_eq!(ack.id, created.id);
        assert!(matches!(
            get_record(&store, RecordKind::Income, &id),
            Err(ApiError::NotFound { .. })
        ));
        assert!(matches!(
            delete_record(&store, RecordKind::Income, &id),
            Err(ApiError::NotFound { .. })
        ));
    }

    #[test]
    fn malformed_ids_are_rejected() {
        let store = MemoryStore::default();
        assert!(matches!(
            get_record(&store, RecordKind::Spend, "not-an-id"),
            Err(ApiError::InvalidId(_))
        ));
        assert!(matches!(
            delete_record(&store, RecordKind::Spend, "42"),
            Err(ApiError::InvalidId(_))
        ));
    }

    #[test]
    fn sector_listing_filters_and_sorts() {
        let store = MemoryStore::default();
        for (name, sector, amount, date) in [
            ("Lunch", "Food", 12.0, "2024-02-05T12:00:00Z"),
            ("Dinner", "Food", 30.0, "2024-02-20T19:00:00Z"),
            ("Groceries", "food", 50.0, "2024-02-21T10:00:00Z"),
            ("Brunch", "Food", 18.0, "2024-03-02T11:00:00Z"),
            ("Rent", "Housing", 900.0, "2024-02-01T09:00:00Z"),
        ] {
            create_record(&store, RecordKind::Spend, request(name, sector, amount, Some(date)))
                .unwrap();
        }

        let listed = list_by_sector(&store, RecordKind::Spend, "Food", Some("2024-02")).unwrap();
        let names = listed.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Dinner", "Lunch"]);

        let none = list_by_sector(&store, RecordKind::Spend, "Travel", Some("2024-02")).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn summary_groups_the_requested_month() {
        let store = MemoryStore::default();
        for (sector, amount, date) in [
            ("Food", 4.5, "2024-02-10T12:00:00Z"),
            ("Food", 5.5, "2024-02-11T12:00:00Z"),
            ("Rent", 900.0, "2024-02-12T12:00:00Z"),
            ("Food", 100.0, "2024-04-12T12:00:00Z"),
        ] {
            create_record(&store, RecordKind::Spend, request("x", sector, amount, Some(date)))
                .unwrap();
        }

        let summary = month_summary(&store, RecordKind::Spend, Some("2024-02")).unwrap();
        assert_eq!(summary.total, 910.0);
        assert_eq!(
            summary.by_sector,
            vec![
                SectorTotal {
                    sector: "Food".into(),
                    amount: 10.0
                },
                SectorTotal {
                    sector: "Rent".into(),
                    amount: 900.0
                },
            ]
        );

        let empty = month_summary(&store, RecordKind::Spend, Some("2023-02")).unwrap();
        assert_eq!(empty.total, 0.0);
        assert!(empty.by_sector.is_empty());
    }

    #[test]
    fn overview_combines_both_collections() {
        let store = MemoryStore::default();
        create_record(
            &store,
            RecordKind::Income,
            request("Salary", "Work", 3000.0, Some("2024-02-15T12:00:00Z")),
        )
        .unwrap();
        create_record(
            &store,
            RecordKind::Spend,
            request("Rent", "Housing", 1200.0, Some("2024-02-15T12:00:00Z")),
        )
        .unwrap();

        let overview = month_overview(&store, Some("2024-02")).unwrap();
        assert_eq!(overview.month, "2024-02");
        assert_eq!(overview.income, 3000.0);
        assert_eq!(overview.spend, 1200.0);
        assert_eq!(overview.net, 1800.0);
    }

    #[test]
    fn bad_months_are_validation_errors() {
        let store = MemoryStore::default();
        assert!(matches!(
            month_summary(&store, RecordKind::Spend, Some("2024-13")),
            Err(ApiError::Month(_))
        ));
        assert!(matches!(
            list_by_sector(&store, RecordKind::Income, "Work", Some("feb")),
            Err(ApiError::Month(_))
        ));
    }

    #[test]
    fn store_failures_surface_as_store_errors() {
        let store = FailingStore;
        assert!(matches!(
            create_record(&store, RecordKind::Spend, request("Coffee", "Food", 4.5, None)),
            Err(ApiError::Store(_))
        ));
        assert!(matches!(
            month_summary(&store, RecordKind::Spend, None),
            Err(ApiError::Store(_))
        ));
        let id = Uuid::new_v4().to_string();
        assert!(matches!(
            get_record(&store, RecordKind::Spend, &id),
            Err(ApiError::Store(_))
        ));
    }

    #[test]
    fn month_boundaries_follow_the_local_calendar() {
        let store = MemoryStore::default();
        let range = YearMonth::new(2024, 2).unwrap().range_in(&Local).unwrap();
        let first = range.start.to_rfc3339();
        let next = range.end.to_rfc3339();
        create_record(
            &store,
            RecordKind::Spend,
            request("a", "Edge", 1.0, Some(first.as_str())),
        )
        .unwrap();
        create_record(
            &store,
            RecordKind::Spend,
            request("b", "Edge", 2.0, Some(next.as_str())),
        )
        .unwrap();

        let summary = month_summary(&store, RecordKind::Spend, Some("2024-02")).unwrap();
        assert_eq!(summary.total, 1.0);
    }
}
