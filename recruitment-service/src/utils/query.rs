//! Shared query-string handling for list endpoints: pagination, sorting,
//! field projection and date filters.

use chrono::{NaiveDate, TimeZone, Utc};
use mongodb::bson::{doc, DateTime as BsonDateTime, Document};
use serde::Deserialize;
use service_core::error::AppError;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Common list parameters. Extra, endpoint-specific filters live in the
/// endpoint's own query struct and get merged into the filter document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub sort: Option<String>,
    pub fields: Option<String>,
}

impl ListParams {
    /// 1-based page, clamped to at least 1.
    pub fn page(&self) -> u64 {
        self.page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE)
    }

    /// Page size, clamped to 1..=MAX_LIMIT.
    pub fn limit(&self) -> u64 {
        self.limit
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT)
    }

    pub fn skip(&self) -> u64 {
        (self.page() - 1) * self.limit()
    }

    /// Sort spec: comma-separated field names, `-` prefix for descending.
    /// `-created_at,name` becomes `{created_at: -1, name: 1}`.
    pub fn sort_doc(&self, default: Document) -> Document {
        let Some(raw) = self.sort.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return default;
        };
        let mut sort = Document::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.strip_prefix('-') {
                Some(field) if !field.is_empty() => sort.insert(field, -1),
                _ => sort.insert(part, 1),
            };
        }
        if sort.is_empty() {
            default
        } else {
            sort
        }
    }

    /// Field names from the comma-separated `fields` list, or `None` for all.
    pub fn field_set(&self) -> Option<Vec<String>> {
        let raw = self.fields.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let fields: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
        if fields.is_empty() {
            None
        } else {
            Some(fields)
        }
    }
}

/// Narrows serialized response objects to the requested fields. `id` is
/// always kept so entries stay addressable.
pub fn select_fields(items: Vec<serde_json::Value>, params: &ListParams) -> Vec<serde_json::Value> {
    let Some(fields) = params.field_set() else {
        return items;
    };
    items
        .into_iter()
        .map(|mut item| {
            if let Some(obj) = item.as_object_mut() {
                obj.retain(|key, _| key == "id" || fields.iter().any(|f| f == key));
            }
            item
        })
        .collect()
}

pub fn total_pages(total: u64, limit: u64) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit)
}

/// Builds a `created_at` range filter from `%Y-%m-%d` bounds. Each bound is
/// inclusive of its whole day.
pub fn date_range_filter(start: Option<&str>, end: Option<&str>) -> Result<Option<Document>, AppError> {
    let mut range = Document::new();
    if let Some(start) = start.map(str::trim).filter(|s| !s.is_empty()) {
        range.insert("$gte", start_of_day(start)?);
    }
    if let Some(end) = end.map(str::trim).filter(|s| !s.is_empty()) {
        range.insert("$lte", end_of_day(end)?);
    }
    if range.is_empty() {
        Ok(None)
    } else {
        Ok(Some(doc! { "created_at": range }))
    }
}

/// Filter for all of a calendar month (`month` is 1-12), or a whole year if
/// only `year` is given.
pub fn month_year_filter(month: Option<u32>, year: Option<i32>) -> Result<Option<Document>, AppError> {
    match (month, year) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(AppError::BadRequest(anyhow::anyhow!(
            "month filter requires a year"
        ))),
        (None, Some(year)) => {
            let start = NaiveDate::from_ymd_opt(year, 1, 1)
                .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("invalid year: {year}")))?;
            let end = NaiveDate::from_ymd_opt(year + 1, 1, 1)
                .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("invalid year: {year}")))?;
            Ok(Some(half_open_range(start, end)))
        }
        (Some(month), Some(year)) => {
            if !(1..=12).contains(&month) {
                return Err(AppError::BadRequest(anyhow::anyhow!("invalid month: {month}")));
            }
            let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
                AppError::BadRequest(anyhow::anyhow!("invalid month: {year}-{month}"))
            })?;
            let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
            let end = NaiveDate::from_ymd_opt(next_year, next_month, 1).ok_or_else(|| {
                AppError::BadRequest(anyhow::anyhow!("invalid month: {year}-{month}"))
            })?;
            Ok(Some(half_open_range(start, end)))
        }
    }
}

fn half_open_range(start: NaiveDate, end: NaiveDate) -> Document {
    let start = Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0).unwrap_or_default());
    let end = Utc.from_utc_datetime(&end.and_hms_opt(0, 0, 0).unwrap_or_default());
    doc! { "created_at": {
        "$gte": BsonDateTime::from_chrono(start),
        "$lt": BsonDateTime::from_chrono(end),
    }}
}

fn start_of_day(date: &str) -> Result<BsonDateTime, AppError> {
    let day = parse_date(date)?;
    let dt = Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).unwrap_or_default());
    Ok(BsonDateTime::from_chrono(dt))
}

fn end_of_day(date: &str) -> Result<BsonDateTime, AppError> {
    let day = parse_date(date)?;
    let dt = Utc.from_utc_datetime(&day.and_hms_milli_opt(23, 59, 59, 999).unwrap_or_default());
    Ok(BsonDateTime::from_chrono(dt))
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        AppError::BadRequest(anyhow::anyhow!("invalid date: {raw}, expected YYYY-MM-DD"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        let params = ListParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 10);
        assert_eq!(params.skip(), 0);

        let params = ListParams {
            page: Some(0),
            limit: Some(500),
            ..Default::default()
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), MAX_LIMIT);

        let params = ListParams {
            page: Some(3),
            limit: Some(20),
            ..Default::default()
        };
        assert_eq!(params.skip(), 40);
    }

    #[test]
    fn sort_spec_parses_directions() {
        let params = ListParams {
            sort: Some("-created_at,agent_name".to_string()),
            ..Default::default()
        };
        let sort = params.sort_doc(doc! { "created_at": -1 });
        assert_eq!(sort, doc! { "created_at": -1, "agent_name": 1 });
    }

    #[test]
    fn empty_sort_falls_back_to_default() {
        let params = ListParams {
            sort: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(params.sort_doc(doc! { "_id": 1 }), doc! { "_id": 1 });
    }

    #[test]
    fn field_selection_keeps_id() {
        let params = ListParams {
            fields: Some("email".to_string()),
            ..Default::default()
        };
        let items = vec![serde_json::json!({
            "id": "abc",
            "email": "a@example.com",
            "status": true,
        })];
        let selected = select_fields(items, &params);
        assert_eq!(
            selected,
            vec![serde_json::json!({ "id": "abc", "email": "a@example.com" })]
        );
    }

    #[test]
    fn no_fields_means_everything() {
        let items = vec![serde_json::json!({ "id": "abc", "status": true })];
        let selected = select_fields(items.clone(), &ListParams::default());
        assert_eq!(selected, items);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
    }

    #[test]
    fn date_range_covers_whole_days() {
        let filter = date_range_filter(Some("2024-01-01"), Some("2024-01-31"))
            .unwrap()
            .unwrap();
        let range = filter.get_document("created_at").unwrap();
        assert!(range.contains_key("$gte"));
        assert!(range.contains_key("$lte"));
    }

    #[test]
    fn bad_date_is_rejected() {
        assert!(date_range_filter(Some("01-01-2024"), None).is_err());
    }

    #[test]
    fn month_requires_year() {
        assert!(month_year_filter(Some(3), None).is_err());
        assert!(month_year_filter(Some(13), Some(2024)).is_err());
        assert!(month_year_filter(Some(12), Some(2024)).unwrap().is_some());
        assert!(month_year_filter(None, Some(2024)).unwrap().is_some());
        assert!(month_year_filter(None, None).unwrap().is_none());
    }
}
