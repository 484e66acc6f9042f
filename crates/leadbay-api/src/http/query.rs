//! Query-string DTOs for the list endpoints.
//!
//! Pagination values arrive as raw strings so malformed input falls back
//! to the defaults instead of failing extraction; filter values are
//! validated here and bad ones reject with `VALIDATION_ERROR`.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use leadbay_core::page::PageRequest;
use leadbay_core::store::chat::ChatSessionFilter;
use leadbay_core::store::event::EventFilter;
use leadbay_core::store::lead::LeadFilter;
use leadbay_types::lead::LeadStatus;
use leadbay_types::time::parse_datetime;

use crate::http::error::AppError;

fn parse_date(field: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>, AppError> {
    match value {
        None => Ok(None),
        Some(raw) => parse_datetime(raw)
            .map(Some)
            .map_err(|_| AppError::Validation(format!("{field} must be an RFC 3339 timestamp"))),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LeadListQuery {
    pub microsite: Option<String>,
    pub status: Option<String>,
    pub phone: Option<String>,
    pub search: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<String>,
    pub skip: Option<String>,
}

impl LeadListQuery {
    pub fn into_filter(self) -> Result<LeadFilter, AppError> {
        let status = match &self.status {
            Some(s) => Some(
                s.parse::<LeadStatus>()
                    .map_err(AppError::Validation)?,
            ),
            None => None,
        };
        Ok(LeadFilter {
            microsite: self.microsite,
            status,
            phone: self.phone,
            search: self.search,
            start_date: parse_date("start_date", self.start_date.as_deref())?,
            end_date: parse_date("end_date", self.end_date.as_deref())?,
            page: PageRequest::from_raw(self.limit.as_deref(), self.skip.as_deref()),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatSessionListQuery {
    pub microsite: Option<String>,
    pub project_id: Option<String>,
    pub lead_id: Option<String>,
    pub search: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<String>,
    pub skip: Option<String>,
}

impl ChatSessionListQuery {
    pub fn into_filter(self) -> Result<ChatSessionFilter, AppError> {
        let lead_id = match &self.lead_id {
            Some(raw) => Some(raw.trim().parse::<i64>().map_err(|_| {
                AppError::Validation("lead_id must be an integer".to_string())
            })?),
            None => None,
        };
        Ok(ChatSessionFilter {
            microsite: self.microsite,
            project_id: self.project_id,
            lead_id,
            search: self.search,
            start_date: parse_date("start_date", self.start_date.as_deref())?,
            end_date: parse_date("end_date", self.end_date.as_deref())?,
            page: PageRequest::from_raw(self.limit.as_deref(), self.skip.as_deref()),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EventListQuery {
    pub event_type: Option<String>,
    pub project_id: Option<String>,
    pub microsite: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<String>,
    pub skip: Option<String>,
}

impl EventListQuery {
    pub fn into_filter(self) -> Result<EventFilter, AppError> {
        Ok(EventFilter {
            event_type: self.event_type,
            project_id: self.project_id,
            microsite: self.microsite,
            start_date: parse_date("start_date", self.start_date.as_deref())?,
            end_date: parse_date("end_date", self.end_date.as_deref())?,
            page: PageRequest::from_raw(self.limit.as_deref(), self.skip.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_query_parses_status_and_dates() {
        let query = LeadListQuery {
            status: Some("qualified".to_string()),
            start_date: Some("2026-08-01T00:00:00Z".to_string()),
            ..Default::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.status, Some(LeadStatus::Qualified));
        assert!(filter.start_date.is_some());
    }

    #[test]
    fn test_lead_query_rejects_bad_status() {
        let query = LeadListQuery {
            status: Some("stale".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            query.into_filter(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_lead_query_rejects_bad_date() {
        let query = LeadListQuery {
            start_date: Some("yesterday".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            query.into_filter(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_non_numeric_pagination_falls_back() {
        let query = LeadListQuery {
            limit: Some("lots".to_string()),
            skip: Some("a-few".to_string()),
            ..Default::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.page.resolve(50), (50, 0));
    }

    #[test]
    fn test_chat_query_rejects_bad_lead_id() {
        let query = ChatSessionListQuery {
            lead_id: Some("abc".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            query.into_filter(),
            Err(AppError::Validation(_))
        ));
    }
}
