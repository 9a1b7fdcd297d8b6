//! Query parameters describing which slice of the set collection is requested.
//!
//! Pages are 1-indexed. Changing any field other than the page to a different
//! value moves the query back to page 1; setting a field to the value it
//! already has leaves the query untouched.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{SortKey, SortOrder};

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Wire format for the `dateStart`/`dateEnd` parameters.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QueryParams {
    pub exercise_filter: Option<String>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
    page: u32,
    page_size: u32,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            exercise_filter: None,
            date_start: None,
            date_end: None,
            sort_key: SortKey::default(),
            sort_order: SortOrder::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default query scoped to one exercise.
    pub fn for_exercise(exercise_id: impl Into<String>) -> Self {
        Self {
            exercise_filter: Some(exercise_id.into()),
            ..Self::default()
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn with_exercise_filter(&self, exercise_id: Option<String>) -> Self {
        if self.exercise_filter == exercise_id {
            return self.clone();
        }
        Self {
            exercise_filter: exercise_id,
            page: 1,
            ..self.clone()
        }
    }

    pub fn with_date_range(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        if self.date_start == start && self.date_end == end {
            return self.clone();
        }
        Self {
            date_start: start,
            date_end: end,
            page: 1,
            ..self.clone()
        }
    }

    pub fn with_sort(&self, key: SortKey, order: SortOrder) -> Self {
        if self.sort_key == key && self.sort_order == order {
            return self.clone();
        }
        Self {
            sort_key: key,
            sort_order: order,
            page: 1,
            ..self.clone()
        }
    }

    /// Column-header click: the active key flips direction, any other key
    /// becomes active in descending order.
    pub fn toggle_sort(&self, key: SortKey) -> Self {
        if self.sort_key == key {
            self.with_sort(key, self.sort_order.flipped())
        } else {
            self.with_sort(key, SortOrder::Desc)
        }
    }

    /// Moves to `page`, keeping every other field. Page 0 is clamped to 1.
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    pub fn with_page_size(&self, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        if self.page_size == page_size {
            return self.clone();
        }
        Self {
            page_size,
            page: 1,
            ..self.clone()
        }
    }

    /// Renders the `GET /sets` query string pairs. Absent filters are sent as
    /// empty strings rather than left out.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let date = |d: &Option<NaiveDate>| {
            d.map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default()
        };

        vec![
            ("exercise", self.exercise_filter.clone().unwrap_or_default()),
            ("dateStart", date(&self.date_start)),
            ("dateEnd", date(&self.date_end)),
            ("typeSort", self.sort_key.as_wire().to_string()),
            ("sortOrder", self.sort_order.to_string()),
            ("page", self.page.to_string()),
            ("pageSize", self.page_size.to_string()),
        ]
    }
}

/// Parses a `YYYY-MM-DD` date as typed by a user.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", s))
}
