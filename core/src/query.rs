use crate::row::Row;
use std::collections::BTreeMap;
use viewsync_proto::Status;

/// Which status partition a view is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    #[default]
    Active,
    Deleted,
    All,
}

impl StatusFilter {
    pub fn matches(&self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == Status::Active,
            StatusFilter::Deleted => status == Status::Deleted,
        }
    }
}

/// A filterable scalar value. Equality is the only comparison a view
/// filter supports.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterValue {
    Text(String),
    Int(i64),
    Bool(bool),
}

impl From<&str> for FilterValue {
    fn from(val: &str) -> Self { FilterValue::Text(val.to_string()) }
}

impl From<String> for FilterValue {
    fn from(val: String) -> Self { FilterValue::Text(val) }
}

impl From<i64> for FilterValue {
    fn from(val: i64) -> Self { FilterValue::Int(val) }
}

impl From<bool> for FilterValue {
    fn from(val: bool) -> Self { FilterValue::Bool(val) }
}

/// Identity of one open list view: status partition, page, page size,
/// search text and filter map. Equality of the normalized form is the
/// cache key, so two views asking the same question share one slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewQuery {
    pub status: StatusFilter,
    pub page: u32,
    pub page_size: u32,
    pub search: Option<String>,
    pub filters: BTreeMap<String, FilterValue>,
}

impl ViewQuery {
    pub fn new(status: StatusFilter, page: u32, page_size: u32) -> Self {
        Self { status, page, page_size, search: None, filters: BTreeMap::new() }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    /// Canonical form used as the cache key. Empty search text and empty
    /// filter values carry no meaning and are stripped; page and page
    /// size are clamped to at least 1.
    pub fn normalize(mut self) -> Self {
        self.page = self.page.max(1);
        self.page_size = self.page_size.max(1);
        if self.search.as_deref().is_some_and(|s| s.trim().is_empty()) {
            self.search = None;
        }
        self.filters.retain(|_, value| !matches!(value, FilterValue::Text(text) if text.is_empty()));
        self
    }

    /// Full view predicate for an incoming row: status partition, search
    /// text and every filter entry must all match.
    pub fn matches<R: Row>(&self, row: &R, status: Status) -> bool {
        self.status.matches(status) && self.matches_search(row) && self.matches_filters(row)
    }

    /// Case-insensitive substring match over the declared searchable
    /// fields. A view without search text matches every row.
    fn matches_search<R: Row>(&self, row: &R) -> bool {
        let Some(needle) = self.search.as_deref() else { return true };
        let needle = needle.to_lowercase();
        R::search_fields().iter().any(|field| row.search_text(field).is_some_and(|text| text.to_lowercase().contains(&needle)))
    }

    fn matches_filters<R: Row>(&self, row: &R) -> bool {
        self.filters.iter().all(|(field, expected)| row.filter_value(field).as_ref() == Some(expected))
    }
}
