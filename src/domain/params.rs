//! One accessor per URL filter dimension.
//!
//! Each param owns its query key(s). `read` parses the current location and
//! degrades anything malformed to `None`; `set` rewrites only its own keys and
//! moves the view back to page one.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::domain::entities::filter::{
    DateRange, Period, Sort, SortOrder, DEFAULT_SORT_BY, PAGE_SIZE_OPTIONS, UNASSIGNED_OWNER,
    UNKNOWN_LEAD_SOURCE,
};
use crate::domain::query_string::QueryString;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub trait FilterParam {
    type Value;

    const RESETS_PAGE: bool = true;

    fn read(query: &QueryString) -> Option<Self::Value>;

    fn write(query: &mut QueryString, value: Option<&Self::Value>);

    fn set(query: &mut QueryString, value: Option<&Self::Value>) {
        Self::write(query, value);
        if Self::RESETS_PAGE {
            PageParam::write(query, Some(&1));
        }
    }

    fn clear(query: &mut QueryString) {
        Self::set(query, None);
    }

    fn has_filter(query: &QueryString) -> bool {
        Self::read(query).is_some()
    }
}

fn non_empty<'a>(query: &'a QueryString, key: &str) -> Option<&'a str> {
    query
        .get(key)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn read_list(query: &QueryString, key: &str) -> Option<BTreeSet<String>> {
    let values: BTreeSet<String> = non_empty(query, key)?
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect();
    (!values.is_empty()).then_some(values)
}

fn write_list(query: &mut QueryString, key: &str, value: Option<&BTreeSet<String>>) {
    match value {
        Some(values) if values.iter().any(|v| !v.trim().is_empty()) => {
            let joined = values
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>()
                .join(",");
            query.set(key, joined);
        }
        _ => query.remove(key),
    }
}

/// Free text is kept exactly as typed; only a blank value counts as unset.
fn raw_text<'a>(query: &'a QueryString, key: &str) -> Option<&'a str> {
    query.get(key).filter(|value| !value.trim().is_empty())
}

fn write_raw_text(query: &mut QueryString, key: &str, value: Option<&String>) {
    match value.filter(|v| !v.trim().is_empty()) {
        Some(text) => query.set(key, text.as_str()),
        None => query.remove(key),
    }
}

fn write_text(query: &mut QueryString, key: &str, value: Option<&String>) {
    match value.map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(text) => query.set(key, text),
        None => query.remove(key),
    }
}

pub struct SearchParam;

impl FilterParam for SearchParam {
    type Value = String;

    fn read(query: &QueryString) -> Option<String> {
        raw_text(query, "search").map(str::to_string)
    }

    fn write(query: &mut QueryString, value: Option<&String>) {
        write_raw_text(query, "search", value);
    }
}

pub struct StatusParam;

impl FilterParam for StatusParam {
    type Value = BTreeSet<String>;

    fn read(query: &QueryString) -> Option<BTreeSet<String>> {
        read_list(query, "status")
    }

    fn write(query: &mut QueryString, value: Option<&BTreeSet<String>>) {
        write_list(query, "status", value);
    }
}

/// Owners filter. The `unassigned` token is a real filter value even though
/// it selects rows with no owner.
pub struct OwnerParam;

impl OwnerParam {
    pub fn includes_unassigned(query: &QueryString) -> bool {
        Self::read(query).is_some_and(|owners| owners.contains(UNASSIGNED_OWNER))
    }
}

impl FilterParam for OwnerParam {
    type Value = BTreeSet<String>;

    fn read(query: &QueryString) -> Option<BTreeSet<String>> {
        read_list(query, "owner")
    }

    fn write(query: &mut QueryString, value: Option<&BTreeSet<String>>) {
        write_list(query, "owner", value);
    }
}

pub struct DateRangeParam;

impl FilterParam for DateRangeParam {
    type Value = DateRange;

    fn read(query: &QueryString) -> Option<DateRange> {
        let from = NaiveDate::parse_from_str(non_empty(query, "from")?, DATE_FORMAT).ok()?;
        let to = NaiveDate::parse_from_str(non_empty(query, "to")?, DATE_FORMAT).ok()?;
        DateRange::new(from, to)
    }

    fn write(query: &mut QueryString, value: Option<&DateRange>) {
        match value {
            Some(range) => {
                query.set("from", range.from.format(DATE_FORMAT).to_string());
                query.set("to", range.to.format(DATE_FORMAT).to_string());
            }
            None => {
                query.remove("from");
                query.remove("to");
            }
        }
    }
}

/// Lead source filter; `unknown` counts as active.
pub struct LeadSourceParam;

impl LeadSourceParam {
    pub fn is_unknown(query: &QueryString) -> bool {
        Self::read(query).as_deref() == Some(UNKNOWN_LEAD_SOURCE)
    }
}

impl FilterParam for LeadSourceParam {
    type Value = String;

    fn read(query: &QueryString) -> Option<String> {
        non_empty(query, "leadSource").map(str::to_string)
    }

    fn write(query: &mut QueryString, value: Option<&String>) {
        write_text(query, "leadSource", value);
    }
}

pub struct PeriodParam;

impl FilterParam for PeriodParam {
    type Value = Period;

    fn read(query: &QueryString) -> Option<Period> {
        non_empty(query, "period").and_then(Period::parse)
    }

    fn write(query: &mut QueryString, value: Option<&Period>) {
        match value {
            Some(period) => query.set("period", period.as_str()),
            None => query.remove("period"),
        }
    }
}

/// `sortBy` + `sortOrder`. Older links used `sortDir`, which is still read.
pub struct SortParam;

impl FilterParam for SortParam {
    type Value = Sort;

    const RESETS_PAGE: bool = false;

    fn read(query: &QueryString) -> Option<Sort> {
        let by = non_empty(query, "sortBy");
        let order = non_empty(query, "sortOrder").or_else(|| non_empty(query, "sortDir"));
        if by.is_none() && order.is_none() {
            return None;
        }
        Some(Sort {
            by: by.unwrap_or(DEFAULT_SORT_BY).to_string(),
            order: order.and_then(SortOrder::parse).unwrap_or_default(),
        })
    }

    fn write(query: &mut QueryString, value: Option<&Sort>) {
        query.remove("sortDir");
        match value {
            Some(sort) => {
                query.set("sortBy", sort.by.clone());
                query.set("sortOrder", sort.order.as_str());
            }
            None => {
                query.remove("sortBy");
                query.remove("sortOrder");
            }
        }
    }

    fn has_filter(_query: &QueryString) -> bool {
        false
    }
}

pub struct PageParam;

impl FilterParam for PageParam {
    type Value = u32;

    const RESETS_PAGE: bool = false;

    fn read(query: &QueryString) -> Option<u32> {
        non_empty(query, "page")
            .and_then(|raw| raw.parse::<u32>().ok())
            .filter(|page| *page >= 1)
    }

    fn write(query: &mut QueryString, value: Option<&u32>) {
        match value.copied().filter(|page| *page >= 1) {
            Some(page) => query.set("page", page.to_string()),
            None => query.remove("page"),
        }
    }

    fn has_filter(_query: &QueryString) -> bool {
        false
    }
}

pub struct PageSizeParam;

impl FilterParam for PageSizeParam {
    type Value = u32;

    fn read(query: &QueryString) -> Option<u32> {
        non_empty(query, "limit")
            .and_then(|raw| raw.parse::<u32>().ok())
            .filter(|size| PAGE_SIZE_OPTIONS.contains(size))
    }

    fn write(query: &mut QueryString, value: Option<&u32>) {
        match value.copied().filter(|size| PAGE_SIZE_OPTIONS.contains(size)) {
            Some(size) => query.set("limit", size.to_string()),
            None => query.remove("limit"),
        }
    }

    fn has_filter(_query: &QueryString) -> bool {
        false
    }
}
