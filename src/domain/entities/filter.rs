use std::collections::BTreeSet;

use chrono::{Datelike, Days, NaiveDate};

use crate::domain::params::{
    DateRangeParam, FilterParam, LeadSourceParam, OwnerParam, PageParam, PageSizeParam,
    PeriodParam, SearchParam, SortParam, StatusParam,
};
use crate::domain::query_string::QueryString;

/// Owner filter value meaning "no owner assigned".
pub const UNASSIGNED_OWNER: &str = "unassigned";
/// Lead-source filter value meaning "source not recorded".
pub const UNKNOWN_LEAD_SOURCE: &str = "unknown";

pub const PAGE_SIZE_OPTIONS: [u32; 4] = [10, 25, 50, 100];
pub const DEFAULT_PAGE_SIZE: u32 = 25;
pub const DEFAULT_SORT_BY: &str = "createdAt";
pub const DEFAULT_PERIOD: Period = Period::ThisMonth;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn parse(raw: &str) -> Option<SortOrder> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn flipped(self) -> SortOrder {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sort {
    pub by: String,
    pub order: SortOrder,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            by: DEFAULT_SORT_BY.to_string(),
            order: SortOrder::Desc,
        }
    }
}

impl Sort {
    /// Header-click rule: same column flips, a new column starts descending.
    pub fn toggled(&self, column: &str) -> Sort {
        if self.by == column {
            Sort {
                by: self.by.clone(),
                order: self.order.flipped(),
            }
        } else {
            Sort {
                by: column.to_string(),
                order: SortOrder::Desc,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Option<DateRange> {
        (from <= to).then_some(DateRange { from, to })
    }

    /// The full calendar quarter before the one containing `today`.
    pub fn previous_quarter(today: NaiveDate) -> DateRange {
        let quarter_idx = (today.month0() / 3) as i32;
        let (year, prev_idx) = if quarter_idx == 0 {
            (today.year() - 1, 3)
        } else {
            (today.year(), quarter_idx - 1)
        };
        let from = quarter_start(year, prev_idx);
        let next_start = if prev_idx == 3 {
            quarter_start(year + 1, 0)
        } else {
            quarter_start(year, prev_idx + 1)
        };
        let to = next_start.checked_sub_days(Days::new(1)).unwrap_or(from);
        DateRange { from, to }
    }
}

fn quarter_start(year: i32, quarter_idx: i32) -> NaiveDate {
    let month = (quarter_idx * 3 + 1) as u32;
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

/// Reporting period for the sales-performance view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Today,
    ThisWeek,
    ThisMonth,
    ThisQuarter,
    LastQuarter,
    ThisYear,
    Custom,
}

impl Period {
    pub const ALL: [Period; 7] = [
        Period::Today,
        Period::ThisWeek,
        Period::ThisMonth,
        Period::ThisQuarter,
        Period::LastQuarter,
        Period::ThisYear,
        Period::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::ThisWeek => "thisWeek",
            Period::ThisMonth => "thisMonth",
            Period::ThisQuarter => "thisQuarter",
            Period::LastQuarter => "lastQuarter",
            Period::ThisYear => "thisYear",
            Period::Custom => "custom",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::Today => "Today",
            Period::ThisWeek => "This week",
            Period::ThisMonth => "This month",
            Period::ThisQuarter => "This quarter",
            Period::LastQuarter => "Last quarter",
            Period::ThisYear => "This year",
            Period::Custom => "Custom range",
        }
    }

    pub fn parse(raw: &str) -> Option<Period> {
        Period::ALL.into_iter().find(|period| period.as_str() == raw)
    }
}

/// Everything a list view filters, sorts and pages by. Always rebuilt from
/// the location query, never edited directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterState {
    pub search: Option<String>,
    pub statuses: BTreeSet<String>,
    pub owners: BTreeSet<String>,
    pub date_range: Option<DateRange>,
    pub lead_source: Option<String>,
    pub period: Option<Period>,
    pub sort: Sort,
    pub page: u32,
    pub page_size: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: None,
            statuses: BTreeSet::new(),
            owners: BTreeSet::new(),
            date_range: None,
            lead_source: None,
            period: None,
            sort: Sort::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FilterState {
    pub fn from_query(query: &QueryString) -> Self {
        Self {
            search: SearchParam::read(query),
            statuses: StatusParam::read(query).unwrap_or_default(),
            owners: OwnerParam::read(query).unwrap_or_default(),
            date_range: DateRangeParam::read(query),
            lead_source: LeadSourceParam::read(query),
            period: PeriodParam::read(query),
            sort: SortParam::read(query).unwrap_or_default(),
            page: PageParam::read(query).unwrap_or(1),
            page_size: PageSizeParam::read(query).unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    pub fn scope(&self) -> FilterScope {
        FilterScope {
            search: self.search.clone(),
            statuses: self.statuses.clone(),
            owners: self.owners.clone(),
            date_range: self.date_range,
            lead_source: self.lead_source.clone(),
            period: self.period,
        }
    }

    pub fn active_filter_count(&self) -> usize {
        [
            self.search.is_some(),
            !self.statuses.is_empty(),
            !self.owners.is_empty(),
            self.date_range.is_some(),
            self.lead_source.is_some(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }
}

/// The part of [`FilterState`] that decides which rows exist at all. Page and
/// sort only reorder or window that set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FilterScope {
    pub search: Option<String>,
    pub statuses: BTreeSet<String>,
    pub owners: BTreeSet<String>,
    pub date_range: Option<DateRange>,
    pub lead_source: Option<String>,
    pub period: Option<Period>,
}
