use tracing::{debug, info};

use crate::domain::entities::filter::{FilterScope, FilterState, Period};
use crate::domain::entities::selection::SelectionStore;
use crate::domain::params::{
    DateRangeParam, FilterParam, LeadSourceParam, OwnerParam, PageParam, PageSizeParam,
    PeriodParam, SearchParam, SortParam, StatusParam,
};
use crate::domain::query_string::{History, Location, NavigateOptions, QueryString};
use crate::ui::state::notices::NoticeQueue;

pub const SELECTION_CLEARED_NOTICE: &str = "Selection cleared due to filter change";

/// State behind one mounted list view: the location history (the only
/// source of filter values), the row selection, and queued notices.
#[derive(Debug, Clone, PartialEq)]
pub struct ListController {
    history: History,
    selection: SelectionStore<String>,
    scope: FilterScope,
    notices: NoticeQueue,
    selection_clears: u64,
}

impl ListController {
    pub fn new(initial: Location) -> Self {
        let scope = FilterState::from_query(&initial.query).scope();
        Self {
            history: History::new(initial),
            selection: SelectionStore::new(),
            scope,
            notices: NoticeQueue::default(),
            selection_clears: 0,
        }
    }

    pub fn query(&self) -> &QueryString {
        &self.history.current().query
    }

    pub fn filters(&self) -> FilterState {
        FilterState::from_query(self.query())
    }

    pub fn selection(&self) -> &SelectionStore<String> {
        &self.selection
    }

    pub fn notices(&self) -> &NoticeQueue {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut NoticeQueue {
        &mut self.notices
    }

    /// How many times a filter change has wiped a non-empty selection.
    pub fn selection_clears(&self) -> u64 {
        self.selection_clears
    }

    /// Applies one batch of param writes as a single navigation, then runs
    /// selection invalidation once for the whole batch.
    pub fn navigate(&mut self, edit: impl FnOnce(&mut QueryString)) {
        let mut next = self.history.current().clone();
        edit(&mut next.query);
        let href = next.href();
        self.history.navigate(next, NavigateOptions::FILTER);
        if let Some(options) = self.history.last_options() {
            debug!(%href, replace = options.replace, scroll = options.scroll, "navigate");
        }
        self.sync_scope();
    }

    pub fn back(&mut self) -> bool {
        let moved = self.history.back();
        if moved {
            self.sync_scope();
        }
        moved
    }

    pub fn can_go_back(&self) -> bool {
        self.history.can_go_back()
    }

    fn sync_scope(&mut self) {
        let scope = self.filters().scope();
        if scope == self.scope {
            return;
        }
        self.scope = scope;
        if self.selection.selected_count() > 0 {
            info!(
                cleared = self.selection.selected_count(),
                "filters changed, clearing selection"
            );
            self.selection.clear();
            self.selection_clears += 1;
            self.notices.info(SELECTION_CLEARED_NOTICE);
        }
    }

    pub fn set_filter<P: FilterParam>(&mut self, value: Option<P::Value>) {
        self.navigate(|query| P::set(query, value.as_ref()));
    }

    pub fn clear_filter<P: FilterParam>(&mut self) {
        if !P::has_filter(self.query()) {
            return;
        }
        self.navigate(|query| P::clear(query));
    }

    pub fn set_page(&mut self, page: u32) {
        self.navigate(|query| PageParam::set(query, Some(&page.max(1))));
    }

    pub fn set_page_size(&mut self, size: u32) {
        self.navigate(|query| PageSizeParam::set(query, Some(&size)));
    }

    /// New column sorts descending from page one; the same column flips.
    pub fn toggle_sort(&mut self, column: &str) {
        let current = self.filters().sort;
        let next = current.toggled(column);
        let column_changed = current.by != next.by;
        self.navigate(|query| {
            SortParam::set(query, Some(&next));
            if column_changed {
                PageParam::write(query, Some(&1));
            }
        });
    }

    /// Leaving the custom period drops the range chosen for it.
    pub fn set_period(&mut self, period: Option<Period>) {
        self.navigate(|query| {
            PeriodParam::set(query, period.as_ref());
            if period != Some(Period::Custom) {
                DateRangeParam::write(query, None);
            }
        });
    }

    pub fn clear_all_filters(&mut self) {
        self.navigate(|query| {
            SearchParam::write(query, None);
            StatusParam::write(query, None);
            OwnerParam::write(query, None);
            DateRangeParam::write(query, None);
            LeadSourceParam::write(query, None);
            PeriodParam::write(query, None);
            PageParam::write(query, Some(&1));
        });
    }

    pub fn toggle_row(&mut self, id: &str) {
        self.selection.toggle(id.to_string());
    }

    pub fn toggle_all_visible(&mut self, visible: &[String]) {
        self.selection.select_all(visible);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }
}
