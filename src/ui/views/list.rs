use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use dioxus::prelude::*;
use tracing::warn;

use crate::domain::entities::filter::{FilterState, SortOrder};
use crate::domain::entities::records::{ListRow, Page};
use crate::domain::params::SearchParam;
use crate::platform::desktop::save_dialog::save_export;
use crate::ui::components::detail::DetailPanel;
use crate::ui::components::filters::FilterBar;
use crate::ui::components::notices::NoticeList;
use crate::ui::components::pagination::Pager;
use crate::ui::components::status::{EmptyState, ErrorState, LoadingState};
use crate::ui::components::table::{DataTable, TableRow};
use crate::ui::format::{format_cell, format_number_with_commas};
use crate::ui::state::app_state::{retry_query, use_list_query, ListViewState, Services};
use crate::ui::state::debounce::SearchDebouncer;
use crate::ui::state::list_controller::ListController;
use crate::ui::state::query_state::{RowCount, ViewStatus};
use crate::usecase::ports::api::{ApiError, ApiRequest, QueryKey};
use crate::usecase::services::export_service::{rows_for_export, ExportFormat, ExportService};
use crate::usecase::services::query_service::QueryService;

/// Keeps the search box in step with the committed `search` param and
/// returns the input handler that debounces typing into it.
pub fn use_search_box<T: RowCount + 'static>(
    state: &ListViewState<T>,
) -> impl FnMut(String) + Copy + 'static {
    let controller = state.controller;
    let mut search_text = state.search_text;
    let debouncer = state.debouncer;

    let committed = use_memo(move || controller.read().filters().search.unwrap_or_default());
    use_effect(move || {
        let value = committed();
        if debouncer.peek().pending().is_none() {
            search_text.set(value);
        }
    });

    move |text: String| {
        search_text.set(text.clone());
        schedule_search(controller, debouncer, text);
    }
}

fn schedule_search(
    mut controller: Signal<ListController>,
    mut debouncer: Signal<SearchDebouncer>,
    text: String,
) {
    debouncer.write().input(text, Instant::now());
    let window = debouncer.peek().window();
    spawn(async move {
        tokio::time::sleep(window).await;
        let settled = debouncer.write().poll(Instant::now());
        if let Some(text) = settled {
            let value = Some(text).filter(|t| !t.trim().is_empty());
            controller.write().set_filter::<SearchParam>(value);
        }
    });
}

pub fn detail_fields<R: ListRow>(row: &R) -> Vec<(String, String)> {
    R::columns()
        .iter()
        .zip(row.cells())
        .map(|(column, cell)| (column.label.to_string(), format_cell(&cell)))
        .collect()
}

pub fn visible_ids<R: ListRow>(rows: &[R]) -> Vec<String> {
    rows.iter().map(ListRow::row_id).collect()
}

/// Builds the export, asks where to put it, and reports the outcome as a
/// notice. `loaded` is every row the view still holds, from any page, so a
/// selection made on other pages is exported too.
pub fn export_rows<'a, R: ListRow>(
    mut controller: Signal<ListController>,
    service: &ExportService,
    shown: &[R],
    loaded: impl IntoIterator<Item = &'a R>,
    format: ExportFormat,
) {
    let (picked, range) = {
        let ctrl = controller.read();
        (
            rows_for_export(shown, loaded, ctrl.selection()),
            ctrl.filters().date_range,
        )
    };
    if picked.missing > 0 {
        let missing = format_number_with_commas(picked.missing as f64, 0);
        controller.write().notices_mut().error(format!(
            "{missing} selected rows are no longer loaded and were left out of the export"
        ));
    }
    if picked.rows.is_empty() {
        controller.write().notices_mut().info("Nothing to export");
        return;
    }

    let today = chrono::Local::now().date_naive();
    let outcome = service
        .export(&picked.rows, format, today, range)
        .and_then(|file| save_export(&file));

    let mut ctrl = controller.write();
    match outcome {
        Ok(Some(path)) => {
            let count = format_number_with_commas(picked.rows.len() as f64, 0);
            ctrl.notices_mut()
                .info(format!("Exported {count} rows to {}", path.display()));
        }
        Ok(None) => {}
        Err(err) => {
            warn!("export failed: {err:#}");
            ctrl.notices_mut().error(format!("Export failed: {err:#}"));
        }
    }
}

/// A paged backend list: how to request it and how to label it.
pub trait ListResource: ListRow {
    const TITLE: &'static str;
    const LOADING_LABEL: &'static str;
    const EXPORT_PREFIX: &'static str;
    const EMPTY_MESSAGE: &'static str;
    const SHOW_OWNER: bool = false;
    const SHOW_LEAD_SOURCE: bool = false;

    fn request(filters: &FilterState) -> ApiRequest;

    fn fetch(
        service: Arc<QueryService>,
        filters: FilterState,
    ) -> impl Future<Output = Result<Page<Self>, ApiError>> + 'static;

    fn display_name(&self) -> String;
}

fn list_key<R: ListResource>(filters: &FilterState) -> Option<QueryKey> {
    Some(R::request(filters).cache_key())
}

/// The container behind every paged list view. Must be called from a
/// component body, like any other hook.
pub fn list_view<R: ListResource>(controller: Signal<ListController>) -> Element {
    let services = use_context::<Services>();
    let state = ListViewState::<Page<R>>::new(controller, services.config.search_debounce());
    let query_service = services.query.clone();
    use_list_query(
        state.controller,
        state.query,
        state.reload,
        list_key::<R>,
        move |filters| R::fetch(query_service.clone(), filters),
    );
    let on_search = use_search_box(&state);

    let mut controller = state.controller;
    let query = state.query;
    let reload = state.reload;
    let mut detail_row = state.detail_row;

    let filters = controller.read().filters();
    let status = query.read().status();
    let page = query.read().data().cloned();
    let rows: Vec<R> = page.as_ref().map(|p| p.rows.clone()).unwrap_or_default();
    let available = page
        .as_ref()
        .and_then(|p| p.available_filters.clone())
        .unwrap_or_default();
    let ids = visible_ids(&rows);
    let (selected, selected_count, all_selected, some_selected, can_go_back, notices) = {
        let ctrl = controller.read();
        let selection = ctrl.selection();
        (
            selection
                .selected_ids()
                .into_iter()
                .collect::<BTreeSet<String>>(),
            selection.selected_count(),
            selection.is_all_selected(&ids),
            selection.is_some_selected(&ids),
            ctrl.can_go_back(),
            ctrl.notices().items().to_vec(),
        )
    };
    let detail = detail_row()
        .and_then(|id| rows.iter().find(|row| row.row_id() == id).cloned());
    let shown = rows.clone();
    let has_filters = filters.active_filter_count() > 0;

    rsx! {
        div { style: "display: flex; flex-direction: column; height: 100%; min-height: 0;",
            ListToolbar {
                title: R::TITLE.to_string(),
                can_go_back,
                selected_count,
                on_back: move |_| {
                    controller.write().back();
                },
                on_clear_selection: move |_| controller.write().clear_selection(),
                on_export: move |format: ExportFormat| {
                    let service = ExportService::new(R::EXPORT_PREFIX, R::TITLE);
                    let held = query.read();
                    let loaded = held.cached().flat_map(|page| page.rows.iter());
                    export_rows(controller, &service, &shown, loaded, format);
                },
            }
            FilterBar {
                controller,
                available,
                show_owner: R::SHOW_OWNER,
                show_lead_source: R::SHOW_LEAD_SOURCE,
                show_search: true,
                search_text: (state.search_text)(),
                on_search_input: on_search,
            }
            {match status {
                ViewStatus::Loading => rsx! { LoadingState { label: R::LOADING_LABEL.to_string() } },
                ViewStatus::Error(error) => rsx! {
                    ErrorState { error, on_retry: move |_| retry_query(query, reload) }
                },
                ViewStatus::Empty => rsx! {
                    EmptyState {
                        message: R::EMPTY_MESSAGE.to_string(),
                        has_filters,
                        on_clear_filters: move |_| controller.write().clear_all_filters(),
                    }
                },
                ViewStatus::Loaded => rsx! {
                    DataTable {
                        columns: R::columns().to_vec(),
                        rows: rows.iter().map(TableRow::from_row).collect::<Vec<_>>(),
                        sort_by: filters.sort.by.clone(),
                        sort_desc: filters.sort.order == SortOrder::Desc,
                        selectable: true,
                        selected,
                        all_selected,
                        some_selected,
                        on_sort: move |column: String| controller.write().toggle_sort(&column),
                        on_toggle_row: move |id: String| controller.write().toggle_row(&id),
                        on_toggle_all: move |_| controller.write().toggle_all_visible(&ids),
                        on_open: move |id: String| detail_row.set(Some(id)),
                    }
                    if let Some(page) = page.as_ref() {
                        Pager {
                            pagination: page.pagination,
                            page_size: filters.page_size,
                            on_page: move |next: u32| controller.write().set_page(next),
                            on_page_size: move |size: u32| controller.write().set_page_size(size),
                        }
                    }
                },
            }}
            if let Some(row) = detail {
                DetailPanel {
                    title: row.display_name(),
                    fields: detail_fields(&row),
                    on_close: move |_| detail_row.set(None),
                }
            }
            NoticeList {
                notices,
                on_dismiss: move |id: u64| controller.write().notices_mut().dismiss(id),
            }
        }
    }
}

#[component]
pub fn ListToolbar(
    title: String,
    can_go_back: bool,
    selected_count: usize,
    on_back: EventHandler<()>,
    on_clear_selection: EventHandler<()>,
    on_export: EventHandler<ExportFormat>,
) -> Element {
    rsx! {
        div { style: "display: flex; gap: 12px; align-items: center; padding: 8px 0;",
            button {
                disabled: !can_go_back,
                onclick: move |_| on_back.call(()),
                "← Back"
            }
            h2 { style: "margin: 0; flex: 1 1 auto;", "{title}" }
            if selected_count > 0 {
                span { "{selected_count} selected" }
                button { onclick: move |_| on_clear_selection.call(()), "Clear selection" }
            }
            button { onclick: move |_| on_export.call(ExportFormat::Csv), "Export CSV" }
            button { onclick: move |_| on_export.call(ExportFormat::Xlsx), "Export Excel" }
        }
    }
}
