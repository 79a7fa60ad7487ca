use std::collections::BTreeSet;

use dioxus::prelude::*;

use crate::domain::entities::filter::{FilterState, Period, SortOrder, DEFAULT_PERIOD};
use crate::domain::entities::records::{
    paginate, AvailableFilters, ListRow, SalesPerformance, TeamMemberPerformance,
};
use crate::ui::components::detail::DetailPanel;
use crate::ui::components::filters::FilterBar;
use crate::ui::components::notices::NoticeList;
use crate::ui::components::pagination::Pager;
use crate::ui::components::status::{EmptyState, ErrorState, LoadingState};
use crate::ui::components::table::{DataTable, TableRow};
use crate::ui::format::{format_currency, format_number_with_commas, format_percent};
use crate::ui::state::app_state::{retry_query, use_list_query, ListViewState, Services};
use crate::ui::state::list_controller::ListController;
use crate::ui::state::query_state::ViewStatus;
use crate::ui::views::list::{detail_fields, export_rows, ListToolbar};
use crate::usecase::ports::api::QueryKey;
use crate::usecase::services::export_service::{ExportFormat, ExportService};
use crate::usecase::services::performance::{best_performer, sort_rows, team_totals, TeamTotals};
use crate::usecase::services::query_service::{custom_range_missing, sales_request};

fn sales_key(filters: &FilterState) -> Option<QueryKey> {
    if custom_range_missing(filters) {
        return None;
    }
    Some(sales_request(filters, chrono::Local::now().date_naive()).cache_key())
}

#[component]
fn SummaryCards(best: Option<TeamMemberPerformance>, totals: TeamTotals) -> Element {
    let card = "border: 1px solid #ddd; border-radius: 6px; padding: 8px 12px; min-width: 160px;";
    let assigned = format_number_with_commas(totals.leads_assigned as f64, 0);
    let converted = format_number_with_commas(totals.leads_converted as f64, 0);
    let rate = format_percent(totals.conversion_rate);
    let revenue = format_currency(totals.revenue);

    rsx! {
        div { style: "display: flex; gap: 12px; flex-wrap: wrap; padding: 8px 0;",
            div { style: "{card}",
                div { style: "color: #666;", "Top performer" }
                {match best {
                    Some(member) => rsx! {
                        strong { "{member.name}" }
                        div { "{format_percent(member.conversion_rate)} conversion" }
                    },
                    None => rsx! { strong { "—" } },
                }}
            }
            div { style: "{card}",
                div { style: "color: #666;", "Leads assigned" }
                strong { "{assigned}" }
            }
            div { style: "{card}",
                div { style: "color: #666;", "Converted" }
                strong { "{converted} ({rate})" }
            }
            div { style: "{card}",
                div { style: "color: #666;", "Revenue" }
                strong { "{revenue}" }
            }
        }
    }
}

#[component]
pub fn SalesView(controller: Signal<ListController>) -> Element {
    let services = use_context::<Services>();
    let state =
        ListViewState::<SalesPerformance>::new(controller, services.config.search_debounce());
    let query_service = services.query.clone();
    use_list_query(
        state.controller,
        state.query,
        state.reload,
        sales_key,
        move |filters| {
            let service = query_service.clone();
            async move { service.fetch_sales_performance(&filters).await }
        },
    );

    let mut controller = state.controller;
    let query = state.query;
    let reload = state.reload;
    let mut detail_row = state.detail_row;

    let filters = controller.read().filters();
    let period = filters.period.unwrap_or(DEFAULT_PERIOD);
    let awaiting_range = custom_range_missing(&filters);
    let status = query.read().status();
    let team: Vec<TeamMemberPerformance> = query
        .read()
        .data()
        .map(|data| data.team_performance.clone())
        .unwrap_or_default();

    let best = best_performer(&team).cloned();
    let totals = team_totals(&team);
    let mut ordered = team.clone();
    sort_rows(&mut ordered, &filters.sort);
    let window = paginate(&ordered, filters.page, filters.page_size);
    let shown = window.rows.clone();
    let export_source = shown.clone();
    let (can_go_back, notices) = {
        let ctrl = controller.read();
        (ctrl.can_go_back(), ctrl.notices().items().to_vec())
    };
    let detail = detail_row()
        .and_then(|id| team.iter().find(|member| member.row_id() == id).cloned());
    let has_filters = filters.active_filter_count() > 0;

    rsx! {
        div { style: "display: flex; flex-direction: column; height: 100%; min-height: 0;",
            ListToolbar {
                title: "Sales performance".to_string(),
                can_go_back,
                selected_count: 0,
                on_back: move |_| {
                    controller.write().back();
                },
                on_clear_selection: move |_| controller.write().clear_selection(),
                on_export: move |format: ExportFormat| {
                    let service = ExportService::new("sales-performance", "Team");
                    export_rows(controller, &service, &export_source, &export_source, format);
                },
            }
            div { style: "display: flex; gap: 12px; align-items: flex-end;",
                label { style: "display: inline-flex; flex-direction: column;",
                    "Period"
                    select {
                        value: "{period.as_str()}",
                        onchange: move |event| {
                            let next = Period::parse(&event.value());
                            controller.write().set_period(next);
                        },
                        for option_period in Period::ALL {
                            option {
                                key: "{option_period.as_str()}",
                                value: "{option_period.as_str()}",
                                selected: option_period == period,
                                "{option_period.label()}"
                            }
                        }
                    }
                }
                if period == Period::Custom {
                    FilterBar {
                        controller,
                        available: AvailableFilters::default(),
                        show_owner: false,
                        show_lead_source: false,
                        show_search: false,
                        search_text: String::new(),
                        on_search_input: move |_: String| {},
                    }
                }
            }
            if awaiting_range {
                div { style: "padding: 24px; color: #666;",
                    "Choose a start and end date, then apply, to see a custom range."
                }
            } else {
                {match status {
                    ViewStatus::Loading => rsx! { LoadingState { label: "sales performance".to_string() } },
                    ViewStatus::Error(error) => rsx! {
                        ErrorState { error, on_retry: move |_| retry_query(query, reload) }
                    },
                    ViewStatus::Empty => rsx! {
                        EmptyState {
                            message: "No sales activity for this period.".to_string(),
                            has_filters,
                            on_clear_filters: move |_| controller.write().clear_all_filters(),
                        }
                    },
                    ViewStatus::Loaded => rsx! {
                        SummaryCards { best, totals }
                        DataTable {
                            columns: TeamMemberPerformance::columns().to_vec(),
                            rows: shown.iter().map(TableRow::from_row).collect::<Vec<_>>(),
                            sort_by: filters.sort.by.clone(),
                            sort_desc: filters.sort.order == SortOrder::Desc,
                            selectable: false,
                            selected: BTreeSet::new(),
                            all_selected: false,
                            some_selected: false,
                            on_sort: move |column: String| controller.write().toggle_sort(&column),
                            on_toggle_row: move |_: String| {},
                            on_toggle_all: move |_| {},
                            on_open: move |id: String| detail_row.set(Some(id)),
                        }
                        Pager {
                            pagination: window.pagination,
                            page_size: filters.page_size,
                            on_page: move |next: u32| controller.write().set_page(next),
                            on_page_size: move |size: u32| controller.write().set_page_size(size),
                        }
                    },
                }}
            }
            if let Some(member) = detail {
                DetailPanel {
                    title: member.name.clone(),
                    fields: detail_fields(&member),
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
