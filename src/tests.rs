use std::collections::BTreeSet;
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use calamine::{Data, Reader, Xlsx};
use chrono::NaiveDate;
use serde_json::json;

use crate::config::{AppConfig, API_BASE_URL_ENV, SESSION_ENV};
use crate::domain::entities::filter::{
    DateRange, FilterState, Period, SortOrder, DEFAULT_PAGE_SIZE, UNASSIGNED_OWNER,
    UNKNOWN_LEAD_SOURCE,
};
use crate::domain::entities::records::{
    paginate, CampaignStat, CellValue, Lead, Page, TeamMemberPerformance,
};
use crate::domain::entities::selection::SelectionStore;
use crate::domain::params::{
    DateRangeParam, FilterParam, LeadSourceParam, OwnerParam, PageParam, PageSizeParam,
    SearchParam, SortParam, StatusParam,
};
use crate::domain::query_string::{Location, QueryString};
use crate::infra::export::csv::rows_to_csv;
use crate::infra::export::xlsx::INFO_SHEET;
use crate::ui::components::filters::{facet_options, FilterDraft};
use crate::ui::components::table::select_all_state;
use crate::ui::format::{format_cell, format_currency, format_number_with_commas, format_percent};
use crate::ui::state::app_state::initial_location;
use crate::ui::state::debounce::SearchDebouncer;
use crate::ui::state::list_controller::{ListController, SELECTION_CLEARED_NOTICE};
use crate::ui::state::query_state::{QueryState, ViewStatus};
use crate::ui::views::list::ListResource;
use crate::usecase::ports::api::{
    ApiError, ApiRequest, RawResponse, Transport, INVALID_RESPONSE_CODE, NETWORK_ERROR_MESSAGE,
    SERVICE_UNAVAILABLE_CODE, SERVICE_UNAVAILABLE_MESSAGE,
};
use crate::usecase::services::export_service::{
    export_filename, rows_for_export, ExportFormat, ExportService,
};
use crate::usecase::services::performance::{best_performer, sort_rows, team_totals};
use crate::usecase::services::query_service::{
    campaigns_request, custom_range_missing, decode_page, leads_request, sales_request, QueryService,
    BACKEND_UNKNOWN_LEAD_SOURCE, LEADS_PATH,
};

fn unique_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("salesdash-{prefix}-{nanos}"))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("should be a valid date")
}

fn set_of(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn lead(id: i64, name: &str) -> Lead {
    Lead {
        id,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        company: Some("Acme".to_string()),
        status: "new".to_string(),
        owner: Some("Sam".to_string()),
        lead_source: Some("referral".to_string()),
        value: Some(1500.0),
        created_at: "2026-10-01T12:00:00Z".to_string(),
    }
}

fn member(id: &str, name: &str, conversion_rate: f64) -> TeamMemberPerformance {
    TeamMemberPerformance {
        id: id.to_string(),
        name: name.to_string(),
        leads_assigned: 20,
        leads_converted: 5,
        conversion_rate,
        revenue: 1000.0,
    }
}

struct FakeTransport {
    response: Result<RawResponse, ApiError>,
    seen: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    fn replying(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(RawResponse {
                status,
                status_text: String::new(),
                body: body.to_string(),
            }),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn failing(error: ApiError) -> Arc<Self> {
        Arc::new(Self {
            response: Err(error),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn last_request(&self) -> ApiRequest {
        self.seen
            .lock()
            .expect("lock should not be poisoned")
            .last()
            .cloned()
            .expect("a request should have been sent")
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, request: &ApiRequest) -> Result<RawResponse, ApiError> {
        self.seen
            .lock()
            .expect("lock should not be poisoned")
            .push(request.clone());
        self.response.clone()
    }
}

#[test]
fn search_param_round_trips_and_blank_means_unset() {
    let mut query = QueryString::new();

    SearchParam::set(&mut query, Some(&" acme ".to_string()));
    assert_eq!(
        SearchParam::read(&query),
        Some(" acme ".to_string()),
        "search text should be kept as typed"
    );
    assert!(SearchParam::has_filter(&query));

    let reparsed = QueryString::parse(&query.to_string());
    assert_eq!(SearchParam::read(&reparsed), Some(" acme ".to_string()));

    SearchParam::set(&mut query, Some(&"   ".to_string()));
    assert_eq!(SearchParam::read(&query), None);
    assert_eq!(query.get("search"), None, "blank search should drop the key");
}

#[test]
fn list_params_round_trip_as_comma_lists() {
    let mut query = QueryString::new();

    StatusParam::set(&mut query, Some(&set_of(&["won", "new"])));
    OwnerParam::set(&mut query, Some(&set_of(&["sam", UNASSIGNED_OWNER])));

    assert_eq!(query.get("status"), Some("new,won"));
    assert_eq!(StatusParam::read(&query), Some(set_of(&["new", "won"])));
    assert!(OwnerParam::includes_unassigned(&query));

    StatusParam::set(&mut query, Some(&BTreeSet::new()));
    assert_eq!(query.get("status"), None, "empty list should drop the key");
    assert_eq!(StatusParam::read(&QueryString::parse("status=,,")), None);
}

#[test]
fn date_range_needs_both_bounds_in_order() {
    assert_eq!(DateRangeParam::read(&QueryString::parse("from=2026-01-01")), None);
    assert_eq!(
        DateRangeParam::read(&QueryString::parse("from=2026-02-01&to=2026-01-01")),
        None
    );

    let mut query = QueryString::new();
    let range = DateRange::new(date(2026, 7, 1), date(2026, 9, 30)).expect("range should be valid");
    DateRangeParam::set(&mut query, Some(&range));

    assert_eq!(query.get("from"), Some("2026-07-01"));
    assert_eq!(query.get("to"), Some("2026-09-30"));
    assert_eq!(DateRangeParam::read(&query), Some(range));

    DateRangeParam::clear(&mut query);
    assert_eq!(query.get("from"), None);
    assert_eq!(query.get("to"), None);
}

#[test]
fn unknown_lead_source_is_an_active_filter() {
    let query = QueryString::parse("leadSource=unknown&owner=unassigned");

    assert!(LeadSourceParam::has_filter(&query));
    assert!(LeadSourceParam::is_unknown(&query));

    let filters = FilterState::from_query(&query);
    assert_eq!(filters.active_filter_count(), 2);

    let request = leads_request(&filters);
    assert_eq!(request.query_value("leadSource"), Some(BACKEND_UNKNOWN_LEAD_SOURCE));
    assert_eq!(request.query_value("owner"), Some(UNASSIGNED_OWNER));
}

#[test]
fn filter_writes_reset_page_but_page_and_sort_do_not() {
    let mut query = QueryString::parse("page=4&sortBy=name&sortOrder=asc");

    StatusParam::set(&mut query, Some(&set_of(&["won"])));
    assert_eq!(query.get("page"), Some("1"));

    PageParam::set(&mut query, Some(&3));
    assert_eq!(query.get("page"), Some("3"));

    let sort = SortParam::read(&query).expect("sort should be present");
    SortParam::set(&mut query, Some(&sort.toggled("name")));
    assert_eq!(query.get("page"), Some("3"), "sorting should keep the page");
    assert_eq!(query.get("sortOrder"), Some("desc"));

    PageSizeParam::set(&mut query, Some(&50));
    assert_eq!(query.get("limit"), Some("50"));
    assert_eq!(query.get("page"), Some("1"));
}

#[test]
fn sort_param_reads_legacy_direction_key() {
    let mut query = QueryString::parse("sortBy=name&sortDir=asc");

    let sort = SortParam::read(&query).expect("legacy sort should parse");
    assert_eq!(sort.by, "name");
    assert_eq!(sort.order, SortOrder::Asc);

    SortParam::write(&mut query, Some(&sort));
    assert_eq!(query.get("sortDir"), None);
    assert_eq!(query.get("sortOrder"), Some("asc"));
}

#[test]
fn page_size_rejects_values_outside_the_options() {
    assert_eq!(PageSizeParam::read(&QueryString::parse("limit=7")), None);
    assert_eq!(PageSizeParam::read(&QueryString::parse("limit=100")), Some(100));
    assert_eq!(
        FilterState::from_query(&QueryString::parse("limit=7")).page_size,
        DEFAULT_PAGE_SIZE
    );
}

#[test]
fn select_all_toggles_the_visible_page() {
    let visible = ids(&["1", "2", "3"]);
    let mut selection = SelectionStore::new();

    selection.select_all(&visible);
    assert!(selection.is_all_selected(&visible));
    assert!(!selection.is_some_selected(&visible));

    selection.select_all(&visible);
    assert_eq!(selection.selected_count(), 0);

    selection.toggle("2".to_string());
    assert!(selection.is_some_selected(&visible));
    selection.select_all(&visible);
    assert!(selection.is_all_selected(&visible), "partial selection should fill up");
}

#[test]
fn select_all_with_no_rows_does_nothing() {
    let mut selection: SelectionStore<String> = SelectionStore::new();
    selection.toggle("9".to_string());

    selection.select_all(&[]);

    assert!(!selection.is_all_selected(&[]));
    assert!(!selection.is_some_selected(&[]));
    assert_eq!(selection.selected_ids(), ids(&["9"]));
}

#[test]
fn selection_spans_pages() {
    let page_one = ids(&["1", "2"]);
    let page_two = ids(&["3", "4"]);
    let mut selection = SelectionStore::new();

    selection.select_all(&page_one);
    selection.select_all(&page_two);
    assert_eq!(selection.selected_count(), 4);

    selection.select_all(&page_two);
    assert_eq!(selection.selected_ids(), page_one);
}

#[test]
fn filter_change_clears_selection_once_with_notice() {
    let mut controller = ListController::new(Location::new("/leads"));
    controller.toggle_row("1");
    controller.toggle_row("2");

    controller.set_filter::<StatusParam>(Some(set_of(&["won"])));

    assert!(controller.selection().is_empty());
    assert_eq!(controller.selection_clears(), 1);
    assert_eq!(controller.notices().len(), 1);
    assert_eq!(controller.notices().items()[0].message, SELECTION_CLEARED_NOTICE);
    assert_eq!(controller.query().get("page"), Some("1"));
}

#[test]
fn clearing_an_unset_filter_does_not_navigate() {
    let mut controller = ListController::new(Location::new("/leads"));
    controller.toggle_row("1");

    controller.clear_filter::<OwnerParam>();

    assert!(!controller.can_go_back());
    assert_eq!(controller.selection_clears(), 0);
    assert!(controller.selection().is_selected(&"1".to_string()));
}

#[test]
fn every_scope_dimension_clears_selection_once() {
    let range = DateRange::new(date(2026, 7, 1), date(2026, 9, 30)).expect("range should be valid");
    let edits: Vec<(&str, Box<dyn Fn(&mut ListController)>)> = vec![
        (
            "search",
            Box::new(|c: &mut ListController| c.set_filter::<SearchParam>(Some("acme".to_string()))),
        ),
        (
            "status",
            Box::new(|c: &mut ListController| c.set_filter::<StatusParam>(Some(set_of(&["won"])))),
        ),
        (
            "owner",
            Box::new(|c: &mut ListController| c.set_filter::<OwnerParam>(Some(set_of(&["sam"])))),
        ),
        (
            "date",
            Box::new(move |c: &mut ListController| c.set_filter::<DateRangeParam>(Some(range))),
        ),
        (
            "leadSource",
            Box::new(|c: &mut ListController| {
                c.set_filter::<LeadSourceParam>(Some("referral".to_string()))
            }),
        ),
    ];

    for (dimension, edit) in edits {
        let mut controller = ListController::new(Location::new("/leads"));
        controller.toggle_row("1");
        controller.toggle_row("7");

        edit(&mut controller);

        assert!(controller.selection().is_empty(), "{dimension} should clear selection");
        assert_eq!(controller.selection_clears(), 1, "{dimension} should clear once");
        assert_eq!(controller.notices().len(), 1, "{dimension} should queue one notice");
        assert_eq!(controller.notices().items()[0].message, SELECTION_CLEARED_NOTICE);
    }
}

#[test]
fn back_to_other_filters_clears_selection_once() {
    let mut controller = ListController::new(Location::new("/leads"));
    controller.set_filter::<StatusParam>(Some(set_of(&["won"])));
    controller.toggle_row("3");

    assert!(controller.back());

    assert_eq!(controller.filters().statuses, BTreeSet::new());
    assert!(controller.selection().is_empty());
    assert_eq!(controller.selection_clears(), 1);
    assert_eq!(controller.notices().len(), 1);
}

#[test]
fn back_across_a_page_change_keeps_selection() {
    let mut controller = ListController::new(Location::new("/leads"));
    controller.set_page(2);
    controller.toggle_row("3");

    assert!(controller.back());

    assert_eq!(controller.filters().page, 1);
    assert!(controller.selection().is_selected(&"3".to_string()));
    assert_eq!(controller.selection_clears(), 0);
}

#[test]
fn batch_apply_clears_selection_exactly_once() {
    let mut controller = ListController::new(Location::new("/leads"));
    controller.toggle_all_visible(&ids(&["1", "2", "3"]));

    let draft = FilterDraft {
        statuses: set_of(&["new"]),
        owners: set_of(&[UNASSIGNED_OWNER]),
        from: "2026-07-01".to_string(),
        to: "2026-09-30".to_string(),
        lead_source: UNKNOWN_LEAD_SOURCE.to_string(),
    };
    draft.apply(&mut controller).expect("draft should apply");

    assert_eq!(controller.selection_clears(), 1);
    assert_eq!(controller.notices().len(), 1);
    let filters = controller.filters();
    assert_eq!(filters.active_filter_count(), 4);
    assert!(controller.can_go_back());
}

#[test]
fn paging_sorting_and_page_size_keep_selection() {
    let mut controller = ListController::new(Location::new("/leads"));
    controller.toggle_row("1");

    controller.set_page(2);
    controller.toggle_sort("name");
    controller.set_page_size(50);

    assert!(controller.selection().is_selected(&"1".to_string()));
    assert_eq!(controller.selection_clears(), 0);
    assert!(controller.notices().is_empty());
}

#[test]
fn filter_change_without_selection_queues_no_notice() {
    let mut controller = ListController::new(Location::new("/leads"));

    controller.set_filter::<SearchParam>(Some("acme".to_string()));

    assert_eq!(controller.selection_clears(), 0);
    assert!(controller.notices().is_empty());
}

#[test]
fn header_click_sort_rules() {
    let mut controller = ListController::new(Location::parse("/leads?page=3"));

    controller.toggle_sort("createdAt");
    let filters = controller.filters();
    assert_eq!(filters.sort.order, SortOrder::Asc);
    assert_eq!(filters.page, 3, "flipping the order should keep the page");

    controller.toggle_sort("name");
    let filters = controller.filters();
    assert_eq!(filters.sort.by, "name");
    assert_eq!(filters.sort.order, SortOrder::Desc);
    assert_eq!(filters.page, 1);
}

#[test]
fn back_restores_previous_filters() {
    let mut controller = ListController::new(Location::new("/leads"));
    controller.set_filter::<StatusParam>(Some(set_of(&["won"])));
    controller.clear_all_filters();
    assert_eq!(controller.filters().active_filter_count(), 0);

    assert!(controller.back());
    assert_eq!(controller.filters().statuses, set_of(&["won"]));
    assert!(controller.back());
    assert!(!controller.can_go_back());
}

#[test]
fn draft_date_range_validation() {
    let mut draft = FilterDraft::default();
    assert_eq!(draft.date_range(), Ok(None));

    draft.from = "2026-07-01".to_string();
    assert!(draft.date_range().is_err(), "half a range should be rejected");

    draft.to = "2026-06-30".to_string();
    assert!(draft.date_range().is_err(), "reversed range should be rejected");

    draft.to = "2026-07-31".to_string();
    let range = draft.date_range().expect("range should parse");
    assert_eq!(range, DateRange::new(date(2026, 7, 1), date(2026, 7, 31)));
}

#[test]
fn facet_options_append_sentinels() {
    let owners = facet_options(&ids(&["Sam", "Kim"]), Some((UNASSIGNED_OWNER, "Unassigned")));
    assert_eq!(owners.last(), Some(&("unassigned".to_string(), "Unassigned".to_string())));
    assert_eq!(owners.len(), 3);

    let sources = facet_options(&ids(&["unknown", "web"]), Some((UNKNOWN_LEAD_SOURCE, "Unknown")));
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0], ("unknown".to_string(), "Unknown".to_string()));
}

#[tokio::test]
async fn last_quarter_is_sent_as_custom_range() {
    let transport = FakeTransport::replying(200, r#"{"success":true,"data":{"teamPerformance":[]}}"#);
    let service = QueryService::new(transport.clone());
    let filters = FilterState {
        period: Some(Period::LastQuarter),
        ..FilterState::default()
    };

    let result = service
        .fetch_sales_performance_on(&filters, date(2026, 10, 16))
        .await
        .expect("fetch should succeed");

    assert!(result.team_performance.is_empty());
    let request = transport.last_request();
    assert_eq!(request.query_value("period"), Some("custom"));
    assert_eq!(request.query_value("startDate"), Some("2026-07-01"));
    assert_eq!(request.query_value("endDate"), Some("2026-09-30"));
}

#[tokio::test]
async fn default_period_is_this_month() {
    let transport = FakeTransport::replying(200, r#"{"success":true,"data":{"teamPerformance":[]}}"#);
    let service = QueryService::new(transport.clone());

    service
        .fetch_sales_performance_on(&FilterState::default(), date(2026, 10, 16))
        .await
        .expect("fetch should succeed");

    let request = transport.last_request();
    assert_eq!(request.query_value("period"), Some("thisMonth"));
    assert_eq!(request.query_value("startDate"), None);
}

#[test]
fn custom_period_waits_for_a_complete_range() {
    let mut controller = ListController::new(Location::new("/sales"));

    controller.set_period(Some(Period::Custom));
    assert!(custom_range_missing(&controller.filters()));

    let range = DateRange::new(date(2026, 7, 1), date(2026, 9, 30)).expect("range should be valid");
    controller.set_filter::<DateRangeParam>(Some(range));
    assert!(!custom_range_missing(&controller.filters()));
    let request = sales_request(&controller.filters(), date(2026, 10, 16));
    assert_eq!(request.query_value("startDate"), Some("2026-07-01"));
    assert_eq!(request.query_value("endDate"), Some("2026-09-30"));
}

#[test]
fn leaving_custom_period_drops_its_range() {
    let mut controller =
        ListController::new(Location::parse("/sales?period=custom&from=2026-07-01&to=2026-09-30"));

    controller.set_period(Some(Period::ThisQuarter));

    assert_eq!(controller.query().get("period"), Some("thisQuarter"));
    assert_eq!(controller.query().get("from"), None);
    assert_eq!(controller.query().get("to"), None);
    assert_eq!(controller.filters().date_range, None);
}

#[tokio::test]
async fn service_unavailable_maps_to_typed_error() {
    let service = QueryService::new(FakeTransport::replying(503, ""));

    let err = service
        .fetch_leads(&FilterState::default())
        .await
        .expect_err("503 should fail");

    assert_eq!(err, ApiError::ServiceUnavailable);
    assert_eq!(err.code(), Some(SERVICE_UNAVAILABLE_CODE));
    assert_eq!(err.to_string(), SERVICE_UNAVAILABLE_MESSAGE);
}

#[tokio::test]
async fn missing_team_performance_is_invalid_response() {
    let service = QueryService::new(FakeTransport::replying(
        200,
        r#"{"success":true,"data":{"period":"thisMonth"}}"#,
    ));

    let err = service
        .fetch_sales_performance_on(&FilterState::default(), date(2026, 10, 16))
        .await
        .expect_err("missing teamPerformance should fail");

    assert_eq!(err.code(), Some(INVALID_RESPONSE_CODE));
}

#[tokio::test]
async fn backend_failure_envelope_keeps_code_and_message() {
    let service = QueryService::new(FakeTransport::replying(
        200,
        r#"{"success":false,"error":{"code":"RATE_LIMITED","message":"Slow down"}}"#,
    ));

    let err = service
        .fetch_campaigns(&FilterState::default())
        .await
        .expect_err("failure envelope should fail");

    assert_eq!(err.code(), Some("RATE_LIMITED"));
    assert_eq!(err.to_string(), "Slow down");
}

#[tokio::test]
async fn failure_envelope_is_classified_by_shape() {
    let typed = QueryService::new(FakeTransport::replying(
        200,
        r#"{"success":false,"error":{"code":"SERVICE_UNAVAILABLE","message":"down"}}"#,
    ))
    .fetch_leads(&FilterState::default())
    .await
    .expect_err("failure envelope should fail");
    assert_eq!(typed, ApiError::ServiceUnavailable);

    let bare = QueryService::new(FakeTransport::replying(200, r#"{"success":false,"error":"boom"}"#))
        .fetch_leads(&FilterState::default())
        .await
        .expect_err("failure envelope should fail");
    assert_eq!(bare, ApiError::api(None, "boom"));
}

#[tokio::test]
async fn auth_statuses_and_network_failures() {
    let unauthorized = QueryService::new(FakeTransport::replying(401, ""))
        .fetch_leads(&FilterState::default())
        .await
        .expect_err("401 should fail");
    assert_eq!(unauthorized, ApiError::SessionExpired);

    let forbidden = QueryService::new(FakeTransport::replying(403, ""))
        .fetch_leads(&FilterState::default())
        .await
        .expect_err("403 should fail");
    assert_eq!(forbidden, ApiError::Forbidden);

    let offline = QueryService::new(FakeTransport::failing(ApiError::network(None)))
        .fetch_leads(&FilterState::default())
        .await
        .expect_err("network failure should fail");
    assert_eq!(offline.to_string(), NETWORK_ERROR_MESSAGE);
}

#[tokio::test]
async fn leads_page_decodes_rows_and_filters() {
    let body = json!({
        "success": true,
        "data": {
            "leads": [{
                "id": 7,
                "name": "Ada",
                "email": "ada@example.com",
                "status": "new",
                "createdAt": "2026-10-01T12:00:00Z"
            }],
            "pagination": {"page": 2, "limit": 25, "total": 26, "totalPages": 2},
            "availableFilters": {"statuses": ["new", "won"], "owners": ["Sam"]}
        }
    })
    .to_string();
    let service = QueryService::new(FakeTransport::replying(200, &body));

    let page = service
        .fetch_leads(&FilterState::default())
        .await
        .expect("leads should decode");

    assert_eq!(page.rows.len(), 1);
    assert_eq!(page.rows[0].owner, None);
    assert_eq!(page.pagination.total_pages, 2);
    let filters = page.available_filters.expect("filters should be present");
    assert_eq!(filters.statuses, ids(&["new", "won"]));
    assert!(filters.lead_sources.is_empty());
}

#[test]
fn page_without_pagination_is_one_page_and_missing_rows_fail() {
    let data = json!({"leads": [{"id": 1, "name": "Ada", "status": "new"}]});
    let page: Page<Lead> = decode_page(&data, "leads").expect("rows should decode");
    assert_eq!(page.pagination.total_pages, 1);
    assert_eq!(page.pagination.total, 1);

    let err = decode_page::<Lead>(&json!({"pagination": null}), "leads")
        .expect_err("missing rows should fail");
    assert_eq!(err.code(), Some(INVALID_RESPONSE_CODE));
}

#[test]
fn cache_key_ignores_parameter_order() {
    let a = ApiRequest::new(LEADS_PATH).param("page", "1").param("limit", "25");
    let b = ApiRequest::new(LEADS_PATH).param("limit", "25").param("page", "1");

    assert_eq!(a.cache_key(), b.cache_key());
    assert_eq!(
        leads_request(&FilterState::default()).cache_key(),
        leads_request(&FilterState::from_query(&QueryString::parse("page=1"))).cache_key()
    );
}

#[test]
fn api_error_is_recognised_by_shape() {
    let from_code = ApiError::from_value(&json!({"code": "SERVICE_UNAVAILABLE", "message": "x"}));
    assert_eq!(from_code, Some(ApiError::ServiceUnavailable));

    let original = ApiError::invalid_response("Response is missing leads");
    assert_eq!(ApiError::from_value(&original.to_value()), Some(original));

    assert_eq!(ApiError::from_value(&json!({"message": "plain"})), None);
    assert_eq!(
        ApiError::from_unknown(&json!(42)),
        ApiError::network(None),
        "unrecognised values should fall back to a network error"
    );
}

#[test]
fn best_performer_picks_highest_rate() {
    let team = vec![
        member("1", "Alice", 35.0),
        member("2", "Bob", 10.0),
        member("3", "Cleo", 6.7),
    ];
    assert_eq!(best_performer(&team).map(|m| m.conversion_rate), Some(35.0));

    let tied = vec![member("1", "Zara", 40.0), member("2", "Alice", 40.0)];
    assert_eq!(best_performer(&tied).map(|m| m.name.as_str()), Some("Alice"));

    assert!(best_performer(&[]).is_none());
}

#[test]
fn team_totals_sum_the_team() {
    let team = vec![member("1", "Alice", 25.0), member("2", "Bob", 25.0)];

    let totals = team_totals(&team);

    assert_eq!(totals.leads_assigned, 40);
    assert_eq!(totals.leads_converted, 10);
    assert_eq!(totals.conversion_rate, 25.0);
    assert_eq!(totals.revenue, 2000.0);
}

#[test]
fn sort_rows_orders_by_column() {
    let mut team = vec![
        member("1", "Bob", 10.0),
        member("2", "alice", 30.0),
        member("3", "Cleo", 20.0),
    ];

    let sort = FilterState::from_query(&QueryString::parse("sortBy=conversionRate")).sort;
    sort_rows(&mut team, &sort);
    assert_eq!(team[0].name, "alice");

    let sort = FilterState::from_query(&QueryString::parse("sortBy=name&sortOrder=asc")).sort;
    sort_rows(&mut team, &sort);
    let names: Vec<&str> = team.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["alice", "Bob", "Cleo"]);
}

#[test]
fn query_state_drops_stale_responses() {
    let key_a = ApiRequest::new(LEADS_PATH).param("page", "1").cache_key();
    let key_b = ApiRequest::new(LEADS_PATH).param("page", "2").cache_key();
    let mut state: QueryState<Page<Lead>> = QueryState::new();

    assert!(state.request(key_a.clone()));
    assert!(state.request(key_b.clone()));
    assert!(!state.resolve(key_a.clone(), Ok(paginate(&[lead(1, "Ada")], 1, 25))));
    assert_eq!(state.status(), ViewStatus::Loading);

    assert!(state.resolve(key_b.clone(), Ok(paginate(&[lead(2, "Ben")], 1, 25))));
    assert_eq!(state.status(), ViewStatus::Loaded);
    assert_eq!(state.data().map(|p| p.rows[0].id), Some(2));

    assert!(!state.request(key_a), "cached key should not refetch");
    assert_eq!(state.data().map(|p| p.rows[0].id), Some(1));
}

#[test]
fn query_state_error_then_retry() {
    let key = ApiRequest::new(LEADS_PATH).param("page", "1").cache_key();
    let mut state: QueryState<Page<Lead>> = QueryState::new();

    assert!(state.request(key.clone()));
    state.resolve(key.clone(), Err(ApiError::ServiceUnavailable));
    assert_eq!(state.status(), ViewStatus::Error(ApiError::ServiceUnavailable));

    assert_eq!(state.retry(), Some(key.clone()));
    assert!(state.request(key.clone()), "retry should allow a fresh fetch");
    assert!(state.is_loading());

    state.resolve(key, Ok(paginate::<Lead>(&[], 1, 25)));
    assert_eq!(state.status(), ViewStatus::Empty);
}

#[test]
fn failed_key_stays_failed_until_retry() {
    let key_a = ApiRequest::new(LEADS_PATH).param("page", "1").cache_key();
    let key_b = ApiRequest::new(LEADS_PATH).param("page", "2").cache_key();
    let mut state: QueryState<Page<Lead>> = QueryState::new();

    assert!(state.request(key_a.clone()));
    state.resolve(key_a.clone(), Err(ApiError::ServiceUnavailable));

    assert!(
        !state.request(key_a.clone()),
        "asking for the failed key again should not refetch"
    );
    assert_eq!(state.status(), ViewStatus::Error(ApiError::ServiceUnavailable));

    assert!(state.request(key_b.clone()));
    state.resolve(key_b, Err(ApiError::network(None)));
    assert!(state.request(key_a), "an old failure should be forgotten");
    assert!(state.is_loading());
    assert_eq!(state.error(), None);
}

#[test]
fn late_failure_for_an_old_key_is_dropped() {
    let key_a = ApiRequest::new(LEADS_PATH).param("page", "1").cache_key();
    let key_b = ApiRequest::new(LEADS_PATH).param("page", "2").cache_key();
    let mut state: QueryState<Page<Lead>> = QueryState::new();

    assert!(state.request(key_a.clone()));
    assert!(state.request(key_b.clone()));
    assert!(!state.resolve(key_a.clone(), Err(ApiError::ServiceUnavailable)));

    assert!(state.request(key_a), "nothing should be remembered for the old key");
}

#[test]
fn debouncer_fires_once_after_quiet_window() {
    let start = Instant::now();
    let mut debouncer = SearchDebouncer::new(Duration::from_millis(300));

    debouncer.input("a", start);
    debouncer.input("ab", start + Duration::from_millis(100));

    assert_eq!(debouncer.poll(start + Duration::from_millis(350)), None);
    assert_eq!(
        debouncer.poll(start + Duration::from_millis(400)),
        Some("ab".to_string())
    );
    assert_eq!(debouncer.poll(start + Duration::from_millis(900)), None);
}

#[test]
fn export_filename_embeds_date_and_range() {
    let today = date(2026, 10, 16);
    assert_eq!(
        export_filename("leads", today, None, ExportFormat::Csv),
        "leads-2026-10-16.csv"
    );

    let range = DateRange::new(date(2026, 7, 1), date(2026, 9, 30));
    assert_eq!(
        export_filename("leads", today, range, ExportFormat::Xlsx),
        "leads-2026-10-16_2026-07-01_to_2026-09-30.xlsx"
    );
}

#[test]
fn export_without_selection_takes_the_shown_rows() {
    let shown = vec![lead(1, "Ada"), lead(2, "Ben")];
    let selection = SelectionStore::new();

    let picked = rows_for_export(&shown, &shown, &selection);

    assert_eq!(picked.rows, shown);
    assert_eq!(picked.missing, 0);
}

#[test]
fn export_collects_selected_rows_from_other_pages() {
    let page_one = vec![lead(1, "Ada"), lead(2, "Ben")];
    let page_two = vec![lead(3, "Cy"), lead(4, "Di"), lead(5, "Ed")];
    let mut controller = ListController::new(Location::new("/leads"));
    let mut state: QueryState<Page<Lead>> = QueryState::new();

    let first = leads_request(&controller.filters()).cache_key();
    assert!(state.request(first.clone()));
    state.resolve(first, Ok(paginate(&page_one, 1, 25)));
    controller.toggle_row("1");
    controller.toggle_row("2");

    controller.set_page(2);
    let second = leads_request(&controller.filters()).cache_key();
    assert!(state.request(second.clone()));
    state.resolve(second, Ok(paginate(&page_two, 1, 25)));

    let shown = state.data().map(|page| page.rows.clone()).unwrap_or_default();
    assert_eq!(shown, page_two);
    let loaded = state.cached().flat_map(|page| page.rows.iter());
    let picked = rows_for_export(&shown, loaded, controller.selection());

    let exported: Vec<i64> = picked.rows.iter().map(|row| row.id).collect();
    assert_eq!(exported, vec![1, 2], "only the selected rows should be exported");
    assert_eq!(picked.missing, 0);
}

#[test]
fn export_counts_selected_rows_that_are_not_loaded() {
    let page = vec![lead(1, "Ada"), lead(2, "Ben")];
    let mut selection = SelectionStore::new();
    selection.toggle("2".to_string());
    selection.toggle("99".to_string());

    let picked = rows_for_export(&page, page.iter().chain(page.iter()), &selection);

    assert_eq!(picked.rows.len(), 1, "a row seen twice should be exported once");
    assert_eq!(picked.rows[0].name, "Ben");
    assert_eq!(picked.missing, 1);
}

#[test]
fn csv_export_writes_labels_and_plain_numbers() {
    let mut row = lead(1, "Ada");
    row.company = None;

    let bytes = rows_to_csv(&[row]).expect("csv should encode");
    let text = String::from_utf8(bytes).expect("csv should be utf-8");
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "Name,Email,Company,Status,Owner,Source,Value,Created");
    assert_eq!(lines[1], "Ada,ada@example.com,,new,Sam,referral,1500.00,2026-10-01");
}

#[test]
fn xlsx_export_reads_back_with_info_sheet() {
    let temp_dir = unique_test_dir("xlsx-export");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");

    let service = ExportService::new("leads", "Leads");
    let range = DateRange::new(date(2026, 7, 1), date(2026, 9, 30));
    let file = service
        .export(&[lead(1, "Ada"), lead(2, "Ben")], ExportFormat::Xlsx, date(2026, 10, 16), range)
        .expect("xlsx should encode");
    assert_eq!(file.filename, "leads-2026-10-16_2026-07-01_to_2026-09-30.xlsx");

    let path = temp_dir.join(&file.filename);
    crate::platform::desktop::save_dialog::write_export(&path, &file)
        .expect("should write export");
    let bytes = fs::read(&path).expect("should read export back");

    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).expect("should open xlsx");
    assert_eq!(workbook.sheet_names(), vec!["Leads".to_string(), INFO_SHEET.to_string()]);

    let rows = workbook.worksheet_range("Leads").expect("should read rows");
    assert_eq!(rows.get_value((0, 0)), Some(&Data::String("Name".to_string())));
    assert_eq!(rows.get_value((2, 0)), Some(&Data::String("Ben".to_string())));
    assert_eq!(rows.get_value((1, 6)), Some(&Data::Float(1500.0)));

    let info = workbook.worksheet_range(INFO_SHEET).expect("should read info");
    assert_eq!(info.get_value((0, 1)), Some(&Data::String("2026-10-16".to_string())));
    assert_eq!(info.get_value((1, 1)), Some(&Data::Float(2.0)));
    assert_eq!(info.get_value((2, 1)), Some(&Data::String("2026-07-01".to_string())));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn config_file_then_env_overrides() {
    let temp_dir = unique_test_dir("config");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let path = temp_dir.join("config.json");
    fs::write(
        &path,
        r#"{"apiBaseUrl":"https://crm.example.com","defaultPageSize":7}"#,
    )
    .expect("should write config");

    let config = AppConfig::load_from(&path, |key| {
        (key == SESSION_ENV).then(|| "sid=abc".to_string())
    })
    .expect("config should load");

    assert_eq!(config.api_base_url, "https://crm.example.com");
    assert_eq!(config.session_cookie.as_deref(), Some("sid=abc"));
    assert_eq!(config.default_page_size, DEFAULT_PAGE_SIZE);
    assert_eq!(config.search_debounce(), Duration::from_millis(300));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn missing_config_file_uses_defaults() {
    let path = unique_test_dir("no-config").join("config.json");

    let config = AppConfig::load_from(&path, |key| {
        (key == API_BASE_URL_ENV).then(|| "https://staging.example.com".to_string())
    })
    .expect("missing file should not fail");

    assert_eq!(config.api_base_url, "https://staging.example.com");
    assert_eq!(config.session_cookie, None);
}

#[test]
fn configured_page_size_lands_in_initial_location() {
    let config = AppConfig {
        default_page_size: 50,
        ..AppConfig::default()
    };

    assert_eq!(
        initial_location("/leads", config.default_page_size).href(),
        "/leads?limit=50"
    );
    assert_eq!(
        initial_location("/leads", AppConfig::default().default_page_size).href(),
        "/leads"
    );
}

#[test]
fn list_resources_request_their_own_endpoint() {
    let filters = FilterState::from_query(&QueryString::parse("status=won&page=2"));

    assert_eq!(
        Lead::request(&filters).cache_key(),
        leads_request(&filters).cache_key()
    );
    assert_eq!(
        CampaignStat::request(&filters).cache_key(),
        campaigns_request(&filters).cache_key()
    );
    assert_ne!(
        Lead::request(&filters).cache_key(),
        CampaignStat::request(&filters).cache_key()
    );
    assert_ne!(Lead::EXPORT_PREFIX, CampaignStat::EXPORT_PREFIX);
}

#[test]
fn select_all_glyph_tracks_page_selection() {
    let visible = ids(&["1", "2"]);
    let mut selection = SelectionStore::new();

    let state = |s: &SelectionStore<String>| {
        select_all_state(s.is_all_selected(&visible), s.is_some_selected(&visible))
    };
    assert_eq!(state(&selection), ("☐", "false"));

    selection.toggle("2".to_string());
    assert_eq!(state(&selection), ("⊟", "mixed"));

    selection.toggle("1".to_string());
    assert_eq!(state(&selection), ("☑", "true"));
}

#[test]
fn number_formatting() {
    assert_eq!(format_number_with_commas(12345.678, 0), "12,346");
    assert_eq!(format_number_with_commas(-1234.5, 2), "-1,234.50");
    assert_eq!(format_number_with_commas(999.0, 0), "999");
    assert_eq!(format_currency(1234.5), "$1,234.50");
    assert_eq!(format_percent(35.0), "35.0%");
    assert_eq!(format_cell(&CellValue::Empty), "—");
}

#[test]
fn paginate_clamps_to_last_page() {
    let items: Vec<u32> = (1..=7).collect();

    let last = paginate(&items, 3, 3);
    assert_eq!(last.rows, vec![7]);
    assert_eq!(last.pagination.total_pages, 3);

    let clamped = paginate(&items, 9, 3);
    assert_eq!(clamped.pagination.page, 3);

    let empty = paginate::<u32>(&[], 1, 25);
    assert!(empty.is_empty());
    assert_eq!(empty.pagination.total_pages, 1);
}
