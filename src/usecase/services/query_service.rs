use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::entities::filter::{
    DateRange, FilterState, Period, DEFAULT_PERIOD, UNKNOWN_LEAD_SOURCE,
};
use crate::domain::entities::records::{
    AvailableFilters, CampaignStat, Lead, Page, Pagination, SalesPerformance,
};
use crate::usecase::ports::api::{ApiError, ApiRequest, RawResponse, Transport};

pub const LEADS_PATH: &str = "/api/admin/leads";
pub const CAMPAIGNS_PATH: &str = "/api/admin/campaigns/stats";
pub const SALES_PERFORMANCE_PATH: &str = "/api/admin/sales-performance";

pub const LEADS_FIELD: &str = "leads";
pub const CAMPAIGNS_FIELD: &str = "campaigns";

/// What the backend expects for "lead source not recorded".
pub const BACKEND_UNKNOWN_LEAD_SOURCE: &str = "__unknown__";

const DATE_FORMAT: &str = "%Y-%m-%d";

fn join(values: &BTreeSet<String>) -> Option<String> {
    (!values.is_empty()).then(|| values.iter().cloned().collect::<Vec<_>>().join(","))
}

fn date_param(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn with_list_params(request: ApiRequest, filters: &FilterState) -> ApiRequest {
    request
        .param("page", filters.page.to_string())
        .param("limit", filters.page_size.to_string())
        .param("sortBy", filters.sort.by.clone())
        .param("sortOrder", filters.sort.order.as_str())
        .param_opt("search", filters.search.clone())
        .param_opt("status", join(&filters.statuses))
        .param_opt("from", filters.date_range.map(|range| date_param(range.from)))
        .param_opt("to", filters.date_range.map(|range| date_param(range.to)))
}

pub fn leads_request(filters: &FilterState) -> ApiRequest {
    let lead_source = filters.lead_source.as_deref().map(|source| {
        if source == UNKNOWN_LEAD_SOURCE {
            BACKEND_UNKNOWN_LEAD_SOURCE.to_string()
        } else {
            source.to_string()
        }
    });

    with_list_params(ApiRequest::new(LEADS_PATH), filters)
        .param_opt("owner", join(&filters.owners))
        .param_opt("leadSource", lead_source)
}

pub fn campaigns_request(filters: &FilterState) -> ApiRequest {
    with_list_params(ApiRequest::new(CAMPAIGNS_PATH), filters)
}

/// A custom period cannot be requested until both bounds are chosen.
pub fn custom_range_missing(filters: &FilterState) -> bool {
    filters.period == Some(Period::Custom) && filters.date_range.is_none()
}

/// The backend has no "last quarter" period; it gets `custom` plus the
/// explicit bounds of the previous calendar quarter.
pub fn sales_request(filters: &FilterState, today: NaiveDate) -> ApiRequest {
    let period = filters.period.unwrap_or(DEFAULT_PERIOD);
    let range = match period {
        Period::LastQuarter => Some(DateRange::previous_quarter(today)),
        Period::Custom => filters.date_range,
        _ => None,
    };
    let backend_period = match period {
        Period::LastQuarter => Period::Custom,
        other => other,
    };

    ApiRequest::new(SALES_PERFORMANCE_PATH)
        .param("period", backend_period.as_str())
        .param_opt("startDate", range.map(|r| date_param(r.from)))
        .param_opt("endDate", range.map(|r| date_param(r.to)))
        .param_opt("owner", join(&filters.owners))
}

/// Unwraps the `{success, data, error}` envelope.
pub fn decode_envelope(response: &RawResponse) -> Result<Value, ApiError> {
    match response.status {
        401 => return Err(ApiError::SessionExpired),
        403 => return Err(ApiError::Forbidden),
        503 => return Err(ApiError::ServiceUnavailable),
        _ => {}
    }

    if !response.is_success() {
        let message = if response.status_text.trim().is_empty() {
            format!("Request failed with status {}", response.status)
        } else {
            response.status_text.clone()
        };
        return Err(ApiError::Api {
            code: None,
            message,
            status: Some(response.status),
        });
    }

    let envelope: Value = serde_json::from_str(&response.body)
        .map_err(|err| ApiError::invalid_response(format!("Response is not valid JSON: {err}")))?;

    match envelope.get("success").and_then(Value::as_bool) {
        Some(true) => envelope
            .get("data")
            .filter(|data| !data.is_null())
            .cloned()
            .ok_or_else(|| ApiError::invalid_response("Response is missing data")),
        Some(false) => {
            let error = envelope.get("error").unwrap_or(&Value::Null);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Request failed");
            Err(match error {
                Value::Object(_) => {
                    ApiError::from_value(error).unwrap_or_else(|| ApiError::api(None, message))
                }
                Value::Null => ApiError::api(None, message),
                other => ApiError::from_unknown(other),
            })
        }
        None => Err(ApiError::invalid_response(
            "Response is missing the success flag",
        )),
    }
}

fn required_field<'a>(data: &'a Value, field: &str) -> Result<&'a Value, ApiError> {
    data.get(field)
        .filter(|value| !value.is_null())
        .ok_or_else(|| ApiError::invalid_response(format!("Response is missing {field}")))
}

fn decode_field<T: DeserializeOwned>(value: &Value, field: &str) -> Result<T, ApiError> {
    serde_json::from_value(value.clone())
        .map_err(|err| ApiError::invalid_response(format!("Malformed {field}: {err}")))
}

pub fn decode_page<T: DeserializeOwned>(
    data: &Value,
    rows_field: &str,
) -> Result<Page<T>, ApiError> {
    let rows_value = required_field(data, rows_field)?;
    if !rows_value.is_array() {
        return Err(ApiError::invalid_response(format!(
            "Response field {rows_field} is not a list"
        )));
    }
    let rows: Vec<T> = decode_field(rows_value, rows_field)?;

    let pagination = match data.get("pagination").filter(|v| !v.is_null()) {
        Some(value) => decode_field::<Pagination>(value, "pagination")?,
        None => Pagination {
            page: 1,
            limit: rows.len() as u32,
            total: rows.len() as u64,
            total_pages: 1,
        },
    };
    let available_filters = match data.get("availableFilters").filter(|v| !v.is_null()) {
        Some(value) => Some(decode_field::<AvailableFilters>(value, "availableFilters")?),
        None => None,
    };

    Ok(Page {
        rows,
        pagination,
        available_filters,
    })
}

pub fn decode_sales_performance(data: &Value) -> Result<SalesPerformance, ApiError> {
    let team = required_field(data, "teamPerformance")?;
    if !team.is_array() {
        return Err(ApiError::invalid_response(
            "Response field teamPerformance is not a list",
        ));
    }
    decode_field(data, "sales performance")
}

/// Turns filter states into backend calls. Each fetch is a single attempt;
/// retry is up to the caller.
pub struct QueryService {
    transport: Arc<dyn Transport>,
}

impl QueryService {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn execute(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        debug!(request = %request.path_and_query(), "fetching");
        let result = match self.transport.get(request).await {
            Ok(response) => decode_envelope(&response),
            Err(err) => Err(err),
        };
        if let Err(err) = &result {
            warn!(path = request.path, error = %err.to_value(), "request failed");
        }
        result
    }

    /// One page of rows found under `rows_field` in the response data.
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        rows_field: &str,
    ) -> Result<Page<T>, ApiError> {
        let data = self.execute(request).await?;
        decode_page(&data, rows_field)
    }

    pub async fn fetch_leads(&self, filters: &FilterState) -> Result<Page<Lead>, ApiError> {
        self.fetch_page(&leads_request(filters), LEADS_FIELD).await
    }

    pub async fn fetch_campaigns(
        &self,
        filters: &FilterState,
    ) -> Result<Page<CampaignStat>, ApiError> {
        self.fetch_page(&campaigns_request(filters), CAMPAIGNS_FIELD)
            .await
    }

    pub async fn fetch_sales_performance(
        &self,
        filters: &FilterState,
    ) -> Result<SalesPerformance, ApiError> {
        let today = chrono::Local::now().date_naive();
        self.fetch_sales_performance_on(filters, today).await
    }

    pub async fn fetch_sales_performance_on(
        &self,
        filters: &FilterState,
        today: NaiveDate,
    ) -> Result<SalesPerformance, ApiError> {
        let data = self.execute(&sales_request(filters, today)).await?;
        decode_sales_performance(&data)
    }
}
