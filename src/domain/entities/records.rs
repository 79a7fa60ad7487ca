use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
    pub sortable: bool,
}

const fn column(key: &'static str, label: &'static str, sortable: bool) -> Column {
    Column {
        key,
        label,
        sortable,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(u64),
    Currency(f64),
    Percent(f64),
    Empty,
}

impl CellValue {
    fn text(value: &str) -> CellValue {
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        }
    }

    fn optional(value: Option<&String>) -> CellValue {
        value.map_or(CellValue::Empty, |v| CellValue::text(v))
    }
}

/// A backend row shown in a list view.
pub trait ListRow: Clone + PartialEq + 'static {
    fn row_id(&self) -> String;
    fn columns() -> &'static [Column];
    fn cell(&self, key: &str) -> CellValue;

    fn cells(&self) -> Vec<CellValue> {
        Self::columns().iter().map(|col| self.cell(col.key)).collect()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Int(number) => number.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    pub status: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub lead_source: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub created_at: String,
}

const LEAD_COLUMNS: [Column; 8] = [
    column("name", "Name", true),
    column("email", "Email", false),
    column("company", "Company", true),
    column("status", "Status", true),
    column("owner", "Owner", true),
    column("leadSource", "Source", true),
    column("value", "Value", true),
    column("createdAt", "Created", true),
];

impl ListRow for Lead {
    fn row_id(&self) -> String {
        self.id.to_string()
    }

    fn columns() -> &'static [Column] {
        &LEAD_COLUMNS
    }

    fn cell(&self, key: &str) -> CellValue {
        match key {
            "name" => CellValue::text(&self.name),
            "email" => CellValue::text(&self.email),
            "company" => CellValue::optional(self.company.as_ref()),
            "status" => CellValue::text(&self.status),
            "owner" => CellValue::optional(self.owner.as_ref()),
            "leadSource" => CellValue::optional(self.lead_source.as_ref()),
            "value" => self.value.map_or(CellValue::Empty, CellValue::Currency),
            "createdAt" => {
                CellValue::text(self.created_at.get(..10).unwrap_or(self.created_at.as_str()))
            }
            _ => CellValue::Empty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStat {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub sent: u64,
    #[serde(default)]
    pub delivered: u64,
    #[serde(default)]
    pub opened: u64,
    #[serde(default)]
    pub clicked: u64,
    #[serde(default)]
    pub bounced: u64,
    #[serde(default)]
    pub open_rate: f64,
    #[serde(default)]
    pub click_rate: f64,
    #[serde(default)]
    pub sent_at: Option<String>,
}

const CAMPAIGN_COLUMNS: [Column; 9] = [
    column("name", "Campaign", true),
    column("status", "Status", true),
    column("sent", "Sent", true),
    column("delivered", "Delivered", true),
    column("opened", "Opened", true),
    column("clicked", "Clicked", true),
    column("openRate", "Open rate", true),
    column("clickRate", "Click rate", true),
    column("sentAt", "Sent at", true),
];

impl ListRow for CampaignStat {
    fn row_id(&self) -> String {
        self.id.clone()
    }

    fn columns() -> &'static [Column] {
        &CAMPAIGN_COLUMNS
    }

    fn cell(&self, key: &str) -> CellValue {
        match key {
            "name" => CellValue::text(&self.name),
            "status" => CellValue::text(&self.status),
            "sent" => CellValue::Integer(self.sent),
            "delivered" => CellValue::Integer(self.delivered),
            "opened" => CellValue::Integer(self.opened),
            "clicked" => CellValue::Integer(self.clicked),
            "openRate" => CellValue::Percent(self.open_rate),
            "clickRate" => CellValue::Percent(self.click_rate),
            "sentAt" => CellValue::optional(self.sent_at.as_ref()),
            _ => CellValue::Empty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberPerformance {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub leads_assigned: u64,
    #[serde(default)]
    pub leads_converted: u64,
    #[serde(default)]
    pub conversion_rate: f64,
    #[serde(default)]
    pub revenue: f64,
}

const TEAM_COLUMNS: [Column; 5] = [
    column("name", "Sales rep", true),
    column("leadsAssigned", "Leads", true),
    column("leadsConverted", "Converted", true),
    column("conversionRate", "Conversion", true),
    column("revenue", "Revenue", true),
];

impl ListRow for TeamMemberPerformance {
    fn row_id(&self) -> String {
        self.id.clone()
    }

    fn columns() -> &'static [Column] {
        &TEAM_COLUMNS
    }

    fn cell(&self, key: &str) -> CellValue {
        match key {
            "name" => CellValue::text(&self.name),
            "leadsAssigned" => CellValue::Integer(self.leads_assigned),
            "leadsConverted" => CellValue::Integer(self.leads_converted),
            "conversionRate" => CellValue::Percent(self.conversion_rate),
            "revenue" => CellValue::Currency(self.revenue),
            _ => CellValue::Empty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableFilters {
    #[serde(default)]
    pub statuses: Vec<String>,
    #[serde(default)]
    pub owners: Vec<String>,
    #[serde(default)]
    pub lead_sources: Vec<String>,
}

/// One fetched page of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub pagination: Pagination,
    pub available_filters: Option<AvailableFilters>,
}

impl<T> Page<T> {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesPerformance {
    pub team_performance: Vec<TeamMemberPerformance>,
    #[serde(default)]
    pub period: Option<String>,
}

/// Windows an in-memory result list. `page` is 1-based and clamped to the
/// last page.
pub fn paginate<T: Clone>(items: &[T], page: u32, page_size: u32) -> Page<T> {
    let limit = page_size.max(1);
    let total = items.len() as u64;
    let total_pages = (items.len() as u32).div_ceil(limit).max(1);
    let page = page.clamp(1, total_pages);
    let start = ((page - 1) * limit) as usize;
    let rows = items
        .iter()
        .skip(start)
        .take(limit as usize)
        .cloned()
        .collect();

    Page {
        rows,
        pagination: Pagination {
            page,
            limit,
            total,
            total_pages,
        },
        available_filters: None,
    }
}
