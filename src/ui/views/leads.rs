use std::future::Future;
use std::sync::Arc;

use dioxus::prelude::*;

use crate::domain::entities::filter::FilterState;
use crate::domain::entities::records::{Lead, Page};
use crate::ui::state::list_controller::ListController;
use crate::ui::views::list::{list_view, ListResource};
use crate::usecase::ports::api::{ApiError, ApiRequest};
use crate::usecase::services::query_service::{leads_request, QueryService};

impl ListResource for Lead {
    const TITLE: &'static str = "Leads";
    const LOADING_LABEL: &'static str = "leads";
    const EXPORT_PREFIX: &'static str = "leads";
    const EMPTY_MESSAGE: &'static str = "No leads match the current filters.";
    const SHOW_OWNER: bool = true;
    const SHOW_LEAD_SOURCE: bool = true;

    fn request(filters: &FilterState) -> ApiRequest {
        leads_request(filters)
    }

    fn fetch(
        service: Arc<QueryService>,
        filters: FilterState,
    ) -> impl Future<Output = Result<Page<Self>, ApiError>> + 'static {
        async move { service.fetch_leads(&filters).await }
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

#[component]
pub fn LeadsView(controller: Signal<ListController>) -> Element {
    list_view::<Lead>(controller)
}
