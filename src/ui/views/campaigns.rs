use std::future::Future;
use std::sync::Arc;

use dioxus::prelude::*;

use crate::domain::entities::filter::FilterState;
use crate::domain::entities::records::{CampaignStat, Page};
use crate::ui::state::list_controller::ListController;
use crate::ui::views::list::{list_view, ListResource};
use crate::usecase::ports::api::{ApiError, ApiRequest};
use crate::usecase::services::query_service::{campaigns_request, QueryService};

impl ListResource for CampaignStat {
    const TITLE: &'static str = "Campaigns";
    const LOADING_LABEL: &'static str = "campaign stats";
    const EXPORT_PREFIX: &'static str = "campaigns";
    const EMPTY_MESSAGE: &'static str = "No campaigns match the current filters.";

    fn request(filters: &FilterState) -> ApiRequest {
        campaigns_request(filters)
    }

    fn fetch(
        service: Arc<QueryService>,
        filters: FilterState,
    ) -> impl Future<Output = Result<Page<Self>, ApiError>> + 'static {
        async move { service.fetch_campaigns(&filters).await }
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

#[component]
pub fn CampaignsView(controller: Signal<ListController>) -> Element {
    list_view::<CampaignStat>(controller)
}
