use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dioxus::prelude::*;
use tracing::debug;

use crate::config::AppConfig;
use crate::domain::entities::filter::{FilterState, DEFAULT_PAGE_SIZE};
use crate::domain::params::{FilterParam, PageSizeParam};
use crate::domain::query_string::Location;
use crate::ui::state::debounce::SearchDebouncer;
use crate::ui::state::list_controller::ListController;
use crate::ui::state::query_state::{QueryState, RowCount};
use crate::usecase::ports::api::{ApiError, QueryKey};
use crate::usecase::services::query_service::QueryService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Leads,
    Campaigns,
    Sales,
    SignIn,
}

impl Route {
    pub const TABS: [Route; 3] = [Route::Leads, Route::Campaigns, Route::Sales];

    pub fn path(self) -> &'static str {
        match self {
            Route::Leads => "/leads",
            Route::Campaigns => "/campaigns",
            Route::Sales => "/sales",
            Route::SignIn => "/login",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Route::Leads => "Leads",
            Route::Campaigns => "Campaigns",
            Route::Sales => "Sales performance",
            Route::SignIn => "Sign in",
        }
    }
}

#[derive(Clone)]
pub struct Services {
    pub query: Arc<QueryService>,
    pub config: Arc<AppConfig>,
}

impl PartialEq for Services {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.query, &other.query) && Arc::ptr_eq(&self.config, &other.config)
    }
}

/// App-wide signals shared through context. The list controllers live here
/// rather than in their views, so a view that is unmounted by a tab switch
/// or a trip through sign-in comes back with its filters and history.
#[derive(Clone, Copy)]
pub struct AppState {
    pub route: Signal<Route>,
    pub return_to: Signal<Route>,
    pub forbidden: Signal<bool>,
    pub leads: Signal<ListController>,
    pub campaigns: Signal<ListController>,
    pub sales: Signal<ListController>,
}

impl AppState {
    pub fn new(config: Option<&AppConfig>) -> Self {
        let page_size = config.map_or(DEFAULT_PAGE_SIZE, |c| c.default_page_size);
        Self {
            route: use_signal(|| Route::Leads),
            return_to: use_signal(|| Route::Leads),
            forbidden: use_signal(|| false),
            leads: use_signal(|| {
                ListController::new(initial_location(Route::Leads.path(), page_size))
            }),
            campaigns: use_signal(|| {
                ListController::new(initial_location(Route::Campaigns.path(), page_size))
            }),
            sales: use_signal(|| {
                ListController::new(initial_location(Route::Sales.path(), page_size))
            }),
        }
    }

    /// 401 sends the user to sign in; 403 only flags missing permission.
    pub fn handle_auth_error(mut self, error: &ApiError) {
        match error {
            ApiError::SessionExpired => {
                let current = (self.route)();
                if current != Route::SignIn {
                    self.return_to.set(current);
                }
                self.route.set(Route::SignIn);
            }
            ApiError::Forbidden => self.forbidden.set(true),
            _ => {}
        }
    }
}

/// Signals owned by one mounted list view. The controller is borrowed from
/// [`AppState`]; the rest is rebuilt on every mount.
pub struct ListViewState<T: 'static> {
    pub controller: Signal<ListController>,
    pub query: Signal<QueryState<T>>,
    pub search_text: Signal<String>,
    pub debouncer: Signal<SearchDebouncer>,
    pub detail_row: Signal<Option<String>>,
    pub reload: Signal<u64>,
}

/// Starting location for a list view. A configured page size other than the
/// built-in default is written into the query so it survives navigation.
pub fn initial_location(path: &str, default_page_size: u32) -> Location {
    let mut location = Location::new(path);
    if default_page_size != DEFAULT_PAGE_SIZE {
        PageSizeParam::write(&mut location.query, Some(&default_page_size));
    }
    location
}

impl<T: RowCount + 'static> ListViewState<T> {
    pub fn new(controller: Signal<ListController>, debounce: Duration) -> Self {
        Self {
            controller,
            query: use_signal(QueryState::<T>::new),
            search_text: use_signal(String::new),
            debouncer: use_signal(|| SearchDebouncer::new(debounce)),
            detail_row: use_signal(|| None::<String>),
            reload: use_signal(|| 0_u64),
        }
    }
}

/// Issues one fetch per distinct request key. The effect only depends on
/// the key and `reload`, so selection or notice changes never refetch.
/// `key_of` returns `None` while the filters cannot form a request yet.
pub fn use_list_query<T, F, Fut>(
    controller: Signal<ListController>,
    mut query: Signal<QueryState<T>>,
    reload: Signal<u64>,
    key_of: fn(&FilterState) -> Option<QueryKey>,
    fetch: F,
) where
    T: RowCount + 'static,
    F: Fn(FilterState) -> Fut + 'static,
    Fut: Future<Output = Result<T, ApiError>> + 'static,
{
    let app = use_context::<AppState>();
    let key = use_memo(move || key_of(&controller.read().filters()));
    use_effect(move || {
        let _ = reload();
        let Some(key) = key() else {
            return;
        };
        let filters = controller.peek().filters();
        if !query.write().request(key.clone()) {
            return;
        }
        let pending = fetch(filters);
        spawn(async move {
            let result = pending.await;
            if let Err(error) = &result {
                app.handle_auth_error(error);
            }
            if !query.write().resolve(key, result) {
                debug!("dropped response for a superseded request");
            }
        });
    });
}

pub fn retry_query<T: RowCount + 'static>(
    mut query: Signal<QueryState<T>>,
    mut reload: Signal<u64>,
) {
    query.write().retry();
    *reload.write() += 1;
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    use dioxus::dioxus_core::VirtualDom;
    use dioxus::prelude::*;

    use super::*;
    use crate::domain::params::StatusParam;

    #[derive(Clone, Default)]
    struct Harness {
        app: Rc<RefCell<Option<AppState>>>,
        seen: Rc<RefCell<Vec<String>>>,
    }

    #[component]
    fn QueryEcho(controller: Signal<ListController>, seen: Rc<RefCell<Vec<String>>>) -> Element {
        let query = controller.read().query().to_string();
        seen.borrow_mut().push(query);
        rsx! { div {} }
    }

    fn shell(harness: Harness) -> Element {
        let app = AppState::new(None);
        use_context_provider(|| app);
        *harness.app.borrow_mut() = Some(app);
        let seen = harness.seen.clone();
        rsx! {
            if (app.route)() == Route::Leads {
                QueryEcho { controller: app.leads, seen }
            }
        }
    }

    #[test]
    fn list_filters_survive_a_tab_switch() {
        let harness = Harness::default();
        let mut dom = VirtualDom::new_with_props(shell, harness.clone());
        let _ = dom.rebuild_to_vec();
        let app = harness.app.borrow().expect("shell should have built app state");

        dom.in_runtime(|| {
            let mut leads = app.leads;
            leads
                .write()
                .set_filter::<StatusParam>(Some(BTreeSet::from(["won".to_string()])));
            let mut route = app.route;
            route.set(Route::Campaigns);
        });
        let _ = dom.render_immediate_to_vec();

        dom.in_runtime(|| {
            let mut route = app.route;
            route.set(Route::Leads);
        });
        let _ = dom.render_immediate_to_vec();

        let seen = harness.seen.borrow();
        assert_eq!(seen.first().map(String::as_str), Some(""));
        assert_eq!(
            seen.last().map(String::as_str),
            Some("status=won&page=1"),
            "a remounted view should see the filters set before it unmounted"
        );
    }
}
