use std::sync::Arc;

use anyhow::Result;
use dioxus::prelude::*;
use tracing::info;

use crate::config::AppConfig;
use crate::infra::http::reqwest_transport::ReqwestTransport;
use crate::ui::state::app_state::{AppState, Route, Services};
use crate::ui::views::campaigns::CampaignsView;
use crate::ui::views::leads::LeadsView;
use crate::ui::views::sales::SalesView;
use crate::usecase::services::query_service::QueryService;

pub fn build_services(config: AppConfig) -> Result<Services> {
    let transport = ReqwestTransport::new(&config.api_base_url, config.session_cookie.clone())?;
    info!(api = %config.api_base_url, "services ready");
    Ok(Services {
        query: Arc::new(QueryService::new(Arc::new(transport))),
        config: Arc::new(config),
    })
}

fn tab_style(active: bool) -> &'static str {
    if active {
        "border: 1px solid #3a6; background: #e8f5ec; padding: 6px 14px; border-radius: 6px; cursor: pointer; font-weight: bold;"
    } else {
        "border: 1px solid #bbb; background: #fff; padding: 6px 14px; border-radius: 6px; cursor: pointer;"
    }
}

#[component]
fn SignInScreen(login_url: String) -> Element {
    let app = use_context::<AppState>();
    let mut route = app.route;
    let return_to = app.return_to;

    rsx! {
        div { style: "max-width: 480px; margin: 48px auto; display: flex; flex-direction: column; gap: 12px;",
            h2 { "Session expired" }
            p { "Your session is no longer valid. Sign in again at:" }
            code { "{login_url}" }
            p { style: "color: #666;",
                "Once signed in, update the session cookie in the configuration and retry."
            }
            button { onclick: move |_| route.set(return_to()), "Retry" }
        }
    }
}

#[component]
fn Shell(services: Services) -> Element {
    let login_url = services.config.login_url.clone();
    use_context_provider(move || services);
    let app = use_context::<AppState>();
    let mut route = app.route;
    let mut forbidden = app.forbidden;
    let current = route();
    let (leads, campaigns, sales) = (app.leads, app.campaigns, app.sales);

    rsx! {
        div {
            style: "font-family: sans-serif; padding: 12px; background: #fff; min-height: 100vh; height: 100vh; display: flex; flex-direction: column; box-sizing: border-box;",
            nav {
                style: "display: flex; gap: 8px; align-items: center; margin-bottom: 12px; position: sticky; top: 0; background: #fff; z-index: 900; padding: 8px 0;",
                for tab in Route::TABS {
                    button {
                        key: "{tab.path()}",
                        style: "{tab_style(tab == current)}",
                        onclick: move |_| {
                            forbidden.set(false);
                            route.set(tab);
                        },
                        "{tab.label()}"
                    }
                }
            }
            if forbidden() {
                div { style: "padding: 8px 12px; margin-bottom: 8px; border: 1px solid #d94; background: #fff8e6; border-radius: 6px;",
                    "You don't have permission to view this data."
                }
            }
            div { style: "flex: 1 1 auto; min-height: 0;",
                {match current {
                    Route::Leads => rsx! { LeadsView { controller: leads } },
                    Route::Campaigns => rsx! { CampaignsView { controller: campaigns } },
                    Route::Sales => rsx! { SalesView { controller: sales } },
                    Route::SignIn => rsx! { SignInScreen { login_url } },
                }}
            }
        }
    }
}

#[component]
pub fn App() -> Element {
    let built = use_hook(|| {
        AppConfig::load()
            .and_then(build_services)
            .map_err(|err| format!("{err:#}"))
    });
    let app = AppState::new(built.as_ref().ok().map(|services| services.config.as_ref()));
    use_context_provider(|| app);

    match built {
        Ok(services) => rsx! { Shell { services } },
        Err(err) => rsx! {
            div {
                p { "Could not start: {err}" }
            }
        },
    }
}
