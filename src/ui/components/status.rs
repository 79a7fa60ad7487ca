use dioxus::prelude::*;

use crate::usecase::ports::api::{ApiError, ApiErrorKind};

fn error_title(error: &ApiError) -> &'static str {
    match error.kind() {
        ApiErrorKind::ServiceUnavailable => "Service unavailable",
        ApiErrorKind::Network => "Connection problem",
        ApiErrorKind::Forbidden => "Access denied",
        ApiErrorKind::SessionExpired => "Session expired",
        ApiErrorKind::Api | ApiErrorKind::InvalidResponse => "Could not load data",
    }
}

#[component]
pub fn LoadingState(label: String) -> Element {
    rsx! {
        div { style: "padding: 24px; color: #666;", "Loading {label}…" }
    }
}

#[component]
pub fn EmptyState(message: String, has_filters: bool, on_clear_filters: EventHandler<()>) -> Element {
    rsx! {
        div { style: "padding: 24px; color: #666; display: flex; gap: 12px; align-items: center;",
            span { "{message}" }
            if has_filters {
                button { onclick: move |_| on_clear_filters.call(()), "Clear filters" }
            }
        }
    }
}

#[component]
pub fn ErrorState(error: ApiError, on_retry: EventHandler<()>) -> Element {
    let title = error_title(&error);
    let code = error.code().unwrap_or("").to_string();

    rsx! {
        div { style: "padding: 16px; border: 1px solid #d24; border-radius: 6px; background: #fff5f5;",
            strong { "{title}" }
            p { "{error}" }
            if !code.is_empty() {
                p { style: "color: #999; font-size: 12px;", "Code: {code}" }
            }
            button { onclick: move |_| on_retry.call(()), "Retry" }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::cell::Cell;
    use std::rc::Rc;

    use dioxus::dioxus_core::{Mutation, VirtualDom};
    use dioxus::html::{
        set_event_converter, PlatformEventData, SerializedHtmlEventConverter, SerializedMouseData,
    };
    use dioxus::prelude::*;

    use super::*;

    #[derive(Clone)]
    struct ErrorHarness {
        error: ApiError,
        retries: Rc<Cell<u32>>,
    }

    fn error_view(props: ErrorHarness) -> Element {
        let retries = props.retries.clone();
        rsx! {
            ErrorState {
                error: props.error.clone(),
                on_retry: move |_| retries.set(retries.get() + 1),
            }
        }
    }

    fn retries_after_clicking(error: ApiError) -> u32 {
        set_event_converter(Box::new(SerializedHtmlEventConverter));
        let retries = Rc::new(Cell::new(0));
        let mut dom = VirtualDom::new_with_props(
            error_view,
            ErrorHarness {
                error,
                retries: retries.clone(),
            },
        );
        let listeners: Vec<_> = dom
            .rebuild_to_vec()
            .edits
            .into_iter()
            .filter_map(|edit| match edit {
                Mutation::NewEventListener { name, id } if name == "click" => Some(id),
                _ => None,
            })
            .collect();
        assert_eq!(listeners.len(), 1, "the error state should offer one retry control");

        let event = Event::new(
            Rc::new(PlatformEventData::new(Box::<SerializedMouseData>::default())) as Rc<dyn Any>,
            true,
        );
        dom.runtime().handle_event("click", event, listeners[0]);
        retries.get()
    }

    #[test]
    fn every_error_kind_can_be_retried() {
        for error in [
            ApiError::Forbidden,
            ApiError::SessionExpired,
            ApiError::ServiceUnavailable,
            ApiError::network(None),
        ] {
            assert_eq!(retries_after_clicking(error.clone()), 1, "{error:?} should retry");
        }
    }
}
