use dioxus::prelude::*;

use crate::domain::entities::filter::PAGE_SIZE_OPTIONS;
use crate::domain::entities::records::Pagination;
use crate::ui::format::format_number_with_commas;

#[component]
pub fn Pager(
    pagination: Pagination,
    page_size: u32,
    on_page: EventHandler<u32>,
    on_page_size: EventHandler<u32>,
) -> Element {
    let page = pagination.page.max(1);
    let total_pages = pagination.total_pages.max(1);
    let total = format_number_with_commas(pagination.total as f64, 0);

    rsx! {
        div { style: "display: flex; gap: 12px; align-items: center; padding: 8px 0;",
            button {
                disabled: page <= 1,
                onclick: move |_| on_page.call(page - 1),
                "Previous"
            }
            span { "Page {page} of {total_pages} ({total} total)" }
            button {
                disabled: page >= total_pages,
                onclick: move |_| on_page.call(page + 1),
                "Next"
            }
            label { style: "display: inline-flex; gap: 6px; align-items: center;",
                "Rows per page"
                select {
                    value: "{page_size}",
                    onchange: move |event| {
                        if let Ok(size) = event.value().parse::<u32>() {
                            on_page_size.call(size);
                        }
                    },
                    for size in PAGE_SIZE_OPTIONS {
                        option { key: "{size}", value: "{size}", selected: size == page_size, "{size}" }
                    }
                }
            }
        }
    }
}
