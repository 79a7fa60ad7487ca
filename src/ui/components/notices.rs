use dioxus::prelude::*;

use crate::ui::state::notices::{Notice, NoticeLevel};

#[component]
pub fn NoticeList(notices: Vec<Notice>, on_dismiss: EventHandler<u64>) -> Element {
    rsx! {
        div { style: "position: fixed; right: 16px; bottom: 16px; display: flex; flex-direction: column; gap: 8px; z-index: 1200;",
            for notice in notices {
                {
                    let background = match notice.level {
                        NoticeLevel::Info => "#eef4ff",
                        NoticeLevel::Error => "#fff0f0",
                    };
                    let id = notice.id;
                    rsx! {
                        div {
                            key: "{id}",
                            style: "background: {background}; border: 1px solid #bbb; border-radius: 6px; padding: 8px 12px; display: flex; gap: 12px; align-items: center; box-shadow: 0 4px 12px rgba(0,0,0,0.1);",
                            span { "{notice.message}" }
                            button { onclick: move |_| on_dismiss.call(id), "×" }
                        }
                    }
                }
            }
        }
    }
}
