use dioxus::prelude::*;

#[component]
pub fn DetailPanel(title: String, fields: Vec<(String, String)>, on_close: EventHandler<()>) -> Element {
    rsx! {
        aside { style: "position: fixed; top: 0; right: 0; bottom: 0; width: 360px; background: #fff; border-left: 1px solid #bbb; box-shadow: -8px 0 24px rgba(0,0,0,0.12); padding: 16px; overflow-y: auto; z-index: 1100;",
            div { style: "display: flex; justify-content: space-between; align-items: center;",
                h3 { "{title}" }
                button { onclick: move |_| on_close.call(()), "Close" }
            }
            dl {
                for (label, value) in fields {
                    dt { style: "font-weight: bold; margin-top: 8px;", "{label}" }
                    dd { style: "margin: 0;", "{value}" }
                }
            }
        }
    }
}
