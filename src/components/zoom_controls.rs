use crate::app::BoardCtx;
use leptos::prelude::*;

const BUTTON_STYLE: &str = "width: 32px; height: 32px; background: #ffffff; color: #111827; \
                            border: 1px solid #e5e7eb; border-radius: 6px; cursor: pointer; \
                            font-family: Inter, system-ui, sans-serif; font-size: 14px;";

#[component]
pub fn ZoomControls() -> impl IntoView {
    let ctx = use_context::<BoardCtx>().expect("ZoomControls must be rendered inside App");

    let percent = move || format!("{:.0}%", ctx.viewport.with(|v| v.scale) * 100.0);

    view! {
        <div style="position: fixed; bottom: 12px; right: 12px; display: flex; align-items: center; gap: 6px; \
                    font-family: Inter, system-ui, sans-serif; font-size: 12px; color: #4b5563;">
            <button style=BUTTON_STYLE title="Zoom out" on:click=move |_| ctx.set_viewport.update(|v| v.zoom_out())>
                "-"
            </button>
            <span style="min-width: 44px; text-align: center;">{percent}</span>
            <button style=BUTTON_STYLE title="Zoom in" on:click=move |_| ctx.set_viewport.update(|v| v.zoom_in())>
                "+"
            </button>
            <button style=BUTTON_STYLE title="Reset view" on:click=move |_| ctx.set_viewport.update(|v| v.reset())>
                "1:1"
            </button>
        </div>
    }
}
