use crate::app::BoardCtx;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

/// Inline title editor laid over the task being edited.
#[component]
pub fn NodeEditor() -> impl IntoView {
    let ctx = use_context::<BoardCtx>().expect("NodeEditor must be rendered inside App");

    let commit = move |node_id: &str, text: String| {
        if ctx.editing_node.get_untracked().as_deref() != Some(node_id) {
            return;
        }
        ctx.set_editing_node.set(None);
        ctx.set_board.update(|b| {
            if let Some(mut task) = b.get_node(node_id).cloned() {
                let title = text.trim();
                if !title.is_empty() {
                    task.details.title = title.to_string();
                }
                task.temporary = false;
                b.upsert_node(task);
            }
        });
    };

    // Escape abandons the edit; a task that was never committed goes away.
    let cancel = move |node_id: &str| {
        if ctx.editing_node.get_untracked().as_deref() != Some(node_id) {
            return;
        }
        ctx.set_editing_node.set(None);
        let temporary = ctx.board.with_untracked(|b| b.get_node(node_id).is_some_and(|t| t.temporary));
        if temporary {
            ctx.delete_task(node_id);
        }
    };

    move || {
        let node_id = ctx.editing_node.get()?;
        let initial_text = ctx
            .board
            .with_untracked(|b| b.get_node(&node_id).map(|t| t.details.title.clone()))?;

        let id_for_style = node_id.clone();
        let style = move || {
            let size = ctx.config.node_size();
            let vp = ctx.viewport.get();
            let position = ctx
                .board
                .with(|b| b.get_node(&id_for_style).map(|t| t.position))
                .unwrap_or_default();
            let screen = vp.canvas_to_screen(position).sub(vp.origin);
            let inset = size.height * vp.scale;
            format!(
                "position: absolute; left: {}px; top: {}px; width: {}px; height: {}px; \
                 font-size: {}px; background: #ffffff; color: #111827; \
                 border: 2px solid #2563eb; border-radius: 9999px; outline: none; \
                 box-sizing: border-box; padding: 0 {}px; \
                 font-family: Inter, system-ui, sans-serif; font-weight: 600;",
                screen.x,
                screen.y,
                size.width * vp.scale,
                inset,
                (13.0 * vp.scale).max(7.0),
                inset,
            )
        };

        let id_for_blur = node_id.clone();
        let on_blur = move |ev: web_sys::FocusEvent| {
            if let Some(input) = ev.target().and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok()) {
                commit(&id_for_blur, input.value());
            }
        };

        let on_keydown = move |ev: web_sys::KeyboardEvent| match ev.key().as_str() {
            "Enter" => {
                if let Some(input) = ev.target().and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok()) {
                    commit(&node_id, input.value());
                }
            }
            "Escape" => cancel(&node_id),
            _ => {}
        };

        Some(view! {
            <input
                type="text"
                value=initial_text
                autofocus=true
                style=style
                on:blur=on_blur
                on:keydown=on_keydown
            />
        })
    }
}
