use crate::config::PixelBounds;
use crate::controller::{Notice, NoticeLevel};
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ControlsPanelProps {
    pub status: String,
    pub connected: bool,
    pub pixel: u32,
    pub bounds: PixelBounds,
    pub selection_label: String,
    pub notice: Option<Notice>,
    pub on_connect: Callback<()>,
    pub on_pixel: Callback<String>,
    pub on_reset_view: Callback<()>,
    pub on_clear_selection: Callback<()>,
    pub on_dismiss: Callback<()>,
}

fn notice_style(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "border-color:#1f6feb; color:#58a6ff;",
        NoticeLevel::Warn => "border-color:#9e6a03; color:#d29922;",
        NoticeLevel::Error => "border-color:#da3633; color:#f85149;",
    }
}

#[function_component]
pub fn ControlsPanel(props: &ControlsPanelProps) -> Html {
    let connect_cb = {
        let cb = props.on_connect.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let reset_cb = {
        let cb = props.on_reset_view.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let clear_cb = {
        let cb = props.on_clear_selection.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let dismiss_cb = {
        let cb = props.on_dismiss.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let pixel_cb = {
        let cb = props.on_pixel.clone();
        Callback::from(move |e: Event| cb.emit(e.target_unchecked_into::<HtmlInputElement>().value()))
    };

    html! {<div style="background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; display:flex; flex-direction:column; gap:6px;">
        <div style="display:flex; gap:6px; align-items:center;">
            <button onclick={connect_cb} disabled={props.connected}>{ if props.connected { "Connected" } else { "Connect wallet" } }</button>
            <span style="font-size:12px; opacity:0.8;">{ props.status.clone() }</span>
        </div>
        <label style="display:flex; gap:6px; align-items:center; font-size:12px;">
            {"px / tile"}
            <input
                type="number"
                style="width:56px; background:#0d1117; color:#c9d1d9; border:1px solid #30363d; border-radius:4px; padding:2px 4px;"
                min={props.bounds.min.to_string()}
                max={props.bounds.max.to_string()}
                value={props.pixel.to_string()}
                onchange={pixel_cb}
            />
        </label>
        <div style="display:flex; gap:6px;">
            <button onclick={reset_cb}>{"Reset view"}</button>
            <button onclick={clear_cb}>{"Clear selection"}</button>
        </div>
        { if !props.selection_label.is_empty() { html!{ <div style="font-size:12px;">{ props.selection_label.clone() }</div> } } else { html!{} } }
        { if let Some(n) = &props.notice {
            html!{ <div onclick={dismiss_cb} title="dismiss" style={format!("font-size:11px; line-height:1.2; background:#1c2128; border:1px solid; padding:4px 6px; border-radius:6px; cursor:pointer; {}", notice_style(n.level))}>{ n.text.clone() }</div> }
        } else { html!{} } }
    </div>}
}
