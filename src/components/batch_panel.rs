use crate::model::BatchAction;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct BatchPanelProps {
    pub queued: Vec<BatchAction>,
    pub counter: String,
    pub flushing: bool,
    pub on_run: Callback<()>,
    pub on_clear: Callback<()>,
}

#[function_component]
pub fn BatchPanel(props: &BatchPanelProps) -> Html {
    let run_cb = {
        let cb = props.on_run.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let clear_cb = {
        let cb = props.on_clear.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let idle = !props.flushing;

    html! {
        <div style="background:rgba(22,27,34,0.95); border:1px solid #30363d; border-radius:8px; padding:10px 14px; display:flex; flex-direction:column; gap:6px;">
            <div style="display:flex; justify-content:space-between; font-weight:600;">
                <span>{"Batch"}</span>
                <span style="font-variant-numeric:tabular-nums;">{ props.counter.clone() }</span>
            </div>
            if props.queued.is_empty() {
                <div style="font-size:12px; opacity:0.6;">{"Queue is empty."}</div>
            } else {
                <ol style="margin:0 0 0 18px; padding:0; font-size:12px; display:flex; flex-direction:column; gap:2px;">
                    { for props.queued.iter().map(|a| html! { <li>{ a.describe() }</li> }) }
                </ol>
            }
            <div style="display:flex; gap:6px;">
                <button onclick={run_cb} disabled={!idle || props.queued.is_empty()}>
                    { if idle { "Run batch" } else { "Running…" } }
                </button>
                <button onclick={clear_cb} disabled={!idle}>{"Clear batch"}</button>
            </div>
        </div>
    }
}
