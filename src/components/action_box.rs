use crate::model::ActionPanel;
use crate::state::PanelTarget;
use crate::util::format_wei;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ActionBoxProps {
    pub target: Option<PanelTarget>,
    /// Number of selected tiles; actions apply to all of them when non-zero.
    pub selected: usize,
    pub on_claim: Callback<()>,
    pub on_list: Callback<String>,
    pub on_buy: Callback<()>,
    pub on_cancel: Callback<()>,
}

#[function_component]
pub fn ActionBox(props: &ActionBoxProps) -> Html {
    let price = use_state(String::new);

    let Some(target) = props.target else {
        return html! {};
    };

    let scope = if props.selected > 0 {
        format!("Applies to {} selected tile(s)", props.selected)
    } else {
        format!("Applies to tile #{}", target.tile)
    };

    let claim_cb = {
        let cb = props.on_claim.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let buy_cb = {
        let cb = props.on_buy.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let cancel_cb = {
        let cb = props.on_cancel.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let price_input = {
        let price = price.clone();
        Callback::from(move |e: InputEvent| {
            price.set(e.target_unchecked_into::<HtmlInputElement>().value());
        })
    };
    let list_cb = {
        let cb = props.on_list.clone();
        let price = price.clone();
        Callback::from(move |_| cb.emit((*price).clone()))
    };

    let buttons = match target.panel {
        ActionPanel::Claim => html! {
            <button onclick={claim_cb}>{"Claim"}</button>
        },
        ActionPanel::List => html! {
            <div style="display:flex; gap:6px; align-items:center;">
                <input
                    type="text"
                    placeholder="price in ETH"
                    style="flex:1; min-width:0; background:#0d1117; color:#c9d1d9; border:1px solid #30363d; border-radius:4px; padding:3px 6px;"
                    value={(*price).clone()}
                    oninput={price_input}
                />
                <button onclick={list_cb}>{"List"}</button>
            </div>
        },
        ActionPanel::Buy { price_wei } => html! {
            <div style="display:flex; gap:6px;">
                <button onclick={buy_cb}>{ format!("Buy for {}", format_wei(price_wei)) }</button>
                <button onclick={cancel_cb}>{"Cancel listing"}</button>
            </div>
        },
    };

    html! {
        <div style="background:rgba(22,27,34,0.95); border:1px solid #30363d; border-radius:8px; padding:10px 14px; display:flex; flex-direction:column; gap:6px;">
            <div style="font-weight:600;">{"Actions"}</div>
            { buttons }
            <div style="font-size:11px; opacity:0.7;">{ scope }</div>
        </div>
    }
}
