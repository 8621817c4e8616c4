use crate::model::TileStatus;
use crate::state::Sidebar;
use crate::util::{format_wei, short_address};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct TileInfoPanelProps {
    pub sidebar: Sidebar,
}

fn status_color(status: TileStatus) -> &'static str {
    match status {
        TileStatus::Unclaimed => "#3fb950",
        TileStatus::Listed => "#d29922",
        TileStatus::Owned => "#8b949e",
    }
}

#[function_component]
pub fn TileInfoPanel(props: &TileInfoPanelProps) -> Html {
    let sidebar = &props.sidebar;
    let row_style = "display:flex; justify-content:space-between; margin:4px 0; font-size:12px;";
    let label_style = "color:#8b949e;";
    let value_style = "font-weight:500; font-variant-numeric:tabular-nums;";

    let body = match (sidebar.tile, sidebar.meta) {
        (None, _) => html! {
            <div style="font-size:12px; opacity:0.6;">{"Move the pointer over the grid to inspect a tile."}</div>
        },
        (Some((_, pos)), None) => html! {
            <>
                <div style={row_style}>
                    <span style={label_style}>{"Position"}</span>
                    <span style={value_style}>{ format!("({}, {})", pos.x, pos.y) }</span>
                </div>
                <div style="font-size:12px; opacity:0.6;">{"Loading…"}</div>
            </>
        },
        (Some((_, pos)), Some(meta)) => {
            let status = meta.status();
            let owner = meta
                .owner
                .map(|o| short_address(&o))
                .unwrap_or_else(|| "—".to_string());
            html! {
                <>
                    <div style={row_style}>
                        <span style={label_style}>{"Position"}</span>
                        <span style={value_style}>{ format!("({}, {})", pos.x, pos.y) }</span>
                    </div>
                    <div style={row_style}>
                        <span style={label_style}>{"Owner"}</span>
                        <span style={value_style}>{ owner }</span>
                    </div>
                    <div style={row_style}>
                        <span style={label_style}>{"Status"}</span>
                        <span style={format!("{} color:{};", value_style, status_color(status))}>{ status.label() }</span>
                    </div>
                    { if let Some(price) = meta.price() {
                        html! {
                            <div style={row_style}>
                                <span style={label_style}>{"Price"}</span>
                                <span style={value_style}>{ format_wei(price) }</span>
                            </div>
                        }
                    } else { html! {} } }
                </>
            }
        }
    };

    html! {
        <div style="background:rgba(22,27,34,0.95); border:1px solid #30363d; border-radius:8px; padding:12px 16px; font-size:13px; color:#c9d1d9;">
            <div style="font-weight:600; font-size:15px; margin-bottom:8px;">{ sidebar.title() }</div>
            { body }
        </div>
    }
}
