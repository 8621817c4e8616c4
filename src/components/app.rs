use std::rc::Rc;

use super::{
    action_box::ActionBox, batch_panel::BatchPanel, controls_panel::ControlsPanel,
    grid_canvas::GridCanvas, tile_info_panel::TileInfoPanel,
};
use crate::config::AppConfig;
use crate::controller::web::WebApp;
use crate::error::AppError;
use crate::model::BatchAction;
use web_sys::HtmlCanvasElement;
use yew::prelude::*;

#[function_component(App)]
pub fn app() -> Html {
    let update = use_force_update();
    let web = use_state(move || -> Result<Rc<WebApp>, AppError> {
        let config = AppConfig::from_window()?;
        Ok(WebApp::new(config, Callback::from(move |_| update.force_update())))
    });

    // Startup reads: contract grid size, then the transfer watcher.
    {
        let web = web.clone();
        use_effect_with((), move |_| {
            match &*web {
                Ok(web) => {
                    web.sync_grid();
                    web.watch_transfers();
                }
                Err(e) => tracing::error!(error = %e, "cannot start"),
            }
            || ()
        });
    }

    let web = match &*web {
        Ok(web) => web.clone(),
        Err(e) => {
            return html! {
                <div style="margin:24px; padding:12px 16px; border:1px solid #da3633; border-radius:8px; color:#f85149; background:#1c2128;">
                    { e.to_string() }
                </div>
            };
        }
    };

    // Canvas events
    let on_mount = {
        let web = web.clone();
        Callback::from(move |canvas: HtmlCanvasElement| {
            let mut c = web.controller().borrow_mut();
            c.canvas_mut().attach(canvas);
            c.reset_view();
        })
    };
    let on_move = {
        let web = web.clone();
        Callback::from(move |(x, y): (f64, f64)| {
            web.controller().borrow_mut().pointer_moved(x, y);
        })
    };
    let on_leave = {
        let web = web.clone();
        Callback::from(move |_| {
            web.controller().borrow_mut().pointer_left();
            web.refresh();
        })
    };
    let on_click = {
        let web = web.clone();
        Callback::from(move |(x, y): (f64, f64)| {
            // errors already land in the notice
            let _ = web.controller().borrow_mut().click_at(x, y);
            web.refresh();
        })
    };

    // Controls
    let on_connect = {
        let web = web.clone();
        Callback::from(move |_| web.connect())
    };
    let on_pixel = {
        let web = web.clone();
        Callback::from(move |raw: String| {
            web.controller().borrow_mut().set_pixel_scale(&raw);
            web.refresh();
        })
    };
    let on_reset_view = {
        let web = web.clone();
        Callback::from(move |_| web.controller().borrow_mut().reset_view())
    };
    let on_clear_selection = {
        let web = web.clone();
        Callback::from(move |_| {
            web.controller().borrow_mut().clear_selection();
            web.refresh();
        })
    };
    let on_dismiss = {
        let web = web.clone();
        Callback::from(move |_| {
            web.controller().borrow_mut().dismiss_notice();
            web.refresh();
        })
    };

    // Action box
    let on_claim = {
        let web = web.clone();
        Callback::from(move |_| {
            let _ = web.controller().borrow_mut().queue_claim();
            web.refresh();
        })
    };
    let on_list = {
        let web = web.clone();
        Callback::from(move |price: String| {
            let _ = web.controller().borrow_mut().queue_list(&price);
            web.refresh();
        })
    };
    let on_buy = {
        let web = web.clone();
        Callback::from(move |_| {
            let _ = web.controller().borrow_mut().queue_buy();
            web.refresh();
        })
    };
    let on_cancel = {
        let web = web.clone();
        Callback::from(move |_| {
            let _ = web.controller().borrow_mut().queue_cancel();
            web.refresh();
        })
    };

    // Batch
    let on_run = {
        let web = web.clone();
        Callback::from(move |_| web.run_batch())
    };
    let on_clear_batch = {
        let web = web.clone();
        Callback::from(move |_| {
            web.controller().borrow_mut().clear_batch();
            web.refresh();
        })
    };

    let c = web.controller().borrow();
    let sidebar = c.sidebar().clone();
    let queued: Vec<BatchAction> = c.batch().iter().copied().collect();

    html! {
        <div style="display:flex; gap:12px; padding:12px; align-items:flex-start; color:#c9d1d9; background:#0d1117; min-height:100vh; box-sizing:border-box; font-family:system-ui, sans-serif;">
            <GridCanvas {on_mount} {on_move} {on_leave} {on_click} />
            <div style="display:flex; flex-direction:column; gap:10px; min-width:260px; max-width:300px;">
                <ControlsPanel
                    status={c.status().to_string()}
                    connected={c.session().is_some()}
                    pixel={c.pixel()}
                    bounds={web.config().pixel}
                    selection_label={c.selection_label()}
                    notice={c.notice().cloned()}
                    {on_connect}
                    {on_pixel}
                    {on_reset_view}
                    {on_clear_selection}
                    {on_dismiss}
                />
                <TileInfoPanel sidebar={sidebar.clone()} />
                <ActionBox
                    target={sidebar.action}
                    selected={c.selection().len()}
                    {on_claim}
                    {on_list}
                    {on_buy}
                    {on_cancel}
                />
                <BatchPanel
                    {queued}
                    counter={c.batch().counter()}
                    flushing={c.is_flushing()}
                    {on_run}
                    on_clear={on_clear_batch}
                />
            </div>
        </div>
    }
}
