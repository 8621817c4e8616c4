use web_sys::HtmlCanvasElement;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct GridCanvasProps {
    /// Called once with the mounted element so the renderer can attach to it.
    pub on_mount: Callback<HtmlCanvasElement>,
    pub on_move: Callback<(f64, f64)>,
    pub on_leave: Callback<()>,
    pub on_click: Callback<(f64, f64)>,
}

#[function_component]
pub fn GridCanvas(props: &GridCanvasProps) -> Html {
    let canvas_ref = use_node_ref();

    {
        let canvas_ref = canvas_ref.clone();
        let on_mount = props.on_mount.clone();
        use_effect_with((), move |_| {
            match canvas_ref.cast::<HtmlCanvasElement>() {
                Some(canvas) => on_mount.emit(canvas),
                None => tracing::error!("grid canvas not mounted"),
            }
            || ()
        });
    }

    let onmousemove = {
        let cb = props.on_move.clone();
        Callback::from(move |e: MouseEvent| cb.emit((e.offset_x() as f64, e.offset_y() as f64)))
    };
    let onmouseleave = {
        let cb = props.on_leave.clone();
        Callback::from(move |_: MouseEvent| cb.emit(()))
    };
    let onclick = {
        let cb = props.on_click.clone();
        Callback::from(move |e: MouseEvent| cb.emit((e.offset_x() as f64, e.offset_y() as f64)))
    };

    html! {
        <div style="overflow:auto; max-width:100%; max-height:calc(100vh - 24px); border:1px solid #30363d; border-radius:8px; background:#0d1117;">
            <canvas
                ref={canvas_ref}
                style="display:block; image-rendering:pixelated; cursor:crosshair;"
                {onmousemove}
                {onmouseleave}
                {onclick}
            />
        </div>
    }
}
