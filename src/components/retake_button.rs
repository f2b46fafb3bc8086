use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct RetakeButtonProps {
    pub show: bool,
    pub on_retake: Callback<()>,
}

#[function_component]
pub fn RetakeButton(props: &RetakeButtonProps) -> Html {
    if !props.show {
        return html! {};
    }
    let retake_cb = {
        let cb = props.on_retake.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! {<div style="position:absolute; bottom:12px; left:50%; transform:translateX(-50%);">
        <button onclick={retake_cb} style="background:transparent; color:#00FF00; border:1px solid #00FF00; padding:6px 14px; font-family:'Space Mono', monospace; font-size:0.6rem; letter-spacing:0.2em; cursor:pointer;">{"RETAKE"}</button>
    </div>}
}
