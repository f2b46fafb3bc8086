use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct RegistrationOverlayProps {
    pub show: bool,
    pub max_len: usize,
    /// Raw callsign as typed; normalized by the profile.
    pub on_register: Callback<String>,
    pub on_skip: Callback<()>,
}

#[function_component(RegistrationOverlay)]
pub fn registration_overlay(props: &RegistrationOverlayProps) -> Html {
    let input_ref = use_node_ref();
    if !props.show {
        return html! {};
    }
    let start_btn = {
        let input_ref = input_ref.clone();
        let cb = props.on_register.clone();
        Callback::from(move |_| {
            if let Some(input) = input_ref.cast::<HtmlInputElement>() {
                cb.emit(input.value());
            }
        })
    };
    let on_key = {
        let input_ref = input_ref.clone();
        let cb = props.on_register.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                if let Some(input) = input_ref.cast::<HtmlInputElement>() {
                    cb.emit(input.value());
                }
            }
        })
    };
    let skip_cb = props.on_skip.clone();
    let skip_btn = Callback::from(move |_| skip_cb.emit(()));
    html! {
        <div style="position:absolute; inset:0; display:flex; align-items:center; justify-content:center; background:rgba(0,0,0,0.6); backdrop-filter:blur(14px);">
            <div style="display:flex; flex-direction:column; align-items:center; gap:14px; padding:28px 36px; border:1px solid rgba(0,255,0,0.3); background:rgba(0,0,0,0.85); font-family:'Space Mono', monospace;">
                <div style="color:#00FF00; font-size:1.4rem; letter-spacing:0.3em; font-weight:700;">{"LIVE PUZZLE"}</div>
                <div style="color:rgba(255,255,255,0.5); font-size:0.55rem; letter-spacing:0.2em;">{"ENTER YOUR CALLSIGN"}</div>
                <input ref={input_ref} maxlength={props.max_len.to_string()} onkeydown={on_key}
                    style="background:transparent; border:1px solid #00FF00; color:#00FF00; padding:8px 12px; font-family:inherit; font-size:0.7rem; text-transform:uppercase; text-align:center; letter-spacing:0.2em;" />
                <button onclick={start_btn} style="background:#00FF00; color:#000; border:none; padding:8px 24px; font-family:inherit; font-size:0.65rem; letter-spacing:0.2em; cursor:pointer;">{"START"}</button>
                <button onclick={skip_btn} style="background:none; border:none; color:rgba(0,255,0,0.4); font-family:inherit; font-size:0.5rem; cursor:pointer;">{"SKIP"}</button>
            </div>
        </div>
    }
}
