use crate::util::format_clock;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct CompleteOverlayProps {
    pub show: bool,
    pub seconds: u64,
    /// Leaderboard submission outcome, once known.
    pub status: Option<String>,
    pub play_again: Callback<()>,
}

#[function_component]
pub fn CompleteOverlay(props: &CompleteOverlayProps) -> Html {
    if !props.show {
        return html! {};
    }
    let play_again_cb = props.play_again.clone();
    let play_again_btn = Callback::from(move |_| play_again_cb.emit(()));
    html! {
        <div style="position:absolute; top:50%; left:50%; transform:translate(-50%, -50%); background:rgba(0,0,0,0.85); border:1px solid #00FF00; box-shadow:0 0 40px rgba(0,255,0,0.15); padding:24px 32px; border-radius:8px; text-align:center; min-width:280px; color:#00FF00; font-family:'Space Mono', monospace;">
            <div style="font-size:3.5rem; filter:drop-shadow(0 0 12px #00FF00);">{"\u{1F3C6}"}</div>
            <h2 style="margin:0 0 12px 0; font-size:1.8rem; letter-spacing:0.2em; text-shadow:0 0 20px rgba(0,255,0,0.6);">{"COMPLETE!"}</h2>
            <p style="margin:4px 0; font-size:1.3rem; font-weight:700;">{ format_clock(props.seconds) }</p>
            { if let Some(status) = &props.status { html!{ <p style="margin:8px 0 0 0; font-size:0.65rem; letter-spacing:0.2em; opacity:0.8;">{ status.clone() }</p> } } else { html!{} } }
            <div style="margin-top:16px;">
                <button onclick={play_again_btn} style="background:transparent; color:#00FF00; border:1px solid #00FF00; padding:8px 18px; font-family:inherit; letter-spacing:0.2em; cursor:pointer;">{"PLAY AGAIN"}</button>
            </div>
        </div>
    }
}
