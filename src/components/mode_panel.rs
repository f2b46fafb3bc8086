use crate::state::SessionPhase;
use crate::util::format_clock;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ModePanelProps {
    pub phase: SessionPhase,
    pub seconds: u64,
}

#[function_component(ModePanel)]
pub fn mode_panel(props: &ModePanelProps) -> Html {
    let show_clock = props.phase != SessionPhase::Capture;
    html! {<div id="mode-panel" style="position:absolute; top:12px; left:50%; transform:translateX(-50%); display:flex; flex-direction:column; align-items:center; gap:4px; color:#00FF00; font-family:'Space Mono', monospace; letter-spacing:0.2em;">
        <div style="font-size:0.7rem; font-weight:700;">{ format!("MODE: {}", props.phase.label()) }</div>
        { if show_clock { html!{ <div style="font-size:0.65rem; font-variant-numeric:tabular-nums;">{ format_clock(props.seconds) }</div> } } else { html!{} } }
    </div>}
}
