use crate::util::format_clock;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct StatsPanelProps {
    pub callsign: String,
    pub best: Option<u64>,
    pub games_played: u32,
}

#[function_component]
pub fn StatsPanel(props: &StatsPanelProps) -> Html {
    let label_style = "color:rgba(0,255,0,0.6); font-size:0.55rem; letter-spacing:0.1em; margin-bottom:2px;";
    let value_style = "color:#00FF00; font-size:0.65rem; margin-bottom:8px; font-variant-numeric:tabular-nums;";
    let best = props.best.map(format_clock).unwrap_or_else(|| "--:--".to_string());
    html! {
        <div id="personal-panel" style="position:absolute; top:12px; right:12px; background:rgba(0,0,0,0.7); border:1px solid rgba(0,255,0,0.3); border-radius:4px; padding:10px 14px; min-width:140px; font-family:'Space Mono', monospace;">
            <div style="color:#00FF00; font-size:0.7rem; letter-spacing:0.2em; margin-bottom:10px; font-weight:700;">{"YOUR STATS"}</div>
            <div style={label_style}>{"CALLSIGN"}</div>
            <div style={value_style}>{ props.callsign.clone() }</div>
            <div style={label_style}>{"BEST TIME"}</div>
            <div style={value_style}>{ best }</div>
            <div style={label_style}>{"GAMES PLAYED"}</div>
            <div style={value_style}>{ props.games_played }</div>
        </div>
    }
}
