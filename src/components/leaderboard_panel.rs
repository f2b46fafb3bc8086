use crate::leaderboard::{PanelRow, PanelState};
use crate::util::format_clock;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct LeaderboardPanelProps {
    pub state: PanelState,
    pub size: usize,
}

fn row(r: &PanelRow) -> Html {
    let style = if r.is_user {
        "background:rgba(0,255,0,0.08); font-weight:700; color:#00FF00;"
    } else {
        "color:rgba(0,255,0,0.8);"
    };
    html! {
        <div style={format!("{} font-size:0.65rem; line-height:2.2; display:flex; justify-content:space-between; padding:0 4px;", style)}>
            <span>{ format!("{}. {}", r.rank, r.name) }</span>
            <span>{ format_clock(r.seconds) }</span>
        </div>
    }
}

#[function_component]
pub fn LeaderboardPanel(props: &LeaderboardPanelProps) -> Html {
    let notice = |text: &'static str, color: &'static str| {
        html! { <div style={format!("color:{}; font-size:0.45rem;", color)}>{ text }</div> }
    };
    let body = match &props.state {
        PanelState::Loading => notice("LOADING", "rgba(0,255,0,0.4)"),
        PanelState::Empty => notice("NO SUBMISSIONS", "rgba(0,255,0,0.4)"),
        PanelState::LoadError => notice("LOAD ERROR", "#FF0000"),
        PanelState::Loaded { rows, user_rank } => html! {<>
            { for rows.iter().map(row) }
            { if rows.is_empty() { notice("NO SUBMISSIONS", "rgba(0,255,0,0.4)") } else { html!{} } }
            { if let Some(r) = user_rank { html!{<>
                <div style="color:rgba(0,255,0,0.3); font-size:0.55rem; text-align:center; padding:2px 0;">{"···"}</div>
                { row(r) }
            </>} } else { html!{} } }
        </>},
    };
    html! {<div id="leaderboard-panel" style="position:absolute; top:12px; left:12px; background:rgba(0,0,0,0.7); border:1px solid rgba(0,255,0,0.3); border-radius:4px; padding:10px 14px; min-width:160px; font-family:'Space Mono', monospace;">
        <div style="color:#00FF00; font-size:0.7rem; letter-spacing:0.2em; margin-bottom:10px; font-weight:700;">{ format!("TOP {}", props.size) }</div>
        { body }
    </div>}
}
