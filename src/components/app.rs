use super::{
    leaderboard_panel::LeaderboardPanel, puzzle_view::PuzzleView,
    registration_overlay::RegistrationOverlay, stats_panel::StatsPanel,
};
use crate::browser::storage::{WebProfile, load_config, web_leaderboard, web_profile};
use crate::config::GameConfig;
use crate::error::RegistrationError;
use crate::leaderboard::{Leaderboard, PanelState};
use tracing::{info, warn};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

#[derive(Clone, PartialEq)]
struct PlayerStats {
    callsign: String,
    best: Option<u64>,
    games_played: u32,
}

impl PlayerStats {
    fn read(profile: &WebProfile) -> Self {
        Self {
            callsign: profile.display_name(),
            best: profile.personal_best(),
            games_played: profile.games_played(),
        }
    }
}

fn refresh_panel(config: &GameConfig, panel: UseStateHandle<PanelState>) {
    let profile = web_profile(config);
    let name = profile.registered_name();
    let best = profile.personal_best();
    let size = config.leaderboard_size;
    spawn_local(async move {
        let board = web_leaderboard();
        panel.set(PanelState::load(&board, name.as_deref(), best, size).await);
    });
}

#[function_component(App)]
pub fn app() -> Html {
    let config = use_memo((), |_| load_config());
    let registering = {
        let config = config.clone();
        use_state(move || web_profile(&config).is_first_visit())
    };
    let stats = {
        let config = config.clone();
        use_state(move || PlayerStats::read(&web_profile(&config)))
    };
    let panel = use_state(|| PanelState::Loading);
    let status = use_state(|| None::<String>);

    {
        let config = config.clone();
        let panel = panel.clone();
        use_effect_with((), move |_| {
            refresh_panel(&config, panel);
            || ()
        });
    }

    let on_register = {
        let config = config.clone();
        let registering = registering.clone();
        let stats = stats.clone();
        let panel = panel.clone();
        Callback::from(move |raw: String| {
            let profile = web_profile(&config);
            match profile.register(&raw) {
                Ok(name) => {
                    spawn_local(async move {
                        if let Err(err) = web_leaderboard().register_user(&name).await {
                            warn!(error = %err, "user registration not saved");
                        }
                    });
                }
                // keep the overlay up until something usable is typed
                Err(RegistrationError::EmptyName) => return,
                Err(err) => warn!(error = %err, "callsign not stored, continuing as guest"),
            }
            registering.set(false);
            stats.set(PlayerStats::read(&profile));
            refresh_panel(&config, panel.clone());
        })
    };

    let on_skip = {
        let config = config.clone();
        let registering = registering.clone();
        Callback::from(move |_| {
            if let Err(err) = web_profile(&config).skip_registration() {
                warn!(error = %err, "skip not stored");
            }
            registering.set(false);
        })
    };

    let on_complete = {
        let config = config.clone();
        let stats = stats.clone();
        let panel = panel.clone();
        let status = status.clone();
        Callback::from(move |seconds: u64| {
            let profile = web_profile(&config);
            match profile.record_completion(seconds) {
                Ok(record) => info!(seconds, best = record.new_personal_best, "run recorded"),
                Err(err) => warn!(error = %err, "completion not stored"),
            }
            stats.set(PlayerStats::read(&profile));
            status.set(None);

            let Some(name) = profile.registered_name() else {
                refresh_panel(&config, panel.clone());
                return;
            };
            let config = (*config).clone();
            let panel = panel.clone();
            let status = status.clone();
            spawn_local(async move {
                match web_leaderboard().submit_or_update_best(&name, seconds).await {
                    Ok(ack) => status.set(Some(ack.status_text().to_string())),
                    Err(err) => warn!(error = %err, "score submit failed"),
                }
                refresh_panel(&config, panel);
            });
        })
    };

    let on_play_again = {
        let status = status.clone();
        Callback::from(move |_| status.set(None))
    };

    html! {
        <div id="app" style="position:relative; width:100vw; height:100vh; background:#000; color:#00FF00; display:flex; align-items:center; justify-content:center;">
            <PuzzleView
                config={(*config).clone()}
                status={(*status).clone()}
                on_complete={on_complete}
                on_play_again={on_play_again}
            />
            <LeaderboardPanel state={(*panel).clone()} size={config.leaderboard_size} />
            <StatsPanel
                callsign={stats.callsign.clone()}
                best={stats.best}
                games_played={stats.games_played}
            />
            <RegistrationOverlay
                show={*registering}
                max_len={config.callsign_max_len}
                on_register={on_register}
                on_skip={on_skip}
            />
        </div>
    }
}
