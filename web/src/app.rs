use minefront_core::{GameOutcome, PlayerIdentity};
use minefront_protocol::DifficultyLevel;
use yew::prelude::*;

use crate::api;
use crate::game::GameView;
use crate::leaderboard::LeaderboardView;
use crate::prompt::NamePrompt;
use crate::stats::StatsView;
use crate::theme::Theme;
use crate::utils::*;

impl StorageKey for PlayerIdentity {
    const KEY: &'static str = "minefront:player";
}

pub(crate) enum Msg {
    SubmitName(PlayerIdentity),
    EditName,
    ToggleTheme,
    GameFinished(GameOutcome),
}

/// Application shell: owns the persisted player name and theme preference
/// and wires the game to the read-only panels.
pub(crate) struct App {
    player: Option<PlayerIdentity>,
    theme: Option<Theme>,
    editing_name: bool,
    /// Counts won games so the panels know when to refetch
    games_won: u32,
}

/// One-shot startup check that the compiled-in difficulty table still
/// agrees with the service. The local table stays authoritative either way.
fn check_service_config() {
    wasm_bindgen_futures::spawn_local(async {
        match api::game_config().await {
            Ok(config) => {
                for difficulty in DifficultyLevel::ALL {
                    let local = difficulty.config();
                    let remote = config.difficulties.for_difficulty(difficulty);
                    if (remote.width, remote.height, remote.mines)
                        != (local.width, local.height, local.mines)
                    {
                        log::warn!(
                            "service reports a different {} layout: {}x{} with {} mines",
                            difficulty,
                            remote.width,
                            remote.height,
                            remote.mines
                        );
                    }
                }
            }
            Err(err) => log::warn!("could not fetch the service difficulty table: {}", err),
        }
    });
}

impl Component for App {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        check_service_config();
        Self {
            player: LocalOrDefault::local_or_default(),
            theme: LocalOrDefault::local_or_default(),
            editing_name: false,
            games_won: 0,
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SubmitName(player) => {
                player.local_save();
                self.player = Some(player);
                self.editing_name = false;
                true
            }
            Msg::EditName => {
                self.editing_name = true;
                true
            }
            Msg::ToggleTheme => {
                let next = self.theme.unwrap_or_default().toggled();
                self.theme = Some(next);
                Theme::apply(Some(next));
                true
            }
            Msg::GameFinished(outcome) => {
                if outcome == GameOutcome::Won {
                    self.games_won += 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let prompt_open = self.editing_name || self.player.is_none();
        // while the prompt is up the session has no player and sits idle
        let active_player = (!prompt_open).then(|| self.player.clone()).flatten();

        let theme_label = match self.theme.unwrap_or_default() {
            Theme::Light => "🌙",
            Theme::Dark => "☀️",
        };

        let cb_edit_name = ctx.link().callback(|_| Msg::EditName);
        let cb_toggle_theme = ctx.link().callback(|_| Msg::ToggleTheme);

        html! {
            <>
                <header>
                    <h1>{"Minefront"}</h1>
                    <nav>
                        {
                            match &self.player {
                                Some(player) => html! { <span class="player">{player.name()}</span> },
                                None => html! {},
                            }
                        }
                        <button class="edit-name" onclick={cb_edit_name}>{"Change name"}</button>
                        <button class="theme-toggle" onclick={cb_toggle_theme}>{theme_label}</button>
                    </nav>
                </header>

                <main>
                    <section class="game">
                        <GameView
                            player={active_player}
                            on_finished={ctx.link().callback(Msg::GameFinished)}
                        />
                    </section>
                    <aside class="panels">
                        <LeaderboardView refresh={self.games_won}/>
                        <StatsView player={self.player.clone()} refresh={self.games_won}/>
                    </aside>
                </main>

                {
                    if prompt_open {
                        html! {
                            <Modal>
                                <NamePrompt
                                    current={self.player.clone()}
                                    on_submit={ctx.link().callback(Msg::SubmitName)}
                                />
                            </Modal>
                        }
                    } else {
                        html! {}
                    }
                }
            </>
        }
    }
}
