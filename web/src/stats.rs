use minefront_core::{PlayerIdentity, Result};
use minefront_protocol::{DifficultyLevel, DifficultyStats, UserStats};
use yew::prelude::*;

use crate::api;
use crate::utils::format_duration;

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct StatsProps {
    #[prop_or_default]
    pub player: Option<PlayerIdentity>,
    /// Bumped by the parent after a won game; triggers a refetch
    #[prop_or_default]
    pub refresh: u32,
}

pub(crate) enum Msg {
    Loaded {
        user_name: String,
        result: Result<UserStats>,
    },
}

/// Per-difficulty record cards for the current player.
pub(crate) struct StatsView {
    stats: Option<Result<UserStats>>,
}

fn win_rate(stats: &DifficultyStats) -> String {
    if stats.games == 0 {
        return "0%".to_string();
    }
    format!("{:.1}%", (stats.wins as f64 / stats.games as f64) * 100.0)
}

impl StatsView {
    fn fetch(&mut self, ctx: &Context<Self>) {
        let Some(player) = ctx.props().player.clone() else {
            self.stats = None;
            return;
        };
        self.stats = None;
        ctx.link().send_future(async move {
            let user_name = player.name().to_owned();
            let result = api::user_stats(&user_name).await;
            Msg::Loaded { user_name, result }
        });
    }
}

impl Component for StatsView {
    type Message = Msg;
    type Properties = StatsProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut view = Self { stats: None };
        view.fetch(ctx);
        view
    }

    fn changed(&mut self, ctx: &Context<Self>, _old_props: &Self::Properties) -> bool {
        self.fetch(ctx);
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Loaded { user_name, result } => {
                // the player may have changed names while the fetch ran
                let current = ctx.props().player.as_ref().map(PlayerIdentity::name);
                if current != Some(user_name.as_str()) {
                    return false;
                }
                self.stats = Some(result);
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let Some(player) = &ctx.props().player else {
            return html! {};
        };

        let body = match &self.stats {
            None => html! { <p class="loading">{"Loading…"}</p> },
            Some(Err(err)) => html! { <p class="error">{err.to_string()}</p> },
            Some(Ok(stats)) => html! {
                <div class="cards">
                    {
                        for DifficultyLevel::ALL.into_iter().map(|difficulty| {
                            let record = stats.stats.for_difficulty(difficulty);
                            let best = record
                                .best_time
                                .map_or_else(|| "—".to_string(), format_duration);
                            html! {
                                <article class="card">
                                    <h3>{difficulty.label()}</h3>
                                    <p><span>{"Games"}</span><span>{record.games}</span></p>
                                    <p><span>{"Wins"}</span><span>{record.wins}</span></p>
                                    <p><span>{"Win rate"}</span><span>{win_rate(record)}</span></p>
                                    <p><span>{"Best time"}</span><span>{best}</span></p>
                                </article>
                            }
                        })
                    }
                </div>
            },
        };

        html! {
            <section class="stats">
                <h2>{format!("{}'s record", player.name())}</h2>
                { body }
            </section>
        }
    }
}
