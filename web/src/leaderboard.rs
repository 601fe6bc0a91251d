use minefront_core::Result;
use minefront_protocol::{DifficultyLevel, LeaderboardEntry};
use yew::prelude::*;

use crate::api;
use crate::utils::{format_duration, format_played_at};

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct LeaderboardProps {
    /// Bumped by the parent after a won game; triggers a refetch
    #[prop_or_default]
    pub refresh: u32,
}

pub(crate) enum Msg {
    Select(DifficultyLevel),
    Loaded {
        difficulty: DifficultyLevel,
        result: Result<Vec<LeaderboardEntry>>,
    },
}

/// Per-difficulty top list, read straight from the service. Nothing here
/// is owned by the session; failures only affect this panel.
pub(crate) struct LeaderboardView {
    difficulty: DifficultyLevel,
    /// `None` while a fetch is outstanding
    entries: Option<Result<Vec<LeaderboardEntry>>>,
}

impl LeaderboardView {
    fn fetch(&mut self, ctx: &Context<Self>) {
        let difficulty = self.difficulty;
        self.entries = None;
        ctx.link().send_future(async move {
            Msg::Loaded {
                difficulty,
                result: api::leaderboard(difficulty).await,
            }
        });
    }
}

impl Component for LeaderboardView {
    type Message = Msg;
    type Properties = LeaderboardProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut view = Self {
            difficulty: DifficultyLevel::default(),
            entries: None,
        };
        view.fetch(ctx);
        view
    }

    fn changed(&mut self, ctx: &Context<Self>, _old_props: &Self::Properties) -> bool {
        self.fetch(ctx);
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Select(difficulty) => {
                if difficulty == self.difficulty {
                    return false;
                }
                self.difficulty = difficulty;
                self.fetch(ctx);
                true
            }
            Msg::Loaded { difficulty, result } => {
                // a response for a tab we already left
                if difficulty != self.difficulty {
                    return false;
                }
                self.entries = Some(result);
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let body = match &self.entries {
            None => html! { <p class="loading">{"Loading…"}</p> },
            Some(Err(err)) => html! { <p class="error">{err.to_string()}</p> },
            Some(Ok(entries)) if entries.is_empty() => {
                html! { <p class="empty">{"No records yet"}</p> }
            }
            Some(Ok(entries)) => html! {
                <table>
                    <thead>
                        <tr>
                            <th>{"#"}</th>
                            <th>{"Player"}</th>
                            <th>{"Time"}</th>
                            <th>{"Date"}</th>
                        </tr>
                    </thead>
                    <tbody>
                        {
                            for entries.iter().map(|entry| html! {
                                <tr>
                                    <td class={classes!("rank", format!("rank-{}", entry.rank))}>{entry.rank}</td>
                                    <td>{entry.user_name.clone()}</td>
                                    <td>{format_duration(entry.best_time)}</td>
                                    <td>{format_played_at(&entry.played_at)}</td>
                                </tr>
                            })
                        }
                    </tbody>
                </table>
            },
        };

        html! {
            <section class="leaderboard">
                <h2>{"Leaderboard"}</h2>
                <div class="difficulties">
                    {
                        for DifficultyLevel::ALL.into_iter().map(|difficulty| {
                            let class = classes!(
                                "difficulty",
                                (difficulty == self.difficulty).then_some("active"),
                            );
                            let onclick = ctx.link().callback(move |_| Msg::Select(difficulty));
                            html! {
                                <button {class} {onclick}>{difficulty.label()}</button>
                            }
                        })
                    }
                </div>
                { body }
            </section>
        }
    }
}
