//! The game view: one [`GameSession`] driven by pointer intents, service
//! responses and the one-second timer.

use gloo::timers::callback::Interval;
use minefront_core::{
    Effect, Epoch, GameOutcome, GameSession, PlayerIdentity, Result, SessionPhase,
};
use minefront_protocol::{
    BoardSnapshot, CellState, Coord, Coord2, DifficultyLevel, NewGameResponse,
};
use yew::prelude::*;

use crate::api;
use crate::utils::format_for_counter;

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum CellIntent {
    Reveal(Coord2),
    Flag(Coord2),
}

pub(crate) enum Msg {
    Cell(CellIntent),
    Tick,
    Restart,
    SelectDifficulty(DifficultyLevel),
    GameCreated {
        epoch: Epoch,
        result: Result<NewGameResponse>,
    },
    MoveResolved {
        epoch: Epoch,
        result: Result<BoardSnapshot>,
    },
}

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct GameProps {
    /// The active player; `None` while the name prompt is up
    #[prop_or_default]
    pub player: Option<PlayerIdentity>,
    #[prop_or_default]
    pub on_finished: Callback<GameOutcome>,
}

#[derive(Properties, Clone, PartialEq)]
struct CellProps {
    row: Coord,
    col: Coord,
    cell: CellState,
    /// Terminal board: misflags become visible
    #[prop_or_default]
    finished: bool,
    callback: Callback<CellIntent>,
}

#[function_component(CellView)]
fn cell_component(props: &CellProps) -> Html {
    let CellProps {
        row,
        col,
        cell,
        finished,
        callback,
    } = props.clone();

    let class = classes!(
        "cell",
        if cell.is_flagged {
            classes!("flag", (finished && !cell.is_mine).then_some("wrong"))
        } else if !cell.is_revealed {
            classes!()
        } else if cell.is_mine {
            classes!("open", "mine")
        } else {
            classes!("open", format!("num-{}", cell.adjacent_mines))
        }
    );

    let content = if cell.is_flagged {
        "🚩".to_string()
    } else if cell.is_revealed && cell.is_mine {
        "💣".to_string()
    } else if cell.is_revealed && cell.adjacent_mines > 0 {
        cell.adjacent_mines.to_string()
    } else {
        String::new()
    };

    let onclick = {
        let callback = callback.clone();
        Callback::from(move |_| {
            log::trace!("({}, {}) primary click", row, col);
            callback.emit(CellIntent::Reveal((row, col)));
        })
    };

    let oncontextmenu = Callback::from(move |e: MouseEvent| {
        e.prevent_default();
        log::trace!("({}, {}) secondary click", row, col);
        callback.emit(CellIntent::Flag((row, col)));
    });

    html! {
        <td {class} {onclick} {oncontextmenu}>{content}</td>
    }
}

pub(crate) struct GameView {
    session: GameSession,
    /// Present exactly while the session is `Playing`; dropping it cancels
    /// the tick, so no orphaned timer can touch a discarded session
    timer: Option<Interval>,
}

impl GameView {
    fn run_effect(&mut self, ctx: &Context<Self>, effect: Option<Effect>) {
        let Some(effect) = effect else {
            return;
        };
        match effect {
            Effect::CreateGame { epoch, difficulty } => {
                ctx.link().send_future(async move {
                    Msg::GameCreated {
                        epoch,
                        result: api::create_game(difficulty).await,
                    }
                });
            }
            Effect::RestartGame { epoch, game_id } => {
                ctx.link().send_future(async move {
                    Msg::GameCreated {
                        epoch,
                        result: api::restart_game(game_id).await,
                    }
                });
            }
            Effect::SubmitMove {
                epoch,
                game_id,
                game_move,
            } => {
                ctx.link().send_future(async move {
                    Msg::MoveResolved {
                        epoch,
                        result: api::submit_move(game_id, game_move).await,
                    }
                });
            }
            Effect::ReportCompletion { game_id, report } => {
                // detached on purpose: the displayed win never waits on, or
                // gets reverted by, the report
                wasm_bindgen_futures::spawn_local(async move {
                    match api::complete_game(game_id, &report).await {
                        Ok(()) => log::info!("completion recorded for game {}", game_id),
                        Err(err) => log::warn!("could not record completion: {}", err),
                    }
                });
            }
        }
    }

    fn sync_timer(&mut self, ctx: &Context<Self>) {
        if self.session.is_playing() {
            if self.timer.is_none() {
                let link = ctx.link().clone();
                self.timer = Some(Interval::new(1_000, move || link.send_message(Msg::Tick)));
            }
        } else if self.timer.take().is_some() {
            log::trace!("timer stopped");
        }
    }

    fn state_class(&self) -> Classes {
        use SessionPhase::*;
        classes!(
            "state",
            match self.session.phase() {
                AwaitingPlayer => "awaiting-player",
                Starting => "starting",
                Playing => "in-progress",
                Finished(GameOutcome::Won) => "won",
                Finished(GameOutcome::Lost) => "lost",
            }
        )
    }

    fn status_line(&self) -> Html {
        use SessionPhase::*;
        match self.session.phase() {
            Finished(GameOutcome::Won) => html! { <p class="message won">{"You won!"}</p> },
            Finished(GameOutcome::Lost) => html! { <p class="message lost">{"Game over"}</p> },
            Starting if self.session.last_error().is_none() => {
                html! { <p class="message starting">{"Starting…"}</p> }
            }
            _ => html! {},
        }
    }

    fn error_line(&self) -> Html {
        match self.session.last_error() {
            Some(err) => html! { <p class="error">{format!("{} — try again", err)}</p> },
            None => html! {},
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut view = Self {
            session: GameSession::new(DifficultyLevel::default()),
            timer: None,
        };
        let player = ctx.props().player.clone();
        if player.is_some() {
            let effect = view.session.set_player(player);
            view.run_effect(ctx, effect);
        }
        view
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        if ctx.props().player != old_props.player {
            let effect = self.session.set_player(ctx.props().player.clone());
            self.run_effect(ctx, effect);
            self.sync_timer(ctx);
        }
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let redraw = match msg {
            Msg::Cell(intent) => {
                if self.session.is_playing() {
                    let effect = match intent {
                        CellIntent::Reveal(pos) => self.session.reveal(pos),
                        CellIntent::Flag(pos) => self.session.flag(pos),
                    };
                    let dispatched = effect.is_some();
                    self.run_effect(ctx, effect);
                    dispatched
                } else {
                    // the board ignores input outside of play
                    false
                }
            }
            Msg::Tick => self.session.tick(),
            Msg::Restart => {
                let effect = self.session.restart();
                let dispatched = effect.is_some();
                self.run_effect(ctx, effect);
                dispatched
            }
            Msg::SelectDifficulty(difficulty) => {
                let effect = self.session.select_difficulty(difficulty);
                self.run_effect(ctx, effect);
                true
            }
            Msg::GameCreated { epoch, result } => self.session.on_game_created(epoch, result),
            Msg::MoveResolved { epoch, result } => {
                let was_finished = matches!(self.session.phase(), SessionPhase::Finished(_));
                let effect = self.session.on_move_resolved(epoch, result);
                self.run_effect(ctx, effect);
                if let SessionPhase::Finished(outcome) = self.session.phase() {
                    if !was_finished {
                        ctx.props().on_finished.emit(outcome);
                    }
                }
                true
            }
        };
        self.sync_timer(ctx);
        redraw
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let (cols, rows) = self.session.size();
        let is_playable = self.session.is_playing();
        let current = self.session.difficulty();
        let finished = matches!(self.session.phase(), SessionPhase::Finished(_));
        let mines_left = format_for_counter(self.session.mines_remaining());
        let elapsed_time = format_for_counter(self.session.elapsed_secs() as i32);

        let cb_restart = ctx.link().callback(|e: MouseEvent| {
            e.stop_propagation();
            Msg::Restart
        });

        html! {
            <div class="minefront" oncontextmenu={Callback::from(move |e: MouseEvent| e.prevent_default())}>
                <div class="difficulties">
                    {
                        for DifficultyLevel::ALL.into_iter().map(|difficulty| {
                            let class = classes!(
                                "difficulty",
                                (difficulty == current).then_some("active"),
                            );
                            let onclick = ctx
                                .link()
                                .callback(move |_| Msg::SelectDifficulty(difficulty));
                            html! {
                                <button {class} {onclick}>{difficulty.label()}</button>
                            }
                        })
                    }
                </div>
                <nav>
                    <aside>{mines_left}</aside>
                    <span><button class={self.state_class()} onclick={cb_restart}/></span>
                    <aside>{elapsed_time}</aside>
                </nav>
                { self.error_line() }
                <table class={is_playable.then_some("playable")}>
                    {
                        for (0..rows).map(|row| html! {
                            <tr>
                                {
                                    for (0..cols).map(|col| {
                                        let pos = (row as Coord, col as Coord);
                                        let cell = self
                                            .session
                                            .board()
                                            .and_then(|board| board.cell_at(pos).copied())
                                            .unwrap_or_default();
                                        let callback = ctx.link().callback(Msg::Cell);
                                        html! {
                                            <CellView row={pos.0} col={pos.1} {cell} {finished} {callback}/>
                                        }
                                    })
                                }
                            </tr>
                        })
                    }
                </table>
                { self.status_line() }
            </div>
        }
    }
}
