use minefront_protocol::{
    BoardSnapshot, CompletionReport, Coord2, DifficultyLevel, GameId, GameMove, MoveAction,
    NewGameResponse,
};

use crate::{PlayerIdentity, Result, ServiceError};

/// Session generation counter. Every new/restarted session bumps it, and a
/// service response is only applied when it echoes the current value, so a
/// slow reply from an abandoned session can never overwrite a newer one.
pub type Epoch = u32;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    Won,
    Lost,
}

/// Valid transitions:
/// - AwaitingPlayer -> Starting (a player name becomes available)
/// - Starting -> Playing (create/restart succeeded)
/// - Playing -> Finished (a move response with a terminal board)
/// - Playing | Finished -> Starting (restart or difficulty change)
/// - any -> AwaitingPlayer (the player name is withdrawn for editing)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// No usable player name yet; no requests are issued
    AwaitingPlayer,
    /// A create/restart request is outstanding or has failed; no playable board
    Starting,
    /// A live board is on screen and accepting moves
    Playing,
    /// Terminal board received; only restart and difficulty change are accepted
    Finished(GameOutcome),
}

/// A request the shell must perform on behalf of the session. The three
/// session-scoped effects carry the epoch their response must echo back;
/// completion reporting is fire-and-forget and deliberately carries none.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    CreateGame {
        epoch: Epoch,
        difficulty: DifficultyLevel,
    },
    RestartGame {
        epoch: Epoch,
        game_id: GameId,
    },
    SubmitMove {
        epoch: Epoch,
        game_id: GameId,
        game_move: GameMove,
    },
    ReportCompletion {
        game_id: GameId,
        report: CompletionReport,
    },
}

/// One player's game against the remote service.
///
/// Owns the lifecycle phase, the last authoritative board, the wall-clock
/// seconds and the move count. Cell contents are never mutated locally;
/// every visible change arrives as a whole new [`BoardSnapshot`].
#[derive(Clone, Debug)]
pub struct GameSession {
    player: Option<PlayerIdentity>,
    difficulty: DifficultyLevel,
    phase: SessionPhase,
    epoch: Epoch,
    game_id: Option<GameId>,
    board: Option<BoardSnapshot>,
    elapsed_secs: u32,
    move_count: u32,
    in_flight: Option<GameMove>,
    report_sent: bool,
    last_error: Option<ServiceError>,
}

impl GameSession {
    pub fn new(difficulty: DifficultyLevel) -> Self {
        Self {
            player: None,
            difficulty,
            phase: SessionPhase::AwaitingPlayer,
            epoch: 0,
            game_id: None,
            board: None,
            elapsed_secs: 0,
            move_count: 0,
            in_flight: None,
            report_sent: false,
            last_error: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn difficulty(&self) -> DifficultyLevel {
        self.difficulty
    }

    pub fn player(&self) -> Option<&PlayerIdentity> {
        self.player.as_ref()
    }

    pub fn board(&self) -> Option<&BoardSnapshot> {
        self.board.as_ref()
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn last_error(&self) -> Option<ServiceError> {
        self.last_error
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.phase, SessionPhase::Playing)
    }

    /// Grid dimensions as (cols, rows), always from the difficulty table,
    /// never inferred from a board that may not have arrived yet.
    pub fn size(&self) -> (usize, usize) {
        let config = self.difficulty.config();
        (config.width as usize, config.height as usize)
    }

    /// Counter value for the mines display; the configured total until a
    /// board exists, then whatever the service last reported.
    pub fn mines_remaining(&self) -> i32 {
        self.board
            .as_ref()
            .map(|board| board.mines_remaining)
            .unwrap_or(self.difficulty.config().mines as i32)
    }

    /// Supplies or withdraws the player name. A fresh name always starts a
    /// fresh session so later completion reports carry it; withdrawing the
    /// name (to edit it) discards the session entirely.
    pub fn set_player(&mut self, player: Option<PlayerIdentity>) -> Option<Effect> {
        match player {
            Some(player) => {
                self.player = Some(player);
                Some(self.begin_new_game())
            }
            None => {
                self.player = None;
                self.discard_session();
                self.phase = SessionPhase::AwaitingPlayer;
                None
            }
        }
    }

    /// Switches difficulty, discarding any current session. Before a player
    /// exists this only records the choice.
    pub fn select_difficulty(&mut self, difficulty: DifficultyLevel) -> Option<Effect> {
        self.difficulty = difficulty;
        match self.phase {
            SessionPhase::AwaitingPlayer => None,
            _ => Some(self.begin_new_game()),
        }
    }

    /// Restart intent. While `Starting` this re-issues the create request
    /// (the retry path after a failed start); with a known game id it asks
    /// the service to reset that game instead.
    pub fn restart(&mut self) -> Option<Effect> {
        match self.phase {
            SessionPhase::AwaitingPlayer => None,
            SessionPhase::Starting => Some(self.begin_new_game()),
            SessionPhase::Playing | SessionPhase::Finished(_) => match self.game_id {
                Some(game_id) => {
                    self.discard_session();
                    self.phase = SessionPhase::Starting;
                    Some(Effect::RestartGame {
                        epoch: self.epoch,
                        game_id,
                    })
                }
                None => Some(self.begin_new_game()),
            },
        }
    }

    pub fn reveal(&mut self, pos: Coord2) -> Option<Effect> {
        self.submit_move(pos, MoveAction::Reveal)
    }

    pub fn flag(&mut self, pos: Coord2) -> Option<Effect> {
        self.submit_move(pos, MoveAction::Flag)
    }

    /// Gate and dispatch a move intent. At most one move may be in flight
    /// per session; a second intent arriving before the first resolves is
    /// dropped, because the server applies moves in receipt order and two
    /// overlapping responses cannot be reconciled.
    fn submit_move(&mut self, (row, col): Coord2, action: MoveAction) -> Option<Effect> {
        if !self.is_playing() {
            return None;
        }
        if self.in_flight.is_some() {
            log::debug!("move at ({}, {}) dropped, another is in flight", row, col);
            return None;
        }

        let game_id = self.game_id?;
        let board = self.board.as_ref()?;
        if board.is_finished() {
            return None;
        }

        let cell = board.cell_at((row, col))?;
        let accepted = match action {
            // the service ignores reveals on revealed or flagged cells, so
            // don't spend a request (or a move-count bump) on them
            MoveAction::Reveal => !cell.is_revealed && !cell.is_flagged,
            MoveAction::Flag => !cell.is_revealed,
        };
        if !accepted {
            return None;
        }

        let game_move = GameMove { row, col, action };
        self.in_flight = Some(game_move);
        Some(Effect::SubmitMove {
            epoch: self.epoch,
            game_id,
            game_move,
        })
    }

    /// Applies a create/restart response. Returns whether anything visible
    /// changed.
    pub fn on_game_created(&mut self, epoch: Epoch, result: Result<NewGameResponse>) -> bool {
        if epoch != self.epoch {
            log::debug!("discarding create response for superseded session");
            return false;
        }
        if !matches!(self.phase, SessionPhase::Starting) {
            return false;
        }

        match result {
            Ok(NewGameResponse { game_id, state }) => {
                if !state.matches_config(&self.difficulty.config()) {
                    log::error!(
                        "service returned a board that does not match the {} layout",
                        self.difficulty
                    );
                    self.last_error = Some(ServiceError::InvalidResponseShape);
                    return true;
                }

                log::debug!("game {} started at {}", game_id, self.difficulty);
                self.game_id = Some(game_id);
                self.board = Some(state);
                self.elapsed_secs = 0;
                self.move_count = 0;
                self.report_sent = false;
                self.last_error = None;
                self.phase = SessionPhase::Playing;
                true
            }
            Err(err) => {
                log::warn!("could not start game: {}", err);
                self.last_error = Some(err);
                true
            }
        }
    }

    /// Applies a move response: the board is replaced wholesale, a reveal
    /// bumps the move counter, and a terminal board finishes the session.
    /// The returned effect, if any, is the one-time completion report.
    pub fn on_move_resolved(
        &mut self,
        epoch: Epoch,
        result: Result<BoardSnapshot>,
    ) -> Option<Effect> {
        if epoch != self.epoch {
            log::debug!("discarding move response for superseded session");
            return None;
        }
        let sent = self.in_flight.take()?;

        match result {
            Ok(state) => {
                if !state.matches_config(&self.difficulty.config()) {
                    log::error!("move response board has the wrong dimensions");
                    self.last_error = Some(ServiceError::InvalidResponseShape);
                    return None;
                }

                if sent.action == MoveAction::Reveal {
                    self.move_count = self.move_count.saturating_add(1);
                }

                let finished = state.is_finished();
                let won = state.won;
                self.board = Some(state);
                self.last_error = None;

                if !finished {
                    return None;
                }

                self.phase = SessionPhase::Finished(if won {
                    GameOutcome::Won
                } else {
                    GameOutcome::Lost
                });

                // losses are never reported; wins exactly once per session
                if !won || self.report_sent {
                    return None;
                }
                self.report_sent = true;

                let player = self.player.as_ref()?;
                Some(Effect::ReportCompletion {
                    game_id: self.game_id?,
                    report: CompletionReport {
                        user_name: player.name().to_owned(),
                        duration: self.elapsed_secs,
                        moves: self.move_count,
                    },
                })
            }
            Err(err) => {
                log::warn!("move at ({}, {}) failed: {}", sent.row, sent.col, err);
                self.last_error = Some(err);
                None
            }
        }
    }

    /// One-second timer tick. Only counts while `Playing`; returns whether
    /// the displayed time changed.
    pub fn tick(&mut self) -> bool {
        if self.is_playing() {
            self.elapsed_secs = self.elapsed_secs.saturating_add(1);
            true
        } else {
            false
        }
    }

    fn begin_new_game(&mut self) -> Effect {
        self.discard_session();
        self.phase = SessionPhase::Starting;
        Effect::CreateGame {
            epoch: self.epoch,
            difficulty: self.difficulty,
        }
    }

    /// Invalidates any outstanding response and clears per-session state.
    fn discard_session(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.game_id = None;
        self.board = None;
        self.elapsed_secs = 0;
        self.move_count = 0;
        self.in_flight = None;
        self.report_sent = false;
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minefront_protocol::CellState;

    fn blank_board(difficulty: DifficultyLevel) -> BoardSnapshot {
        let config = difficulty.config();
        BoardSnapshot {
            board: vec![
                vec![CellState::default(); config.width as usize];
                config.height as usize
            ],
            game_over: false,
            won: false,
            mines_remaining: config.mines as i32,
        }
    }

    fn won_board(difficulty: DifficultyLevel) -> BoardSnapshot {
        let mut board = blank_board(difficulty);
        board.game_over = true;
        board.won = true;
        board
    }

    fn lost_board(difficulty: DifficultyLevel) -> BoardSnapshot {
        let mut board = blank_board(difficulty);
        board.game_over = true;
        board
    }

    fn revealed_at(difficulty: DifficultyLevel, pos: Coord2) -> BoardSnapshot {
        let mut board = blank_board(difficulty);
        board.board[pos.0 as usize][pos.1 as usize].is_revealed = true;
        board
    }

    fn response(game_id: GameId, difficulty: DifficultyLevel) -> NewGameResponse {
        NewGameResponse {
            game_id,
            state: blank_board(difficulty),
        }
    }

    /// Session with a player, one created beginner game, id 7.
    fn playing_session() -> GameSession {
        let mut session = GameSession::new(DifficultyLevel::Beginner);
        let effect = session.set_player(PlayerIdentity::parse("ada")).unwrap();
        let Effect::CreateGame { epoch, difficulty } = effect else {
            panic!("expected a create effect");
        };
        assert!(session.on_game_created(epoch, Ok(response(7, difficulty))));
        assert_eq!(session.phase(), SessionPhase::Playing);
        session
    }

    fn submit_reveal(session: &mut GameSession, pos: Coord2) -> Epoch {
        match session.reveal(pos) {
            Some(Effect::SubmitMove { epoch, .. }) => epoch,
            other => panic!("expected a move effect, got {:?}", other),
        }
    }

    #[test]
    fn no_requests_before_a_player_exists() {
        let mut session = GameSession::new(DifficultyLevel::Beginner);
        assert_eq!(session.phase(), SessionPhase::AwaitingPlayer);
        assert_eq!(session.reveal((0, 0)), None);
        assert_eq!(session.restart(), None);
        assert!(!session.tick());

        // picking a difficulty early only records the choice
        assert_eq!(session.select_difficulty(DifficultyLevel::Expert), None);
        assert_eq!(session.difficulty(), DifficultyLevel::Expert);
    }

    #[test]
    fn supplying_a_player_requests_a_game() {
        let mut session = GameSession::new(DifficultyLevel::Beginner);
        let effect = session.set_player(PlayerIdentity::parse("ada"));
        assert!(matches!(
            effect,
            Some(Effect::CreateGame {
                difficulty: DifficultyLevel::Beginner,
                ..
            })
        ));
        assert_eq!(session.phase(), SessionPhase::Starting);
    }

    #[test]
    fn successful_create_enters_playing_with_reset_counters() {
        let session = playing_session();
        assert_eq!(session.elapsed_secs(), 0);
        assert_eq!(session.move_count(), 0);
        assert_eq!(session.last_error(), None);
        assert_eq!(session.board().unwrap().mines_remaining, 10);
    }

    #[test]
    fn board_not_matching_difficulty_layout_is_rejected() {
        let mut session = GameSession::new(DifficultyLevel::Expert);
        let effect = session.set_player(PlayerIdentity::parse("ada")).unwrap();
        let Effect::CreateGame { epoch, .. } = effect else {
            panic!("expected a create effect");
        };

        // a beginner-sized board for an expert session
        let wrong = NewGameResponse {
            game_id: 3,
            state: blank_board(DifficultyLevel::Beginner),
        };
        assert!(session.on_game_created(epoch, Ok(wrong)));
        assert_eq!(session.phase(), SessionPhase::Starting);
        assert_eq!(
            session.last_error(),
            Some(ServiceError::InvalidResponseShape)
        );
        assert!(session.board().is_none());
    }

    #[test]
    fn failed_create_stays_starting_and_restart_reissues_the_request() {
        let mut session = GameSession::new(DifficultyLevel::Beginner);
        let effect = session.set_player(PlayerIdentity::parse("ada")).unwrap();
        let Effect::CreateGame { epoch, .. } = effect else {
            panic!("expected a create effect");
        };

        assert!(session.on_game_created(epoch, Err(ServiceError::ServiceUnavailable)));
        assert_eq!(session.phase(), SessionPhase::Starting);
        assert_eq!(
            session.last_error(),
            Some(ServiceError::ServiceUnavailable)
        );
        assert!(session.board().is_none());
        assert!(!session.tick());

        // the retry is a plain re-dispatch of the same request
        assert!(matches!(
            session.restart(),
            Some(Effect::CreateGame {
                difficulty: DifficultyLevel::Beginner,
                ..
            })
        ));
    }

    #[test]
    fn at_most_one_move_in_flight() {
        let mut session = playing_session();
        let epoch = submit_reveal(&mut session, (0, 0));

        // a second intent before the first resolves is dropped
        assert_eq!(session.reveal((1, 1)), None);
        assert_eq!(session.flag((2, 2)), None);

        // once resolved, moves flow again
        session.on_move_resolved(epoch, Ok(revealed_at(DifficultyLevel::Beginner, (0, 0))));
        assert!(session.reveal((1, 1)).is_some());
    }

    #[test]
    fn reveal_counts_moves_and_flag_does_not() {
        let mut session = playing_session();

        let epoch = submit_reveal(&mut session, (0, 0));
        session.on_move_resolved(epoch, Ok(revealed_at(DifficultyLevel::Beginner, (0, 0))));
        assert_eq!(session.move_count(), 1);

        let Some(Effect::SubmitMove { epoch, game_move, .. }) = session.flag((3, 3)) else {
            panic!("expected a flag effect");
        };
        assert_eq!(game_move.action, MoveAction::Flag);
        let mut flagged = revealed_at(DifficultyLevel::Beginner, (0, 0));
        flagged.board[3][3].is_flagged = true;
        flagged.mines_remaining = 9;
        session.on_move_resolved(epoch, Ok(flagged));
        assert_eq!(session.move_count(), 1);
        assert_eq!(session.mines_remaining(), 9);
    }

    #[test]
    fn revealing_an_already_revealed_cell_is_a_local_noop() {
        let mut session = playing_session();
        let epoch = submit_reveal(&mut session, (0, 0));
        session.on_move_resolved(epoch, Ok(revealed_at(DifficultyLevel::Beginner, (0, 0))));
        assert_eq!(session.move_count(), 1);

        // the literal second call: no request, no double count
        assert_eq!(session.reveal((0, 0)), None);
        assert_eq!(session.move_count(), 1);
    }

    #[test]
    fn flagged_cells_cannot_be_revealed_and_revealed_cells_cannot_be_flagged() {
        let mut session = playing_session();

        let Some(Effect::SubmitMove { epoch, .. }) = session.flag((0, 0)) else {
            panic!("expected a flag effect");
        };
        let mut board = blank_board(DifficultyLevel::Beginner);
        board.board[0][0].is_flagged = true;
        board.board[5][5].is_revealed = true;
        board.mines_remaining = 9;
        session.on_move_resolved(epoch, Ok(board));

        assert_eq!(session.reveal((0, 0)), None);
        assert_eq!(session.flag((5, 5)), None);
    }

    #[test]
    fn out_of_range_positions_never_reach_the_service() {
        let mut session = playing_session();
        assert_eq!(session.reveal((9, 0)), None);
        assert_eq!(session.reveal((0, 9)), None);
        assert_eq!(session.flag((200, 200)), None);
    }

    #[test]
    fn winning_move_finishes_stops_the_clock_and_reports_once() {
        let mut session = playing_session();
        session.tick();
        session.tick();
        session.tick();
        assert_eq!(session.elapsed_secs(), 3);

        let epoch = submit_reveal(&mut session, (0, 0));
        let effect = session.on_move_resolved(epoch, Ok(won_board(DifficultyLevel::Beginner)));

        assert_eq!(session.phase(), SessionPhase::Finished(GameOutcome::Won));
        let Some(Effect::ReportCompletion { game_id, report }) = effect else {
            panic!("expected a completion report");
        };
        assert_eq!(game_id, 7);
        assert_eq!(report.user_name, "ada");
        assert_eq!(report.duration, 3);
        assert_eq!(report.moves, 1);

        // the clock is stopped and the board accepts nothing further
        assert!(!session.tick());
        assert_eq!(session.elapsed_secs(), 3);
        assert_eq!(session.reveal((1, 1)), None);
    }

    #[test]
    fn losing_move_finishes_without_a_report() {
        let mut session = playing_session();
        let epoch = submit_reveal(&mut session, (4, 4));
        let effect = session.on_move_resolved(epoch, Ok(lost_board(DifficultyLevel::Beginner)));

        assert_eq!(session.phase(), SessionPhase::Finished(GameOutcome::Lost));
        assert_eq!(effect, None);
        assert!(!session.tick());
    }

    #[test]
    fn failed_move_keeps_the_previous_board() {
        let mut session = playing_session();
        let before = session.board().unwrap().clone();

        let epoch = submit_reveal(&mut session, (0, 0));
        let effect = session.on_move_resolved(epoch, Err(ServiceError::SessionNotFound));

        assert_eq!(effect, None);
        assert_eq!(session.phase(), SessionPhase::Playing);
        assert_eq!(session.last_error(), Some(ServiceError::SessionNotFound));
        assert_eq!(session.board().unwrap(), &before);
        assert_eq!(session.move_count(), 0);

        // the slot is free again for a user-initiated retry
        assert!(session.reveal((0, 0)).is_some());
    }

    #[test]
    fn response_for_a_superseded_session_is_discarded() {
        let mut session = playing_session();
        let stale_epoch = submit_reveal(&mut session, (0, 0));

        // the player restarts before the move resolves
        let restart = session.restart();
        assert!(matches!(
            restart,
            Some(Effect::RestartGame { game_id: 7, .. })
        ));
        assert_eq!(session.phase(), SessionPhase::Starting);

        // the stale response must not resurrect the old board
        let effect =
            session.on_move_resolved(stale_epoch, Ok(won_board(DifficultyLevel::Beginner)));
        assert_eq!(effect, None);
        assert_eq!(session.phase(), SessionPhase::Starting);
        assert!(session.board().is_none());
        assert_eq!(session.move_count(), 0);
    }

    #[test]
    fn stale_create_after_difficulty_change_is_discarded() {
        let mut session = GameSession::new(DifficultyLevel::Beginner);
        let effect = session.set_player(PlayerIdentity::parse("ada")).unwrap();
        let Effect::CreateGame { epoch: stale, .. } = effect else {
            panic!("expected a create effect");
        };

        let effect = session.select_difficulty(DifficultyLevel::Expert);
        assert!(matches!(
            effect,
            Some(Effect::CreateGame {
                difficulty: DifficultyLevel::Expert,
                ..
            })
        ));

        // the beginner board from the abandoned request arrives late
        assert!(!session.on_game_created(stale, Ok(response(1, DifficultyLevel::Beginner))));
        assert_eq!(session.phase(), SessionPhase::Starting);
        assert!(session.board().is_none());
    }

    #[test]
    fn restart_after_finish_reuses_the_game_id() {
        let mut session = playing_session();
        let epoch = submit_reveal(&mut session, (0, 0));
        session.on_move_resolved(epoch, Ok(won_board(DifficultyLevel::Beginner)));

        let Some(Effect::RestartGame { epoch, game_id }) = session.restart() else {
            panic!("expected a restart effect");
        };
        assert_eq!(game_id, 7);

        // the fresh session counts from zero and may report again
        assert!(session.on_game_created(epoch, Ok(response(7, DifficultyLevel::Beginner))));
        assert_eq!(session.move_count(), 0);
        assert_eq!(session.elapsed_secs(), 0);
        let epoch = submit_reveal(&mut session, (0, 0));
        let effect = session.on_move_resolved(epoch, Ok(won_board(DifficultyLevel::Beginner)));
        assert!(matches!(effect, Some(Effect::ReportCompletion { .. })));
    }

    #[test]
    fn ticks_advance_only_while_playing() {
        let mut session = GameSession::new(DifficultyLevel::Beginner);
        assert!(!session.tick());

        session.set_player(PlayerIdentity::parse("ada"));
        assert!(!session.tick()); // Starting

        let mut session = playing_session();
        assert!(session.tick());
        assert_eq!(session.elapsed_secs(), 1);
    }

    #[test]
    fn withdrawing_the_player_discards_the_session() {
        let mut session = playing_session();
        session.tick();

        assert_eq!(session.set_player(None), None);
        assert_eq!(session.phase(), SessionPhase::AwaitingPlayer);
        assert!(session.board().is_none());
        assert_eq!(session.elapsed_secs(), 0);
        assert!(!session.tick());

        // resubmitting a name starts over
        let effect = session.set_player(PlayerIdentity::parse("grace"));
        assert!(matches!(effect, Some(Effect::CreateGame { .. })));
    }

    #[test]
    fn size_comes_from_the_difficulty_table_not_the_board() {
        let mut session = GameSession::new(DifficultyLevel::Expert);
        // no board yet, dimensions are already known
        assert_eq!(session.size(), (30, 16));
        assert_eq!(session.mines_remaining(), 99);

        session.set_player(PlayerIdentity::parse("ada"));
        assert_eq!(session.size(), (30, 16));
    }
}
