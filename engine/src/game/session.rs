use super::board::{BOARD_SIZE, Board, CELL_COUNT};
use super::search::MinimaxEngine;
use super::types::{Cell, Mark};
use crate::error::{GameError, Result};
use crate::identifiers::ParticipantId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who occupies a seat: a human identified by id, or the built-in engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Participant {
    Human(ParticipantId),
    Engine,
}

impl Participant {
    pub fn is_engine(&self) -> bool {
        matches!(self, Participant::Engine)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    AwaitingMove(Mark),
    AwaitingEngineMove,
    Won(Mark),
    Draw,
}

impl SessionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Won(_) | SessionPhase::Draw)
    }
}

/// Read-only snapshot handed to rendering layers after every accepted move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub cells: [Cell; CELL_COUNT],
    pub phase: SessionPhase,
    pub last_move: Option<(usize, usize)>,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                if col > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", self.cells[row * BOARD_SIZE + col])?;
            }
            writeln!(f)?;
        }
        match self.phase {
            SessionPhase::AwaitingMove(mark) => write!(f, "{} to move", mark),
            SessionPhase::AwaitingEngineMove => write!(f, "engine to move"),
            SessionPhase::Won(mark) => write!(f, "{} wins", mark),
            SessionPhase::Draw => write!(f, "draw"),
        }
    }
}

/// One game bound to two seats. X always moves first; a rejected input
/// leaves the board and the phase untouched.
#[derive(Debug)]
pub struct GameSession {
    board: Board,
    player_x: Participant,
    player_o: Participant,
    phase: SessionPhase,
}

impl GameSession {
    pub fn new(player_x: Participant, player_o: Participant) -> Result<Self> {
        if let (Participant::Human(a), Participant::Human(b)) = (&player_x, &player_o)
            && a == b
        {
            return Err(GameError::InvalidSetup {
                message: format!("both seats are taken by participant {}", a),
            });
        }

        let phase = if player_x.is_engine() {
            SessionPhase::AwaitingEngineMove
        } else {
            SessionPhase::AwaitingMove(Mark::X)
        };

        Ok(Self {
            board: Board::new(),
            player_x,
            player_o,
            phase,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn current_state(&self) -> SessionState {
        SessionState {
            cells: self.board.cells(),
            phase: self.phase,
            last_move: self.board.last_move(),
        }
    }

    /// Applies a human move given as a cell index in 0..8 (row major).
    pub fn accept_move(
        &mut self,
        participant: &ParticipantId,
        cell_index: usize,
    ) -> Result<SessionState> {
        let mark = match self.phase {
            SessionPhase::Won(_) | SessionPhase::Draw => return Err(GameError::GameOver),
            SessionPhase::AwaitingEngineMove => return Err(GameError::NotYourTurn),
            SessionPhase::AwaitingMove(mark) => mark,
        };

        match self.participant(mark) {
            Participant::Human(id) if id == participant => {}
            _ => return Err(GameError::NotYourTurn),
        }

        let row = cell_index / BOARD_SIZE;
        let col = cell_index % BOARD_SIZE;
        self.board.apply_move(row, col, mark)?;
        self.advance_phase(mark);
        Ok(self.current_state())
    }

    /// Board clone and mark for an engine turn, None when the engine is not
    /// to move. The clone lets the search run without holding the session.
    pub fn pending_engine_turn(&self) -> Option<(Board, Mark)> {
        match self.phase {
            SessionPhase::AwaitingEngineMove => Some((self.board.clone(), self.current_mark())),
            _ => None,
        }
    }

    /// Applies a move computed for the engine seat. The phase is checked
    /// again here since the search runs outside the session lock.
    pub fn apply_engine_move(&mut self, row: usize, col: usize) -> Result<SessionState> {
        match self.phase {
            SessionPhase::Won(_) | SessionPhase::Draw => return Err(GameError::GameOver),
            SessionPhase::AwaitingMove(_) => return Err(GameError::NotYourTurn),
            SessionPhase::AwaitingEngineMove => {}
        }

        let mark = self.current_mark();
        self.board.apply_move(row, col, mark)?;
        self.advance_phase(mark);
        Ok(self.current_state())
    }

    /// Runs the search and applies its move in one synchronous step.
    pub fn engine_moves(&mut self) -> Result<SessionState> {
        match self.phase {
            SessionPhase::Won(_) | SessionPhase::Draw => return Err(GameError::GameOver),
            SessionPhase::AwaitingMove(_) => return Err(GameError::NotYourTurn),
            SessionPhase::AwaitingEngineMove => {}
        }

        let mark = self.current_mark();
        let (row, col) = MinimaxEngine::new(mark).select_move(&self.board)?;
        self.apply_engine_move(row, col)
    }

    fn participant(&self, mark: Mark) -> &Participant {
        match mark {
            Mark::X => &self.player_x,
            Mark::O => &self.player_o,
        }
    }

    // X moves on even move counts since X always starts.
    fn current_mark(&self) -> Mark {
        if self.board.moves().len() % 2 == 0 {
            Mark::X
        } else {
            Mark::O
        }
    }

    fn advance_phase(&mut self, mark: Mark) {
        if let Some(winner) = self.board.winner() {
            self.phase = SessionPhase::Won(winner);
            return;
        }
        if self.board.is_full() {
            self.phase = SessionPhase::Draw;
            return;
        }

        let next = mark.opponent();
        self.phase = if self.participant(next).is_engine() {
            SessionPhase::AwaitingEngineMove
        } else {
            SessionPhase::AwaitingMove(next)
        };
    }
}
