use super::board::Board;
use super::types::Mark;
use crate::error::{GameError, Result};

/// Outcome of evaluating one candidate line: the move to play at the level
/// the Choice was returned to, the minimax value of the line, and the depth
/// at which its terminal was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub cell: Option<(usize, usize)>,
    pub value: i32,
    pub depth: u32,
}

/// Exhaustive minimax player for one side. Terminal values decay with
/// depth, so the engine takes the fastest win and concedes the slowest
/// loss. Candidates are evaluated in legal-move order and only a strictly
/// better value replaces the current best: ties keep the earliest
/// candidate. The tree is searched without pruning; skipping candidates
/// could change which tied move wins.
#[derive(Debug, Clone, Copy)]
pub struct MinimaxEngine {
    mark: Mark,
}

impl MinimaxEngine {
    pub fn new(mark: Mark) -> Self {
        Self { mark }
    }

    pub fn mark(&self) -> Mark {
        self.mark
    }

    /// Best move for the engine's side. Fails with `NoLegalMove` on boards
    /// that are already terminal; callers check terminality first.
    pub fn select_move(&self, board: &Board) -> Result<(usize, usize)> {
        let choice = self.best_choice(board)?;
        choice.cell.ok_or(GameError::NoLegalMove)
    }

    /// Full evaluation of a live position from the engine's point of view.
    pub fn best_choice(&self, board: &Board) -> Result<Choice> {
        if board.is_terminal() {
            return Err(GameError::NoLegalMove);
        }
        self.minimax(board, true, self.mark, 0)
    }

    fn minimax(&self, board: &Board, maximizing: bool, turn: Mark, depth: u32) -> Result<Choice> {
        if let Some(winner) = board.winner() {
            let value = if winner == self.mark {
                10 - depth as i32
            } else {
                -10 + depth as i32
            };
            return Ok(Choice {
                cell: board.last_move(),
                value,
                depth,
            });
        }

        if board.is_full() {
            return Ok(Choice {
                cell: board.last_move(),
                value: 0,
                depth,
            });
        }

        let mut best: Option<Choice> = None;
        for (row, col) in board.legal_moves() {
            let mut next = board.clone();
            next.apply_move(row, col, turn)?;

            // The recursion reports the leaf move; what matters here is the
            // candidate that led to it.
            let mut candidate = self.minimax(&next, !maximizing, turn.opponent(), depth + 1)?;
            candidate.cell = Some((row, col));

            let replaces = match best {
                None => true,
                Some(current) if maximizing => candidate.value > current.value,
                Some(current) => candidate.value < current.value,
            };
            if replaces {
                best = Some(candidate);
            }
        }

        best.ok_or(GameError::NoLegalMove)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::CELL_COUNT;
    use crate::game::types::Cell;

    fn board_with_moves(moves: &[(usize, usize, Mark)]) -> Board {
        let mut board = Board::new();
        for &(row, col, mark) in moves {
            board.apply_move(row, col, mark).unwrap();
        }
        board
    }

    #[test]
    fn test_terminal_values_decay_with_depth() {
        // X completed the top row.
        let board = board_with_moves(&[
            (0, 0, Mark::X),
            (1, 0, Mark::O),
            (0, 1, Mark::X),
            (1, 1, Mark::O),
            (0, 2, Mark::X),
        ]);

        let as_winner = MinimaxEngine::new(Mark::X)
            .minimax(&board, true, Mark::O, 3)
            .unwrap();
        assert_eq!(as_winner.value, 7);
        assert_eq!(as_winner.cell, Some((0, 2)));
        assert_eq!(as_winner.depth, 3);

        let as_loser = MinimaxEngine::new(Mark::O)
            .minimax(&board, true, Mark::O, 3)
            .unwrap();
        assert_eq!(as_loser.value, -7);
    }

    #[test]
    fn test_draw_terminal_is_worth_zero() {
        #[rustfmt::skip]
        let board = Board::from_cells([
            Cell::X, Cell::O, Cell::X,
            Cell::X, Cell::O, Cell::O,
            Cell::O, Cell::X, Cell::X,
        ]);
        let choice = MinimaxEngine::new(Mark::X)
            .minimax(&board, true, Mark::X, 5)
            .unwrap();
        assert_eq!(choice.value, 0);
    }

    #[test]
    fn test_empty_board_keeps_first_candidate_on_ties() {
        // Every opening is a draw under optimal play, so the tie-break
        // settles on the first legal move.
        let engine = MinimaxEngine::new(Mark::X);
        assert_eq!(engine.select_move(&Board::new()).unwrap(), (0, 0));

        let choice = engine.best_choice(&Board::new()).unwrap();
        assert_eq!(choice.value, 0);
    }

    #[test]
    fn test_takes_immediate_win_over_slower_one() {
        // X can win at (2, 2) right away; every slower win scores lower,
        // so candidate order does not matter.
        let board = board_with_moves(&[
            (0, 0, Mark::X),
            (0, 1, Mark::O),
            (1, 1, Mark::X),
            (1, 0, Mark::O),
        ]);
        let engine = MinimaxEngine::new(Mark::X);
        assert_eq!(engine.select_move(&board).unwrap(), (2, 2));

        let choice = engine.best_choice(&board).unwrap();
        assert_eq!(choice.value, 9);
        assert_eq!(choice.depth, 1);
    }

    #[test]
    fn test_blocks_immediate_threat() {
        // X threatens the top row; O has no win of its own.
        let board = board_with_moves(&[
            (0, 0, Mark::X),
            (1, 1, Mark::O),
            (0, 1, Mark::X),
        ]);
        let engine = MinimaxEngine::new(Mark::O);
        assert_eq!(engine.select_move(&board).unwrap(), (0, 2));
    }

    #[test]
    fn test_center_is_the_only_safe_reply_to_a_corner() {
        let board = board_with_moves(&[(0, 0, Mark::X)]);
        let engine = MinimaxEngine::new(Mark::O);
        assert_eq!(engine.select_move(&board).unwrap(), (1, 1));
    }

    #[test]
    fn test_corner_reply_to_center_opening() {
        let board = board_with_moves(&[(1, 1, Mark::X)]);
        let engine = MinimaxEngine::new(Mark::O);
        // All four corners draw; the first in scan order wins the tie.
        assert_eq!(engine.select_move(&board).unwrap(), (0, 0));
    }

    #[test]
    fn test_select_move_fails_on_full_board() {
        #[rustfmt::skip]
        let board = Board::from_cells([
            Cell::X, Cell::O, Cell::X,
            Cell::X, Cell::O, Cell::O,
            Cell::O, Cell::X, Cell::X,
        ]);
        let engine = MinimaxEngine::new(Mark::X);
        assert_eq!(engine.select_move(&board), Err(GameError::NoLegalMove));
    }

    #[test]
    fn test_select_move_fails_on_won_board() {
        let board = board_with_moves(&[
            (0, 0, Mark::X),
            (1, 0, Mark::O),
            (0, 1, Mark::X),
            (1, 1, Mark::O),
            (0, 2, Mark::X),
        ]);
        assert_eq!(
            MinimaxEngine::new(Mark::O).select_move(&board),
            Err(GameError::NoLegalMove)
        );
        assert_eq!(
            MinimaxEngine::new(Mark::X).select_move(&board),
            Err(GameError::NoLegalMove)
        );
    }

    #[test]
    fn test_self_play_always_draws() {
        let mut board = Board::new();
        let mut turn = Mark::X;
        while !board.is_terminal() {
            let (row, col) = MinimaxEngine::new(turn).select_move(&board).unwrap();
            board.apply_move(row, col, turn).unwrap();
            turn = turn.opponent();
        }
        assert_eq!(board.winner(), None);
        assert!(board.is_full());
        assert_eq!(board.moves().len(), CELL_COUNT);
    }

    // Walks every opponent line against the engine's deterministic replies
    // and asserts the opponent never completes a winning row.
    fn assert_never_loses(board: &Board, engine_mark: Mark, turn: Mark) {
        if let Some(winner) = board.winner() {
            assert_ne!(winner, engine_mark.opponent(), "engine lost:\n{}", board);
            return;
        }
        if board.is_full() {
            return;
        }

        if turn == engine_mark {
            let (row, col) = MinimaxEngine::new(engine_mark).select_move(board).unwrap();
            let mut next = board.clone();
            next.apply_move(row, col, turn).unwrap();
            assert_never_loses(&next, engine_mark, turn.opponent());
        } else {
            for (row, col) in board.legal_moves() {
                let mut next = board.clone();
                next.apply_move(row, col, turn).unwrap();
                assert_never_loses(&next, engine_mark, turn.opponent());
            }
        }
    }

    #[test]
    fn test_engine_moving_first_never_loses() {
        assert_never_loses(&Board::new(), Mark::X, Mark::X);
    }

    #[test]
    fn test_engine_moving_second_never_loses() {
        assert_never_loses(&Board::new(), Mark::O, Mark::X);
    }
}
