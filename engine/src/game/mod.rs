mod board;
mod search;
mod session;
mod types;

pub use board::{BOARD_SIZE, Board, CELL_COUNT};
pub use search::{Choice, MinimaxEngine};
pub use session::{GameSession, Participant, SessionPhase, SessionState};
pub use types::{Cell, Mark};
