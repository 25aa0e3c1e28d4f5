use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{GameError, Result};
use crate::game::{GameSession, MinimaxEngine, Participant, SessionPhase, SessionState};
use crate::id_generator::generate_session_id;
use crate::identifiers::{ParticipantId, SessionId};
use crate::log;

/// One registered game behind a per-session lock. Concurrent move
/// submissions are serialized; the first valid one wins and later ones are
/// rejected by the state machine.
pub struct SessionHandle {
    id: SessionId,
    session: Mutex<GameSession>,
}

impl SessionHandle {
    fn new(id: SessionId, session: GameSession) -> Self {
        Self {
            id,
            session: Mutex::new(session),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Applies a participant's move. In engine sessions the engine's reply
    /// is played before returning, so the returned snapshot reflects it;
    /// while the search runs the session shows `AwaitingEngineMove` and
    /// rejects other submissions.
    pub async fn accept_move(
        &self,
        participant: &ParticipantId,
        cell_index: usize,
    ) -> Result<SessionState> {
        let state = {
            let mut session = self.session.lock().await;
            session.accept_move(participant, cell_index)?
        };

        if state.phase == SessionPhase::AwaitingEngineMove {
            return self.play_engine_turn().await;
        }
        Ok(state)
    }

    pub async fn current_state(&self) -> SessionState {
        self.session.lock().await.current_state()
    }

    pub async fn is_terminal(&self) -> bool {
        self.session.lock().await.is_terminal()
    }

    // Runs the engine for as long as it is the engine's turn. The search
    // runs on a blocking worker against a board clone, with the session
    // unlocked meanwhile.
    async fn play_engine_turn(&self) -> Result<SessionState> {
        loop {
            let (board, mark) = {
                let session = self.session.lock().await;
                match session.pending_engine_turn() {
                    Some(input) => input,
                    None => return Ok(session.current_state()),
                }
            };

            let engine = MinimaxEngine::new(mark);
            let selected = tokio::task::spawn_blocking(move || engine.select_move(&board)).await;
            let (row, col) = match selected {
                Ok(result) => result?,
                Err(join_error) => {
                    log!("Engine task failed: {}", join_error);
                    return Err(GameError::EngineTask {
                        message: join_error.to_string(),
                    });
                }
            };

            let mut session = self.session.lock().await;
            let state = session.apply_engine_move(row, col)?;
            if state.phase != SessionPhase::AwaitingEngineMove {
                return Ok(state);
            }
        }
    }
}

/// Registry of live sessions, keyed by generated session id. Sessions are
/// independent; the registry lock only guards the map itself.
pub struct SessionService {
    sessions: Mutex<HashMap<SessionId, Arc<SessionHandle>>>,
}

impl Default for SessionService {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionService {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Creates and registers a session. Participant A takes X and moves
    /// first; the second seat is either participant B or the engine.
    pub async fn create_session(
        &self,
        participant_a: ParticipantId,
        participant_b: Option<ParticipantId>,
        vs_engine: bool,
    ) -> Result<Arc<SessionHandle>> {
        let player_o = match (participant_b, vs_engine) {
            (None, true) => Participant::Engine,
            (Some(id), false) => Participant::Human(id),
            (Some(_), true) => {
                return Err(GameError::InvalidSetup {
                    message: "an engine session takes exactly one participant".to_string(),
                });
            }
            (None, false) => {
                return Err(GameError::InvalidSetup {
                    message: "a two-player session needs a second participant".to_string(),
                });
            }
        };

        let session = GameSession::new(Participant::Human(participant_a.clone()), player_o)?;

        let mut sessions = self.sessions.lock().await;
        let mut id = SessionId::new(generate_session_id());
        while sessions.contains_key(&id) {
            id = SessionId::new(generate_session_id());
        }

        let handle = Arc::new(SessionHandle::new(id.clone(), session));
        sessions.insert(id.clone(), handle.clone());
        drop(sessions);

        log!("Game session created: {} for {}", id, participant_a);
        Ok(handle)
    }

    pub async fn session(&self, session_id: &SessionId) -> Result<Arc<SessionHandle>> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| GameError::SessionNotFound {
                session_id: session_id.clone(),
            })
    }

    pub async fn remove_session(&self, session_id: &SessionId) {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(session_id);
        drop(sessions);

        log!("Game session removed: {}", session_id);
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Cell, Mark};

    fn participant(name: &str) -> ParticipantId {
        ParticipantId::new(name.to_string())
    }

    #[tokio::test]
    async fn test_create_session_seat_validation() {
        let service = SessionService::new();

        let result = service
            .create_session(participant("alice"), Some(participant("bob")), true)
            .await;
        assert!(matches!(result, Err(GameError::InvalidSetup { .. })));

        let result = service
            .create_session(participant("alice"), None, false)
            .await;
        assert!(matches!(result, Err(GameError::InvalidSetup { .. })));

        let result = service
            .create_session(participant("alice"), Some(participant("alice")), false)
            .await;
        assert!(matches!(result, Err(GameError::InvalidSetup { .. })));

        assert_eq!(service.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_engine_replies_within_accept_move() {
        let service = SessionService::new();
        let alice = participant("alice");
        let handle = service
            .create_session(alice.clone(), None, true)
            .await
            .unwrap();

        let state = handle.accept_move(&alice, 4).await.unwrap();
        assert_eq!(state.cells[4], Cell::X);
        assert_eq!(state.cells[0], Cell::O);
        assert_eq!(state.phase, SessionPhase::AwaitingMove(Mark::X));
    }

    #[tokio::test]
    async fn test_engine_session_never_ends_in_a_human_win() {
        let service = SessionService::new();
        let alice = participant("alice");
        let handle = service
            .create_session(alice.clone(), None, true)
            .await
            .unwrap();

        // A naive human taking the first empty cell every turn.
        let mut state = handle.accept_move(&alice, 4).await.unwrap();
        while !state.phase.is_terminal() {
            let cell = state
                .cells
                .iter()
                .position(|cell| cell.is_empty())
                .unwrap();
            state = handle.accept_move(&alice, cell).await.unwrap();
        }

        assert_ne!(state.phase, SessionPhase::Won(Mark::X));
        assert!(handle.is_terminal().await);
    }

    #[tokio::test]
    async fn test_two_player_session_alternates() {
        let service = SessionService::new();
        let alice = participant("alice");
        let bob = participant("bob");
        let handle = service
            .create_session(alice.clone(), Some(bob.clone()), false)
            .await
            .unwrap();

        let state = handle.accept_move(&alice, 0).await.unwrap();
        assert_eq!(state.phase, SessionPhase::AwaitingMove(Mark::O));

        let state = handle.accept_move(&bob, 4).await.unwrap();
        assert_eq!(state.phase, SessionPhase::AwaitingMove(Mark::X));

        let result = handle.accept_move(&bob, 8).await;
        assert_eq!(result, Err(GameError::NotYourTurn));
    }

    #[tokio::test]
    async fn test_duplicate_submission_loses_the_race() {
        let service = SessionService::new();
        let alice = participant("alice");
        let bob = participant("bob");
        let handle = service
            .create_session(alice.clone(), Some(bob), false)
            .await
            .unwrap();

        let (first, second) =
            tokio::join!(handle.accept_move(&alice, 4), handle.accept_move(&alice, 4));

        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes.contains(&Err(GameError::NotYourTurn)));
    }

    #[tokio::test]
    async fn test_lookup_and_removal() {
        let service = SessionService::new();
        let alice = participant("alice");
        let handle = service
            .create_session(alice.clone(), None, true)
            .await
            .unwrap();
        let id = handle.id().clone();

        assert_eq!(service.session_count().await, 1);
        let looked_up = service.session(&id).await.unwrap();
        assert_eq!(looked_up.id(), &id);

        let state = looked_up.current_state().await;
        assert_eq!(state.phase, SessionPhase::AwaitingMove(Mark::X));
        assert!(state.cells.iter().all(|cell| cell.is_empty()));

        service.remove_session(&id).await;
        assert_eq!(service.session_count().await, 0);
        assert_eq!(
            service.session(&id).await.err(),
            Some(GameError::SessionNotFound { session_id: id })
        );
    }
}
