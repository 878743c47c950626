use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tictactoe::{Game, GameConfig, GameError, GameOutcome, Snapshot};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("game {0} not found")]
    NotFound(u64),
    #[error("session state is poisoned")]
    Poisoned,
}

/// Running tally for one browser session; the engine only reports outcomes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    pub human_wins: u32,
    pub ai_wins: u32,
    pub ties: u32,
}

#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    game: Game,
    score: Score,
    recorded: bool,
}

#[derive(Debug, Serialize)]
pub struct GameView {
    pub id: u64,
    pub score: Score,
    pub state: Snapshot,
}

impl Session {
    pub fn start(config: GameConfig) -> Result<Self, GameError> {
        let mut game = Game::from_entropy();
        game.start(config.clone())?;
        Ok(Self {
            config,
            game,
            score: Score::default(),
            recorded: false,
        })
    }

    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    /// New game with the same settings; the score carries over.
    pub fn restart(&mut self) -> Result<(), GameError> {
        self.game.start(self.config.clone())?;
        self.recorded = false;
        Ok(())
    }

    /// Counts a finished game once, however often it is observed.
    pub fn record_outcome(&mut self) {
        if self.recorded {
            return;
        }
        let human = self.config.human_mark();
        match self.game.status().outcome() {
            GameOutcome::Ongoing => return,
            GameOutcome::Win(mark) if mark == human => self.score.human_wins += 1,
            GameOutcome::Win(_) => self.score.ai_wins += 1,
            GameOutcome::Draw => self.score.ties += 1,
        }
        self.recorded = true;
    }

    pub fn view(&self, id: u64) -> GameView {
        GameView {
            id,
            score: self.score,
            state: self.game.current_state(),
        }
    }
}

/// Sessions kept before the oldest are evicted.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

/// Live games by id. Ids only grow, so the first key is always the oldest
/// session and is the one dropped when the store is full.
#[derive(Clone, Debug)]
pub struct Sessions {
    games: Arc<Mutex<BTreeMap<u64, Arc<Mutex<Session>>>>>,
    next_id: Arc<AtomicU64>,
    max_sessions: usize,
}

impl Default for Sessions {
    fn default() -> Self {
        Self::with_limit(DEFAULT_MAX_SESSIONS)
    }
}

impl Sessions {
    pub fn with_limit(max_sessions: usize) -> Self {
        Self {
            games: Arc::default(),
            next_id: Arc::default(),
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn insert(&self, session: Session) -> Result<u64, SessionError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let mut games = self.games.lock().map_err(|_| SessionError::Poisoned)?;
        while games.len() >= self.max_sessions {
            if let Some((evicted, _)) = games.pop_first() {
                debug!(id = evicted, "evicting oldest game");
            }
        }
        games.insert(id, Arc::new(Mutex::new(session)));
        Ok(id)
    }

    pub fn get(&self, id: u64) -> Result<Arc<Mutex<Session>>, SessionError> {
        self.games
            .lock()
            .map_err(|_| SessionError::Poisoned)?
            .get(&id)
            .cloned()
            .ok_or(SessionError::NotFound(id))
    }

    /// Drops a game. Requests already holding it finish against their copy.
    pub fn remove(&self, id: u64) -> Result<(), SessionError> {
        self.games
            .lock()
            .map_err(|_| SessionError::Poisoned)?
            .remove(&id)
            .map(drop)
            .ok_or(SessionError::NotFound(id))
    }

    pub fn count(&self) -> Result<usize, SessionError> {
        Ok(self.games.lock().map_err(|_| SessionError::Poisoned)?.len())
    }
}

pub fn lock(session: &Mutex<Session>) -> Result<MutexGuard<'_, Session>, SessionError> {
    session.lock().map_err(|_| SessionError::Poisoned)
}
