/// Lives, score and round count for one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    lives: u32,
    score: u32,
    rounds_played: u32,
}

impl SessionState {
    pub fn new(lives: u32) -> Self {
        Self {
            lives,
            score: 0,
            rounds_played: 0,
        }
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }

    pub fn record_correct(&mut self) {
        self.score += 1;
        self.rounds_played += 1;
    }

    pub fn record_miss(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.rounds_played += 1;
    }
}
