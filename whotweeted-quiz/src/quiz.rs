//! The Playing and Finished states.
//!
//! Each round draws an account, then a tweet from that account's timeline (with
//! replacement), and asks the player to name the author. A malformed answer
//! leads to a quit-or-continue prompt; continuing shows the same tweet again and
//! does not count as a round. The game ends when lives run out, when either
//! timeline has nothing to show, or when the player quits.
use crate::console::Console;
use crate::draw::{Draw, Seat};
use crate::guess::{Guess, parse_guess};
use crate::session::SessionState;
use std::io::{self, BufRead, Write};
use whotweeted_social::Timeline;

const MALFORMED_PROMPT: &str =
    "\nYou must input either 1 or 2! Press q to quit or any key to continue: ";

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Lives or content ran out; the summary was printed.
    GameOver { score: u32, rounds_played: u32 },
    /// The player quit; no summary.
    Quit,
}

impl Outcome {
    /// Process exit status for this outcome.
    ///
    /// ```
    /// use whotweeted_quiz::Outcome;
    ///
    /// assert_eq!(Outcome::GameOver { score: 2, rounds_played: 5 }.exit_code(), 0);
    /// assert_eq!(Outcome::Quit.exit_code(), 1);
    /// ```
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::GameOver { .. } => 0,
            Outcome::Quit => 1,
        }
    }
}

enum Verdict {
    Correct,
    Wrong,
    Quit,
}

pub struct Quiz<'t> {
    first: &'t Timeline,
    second: &'t Timeline,
    state: SessionState,
}

impl<'t> Quiz<'t> {
    pub fn new(first: &'t Timeline, second: &'t Timeline, lives: u32) -> Self {
        Self {
            first,
            second,
            state: SessionState::new(lives),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    fn timeline(&self, seat: Seat) -> &'t Timeline {
        match seat {
            Seat::First => self.first,
            Seat::Second => self.second,
        }
    }

    fn can_play(&self) -> bool {
        self.state.is_alive() && !self.first.is_empty() && !self.second.is_empty()
    }

    /// Play until the game ends.
    pub fn run<D, R, W>(&mut self, draw: &mut D, console: &mut Console<R, W>) -> io::Result<Outcome>
    where
        D: Draw,
        R: BufRead,
        W: Write,
    {
        while self.can_play() {
            let seat = draw.seat();
            let author = self.timeline(seat);
            let index = draw.index(author.len()).min(author.len() - 1);
            let text = &author.items()[index];

            tracing::debug!(account = author.account(), index, "quiz.round");

            match self.ask(seat, text, console)? {
                Verdict::Correct => {
                    self.state.record_correct();
                    console.say(format_args!("\nYou got it! It was @{}.", author.account()))?;
                }
                Verdict::Wrong => {
                    self.state.record_miss();
                    match seat {
                        Seat::First => console.say(format_args!(
                            "\nOops! It was actually @{}!",
                            author.account()
                        ))?,
                        Seat::Second => console.say(format_args!(
                            "\nTough cookie! It was @{}.",
                            author.account()
                        ))?,
                    }
                    if self.state.is_alive() {
                        console.say(format_args!(
                            "You have {} lives remaining.",
                            self.state.lives()
                        ))?;
                    }
                }
                Verdict::Quit => {
                    tracing::info!(
                        score = self.state.score(),
                        rounds_played = self.state.rounds_played(),
                        "quiz.quit"
                    );
                    return Ok(Outcome::Quit);
                }
            }
        }

        let (score, rounds_played) = (self.state.score(), self.state.rounds_played());
        tracing::info!(
            score,
            rounds_played,
            lives = self.state.lives(),
            first_items = self.first.len(),
            second_items = self.second.len(),
            "quiz.game_over"
        );
        console.say(format_args!(
            "\nGame over. You got {score} correct answers out of {rounds_played}!\n"
        ))?;
        Ok(Outcome::GameOver {
            score,
            rounds_played,
        })
    }

    /// Show `text` and collect a verdict, re-showing it after a malformed answer.
    fn ask<R: BufRead, W: Write>(
        &self,
        seat: Seat,
        text: &str,
        console: &mut Console<R, W>,
    ) -> io::Result<Verdict> {
        let prompt = format!(
            "Enter 1 for @{} or 2 for @{} (q to quit):  ",
            self.first.account(),
            self.second.account()
        );

        loop {
            console.say(format_args!("\nThe Tweet:\n\n{text}\n\nWho Tweeted this?"))?;
            let Some(answer) = console.ask(&prompt)? else {
                return Ok(Verdict::Quit);
            };

            match parse_guess(&answer) {
                Guess::Seat(guess) if guess == seat => return Ok(Verdict::Correct),
                Guess::Seat(_) => return Ok(Verdict::Wrong),
                Guess::Quit => return Ok(Verdict::Quit),
                Guess::Malformed(raw) => {
                    tracing::debug!(input = %raw, "quiz.malformed_answer");
                    match console.ask(MALFORMED_PROMPT)?.as_deref().map(str::trim) {
                        None | Some("q") => return Ok(Verdict::Quit),
                        Some(_) => continue,
                    }
                }
            }
        }
    }
}
