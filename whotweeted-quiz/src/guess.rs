use crate::draw::Seat;

/// What the player typed at the "who tweeted this?" prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guess {
    Seat(Seat), // 1 | 2
    Quit,       // q
    Malformed(String),
}

pub fn parse_guess(input: &str) -> Guess {
    match input.trim() {
        "1" => Guess::Seat(Seat::First),
        "2" => Guess::Seat(Seat::Second),
        "q" => Guess::Quit,
        other => Guess::Malformed(other.to_string()),
    }
}
