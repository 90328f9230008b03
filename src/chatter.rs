use crate::evolution::StageId;
use crate::expression::Expression;
use serde::{Deserialize, Serialize};

/// Seeded counter-based RNG so a save replays the same chatter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub counter: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, counter: 0 }
    }

    pub fn next_u64(&mut self) -> u64 {
        // SplitMix64 over seed + counter
        let mut z = self
            .seed
            .wrapping_add(self.counter.wrapping_mul(0x9E3779B97F4A7C15));
        self.counter = self.counter.wrapping_add(1);

        z = z.wrapping_add(0x9E3779B97F4A7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let len = items.len() as u64;
        items.get((self.next_u64() % len) as usize)
    }
}

const HAPPY: &[&str] = &[
    "Today is a good day!",
    "I like it when you visit.",
    "Everything feels just right.",
];
const NEUTRAL: &[&str] = &[
    "Hmm. What shall we do?",
    "I'm doing okay, thanks.",
    "Got any snacks?",
];
const SAD: &[&str] = &[
    "I feel a bit lonely...",
    "Could we play for a while?",
    "Nobody noticed me today.",
];
const EXCITED: &[&str] = &[
    "Wheee! Let's go, let's go!",
    "I could run laps around the screen!",
    "Best. Day. Ever.",
];
const TIRED: &[&str] = &[
    "*yawn* Just five more minutes...",
    "My paws feel heavy.",
    "Nap time soon?",
];
const BABBLE: &[&str] = &["Ba! Ba!", "Goo?", "Mmm... pa!"];

fn lines_for(expression: Expression) -> &'static [&'static str] {
    match expression {
        Expression::Happy => HAPPY,
        Expression::Neutral => NEUTRAL,
        Expression::Sad => SAD,
        Expression::Excited => EXCITED,
        Expression::Tired => TIRED,
    }
}

/// A line of flavor text for the pet's current mood. Babies mostly babble.
pub fn line_for(expression: Expression, stage: StageId, rng: &mut RngState) -> &'static str {
    let pool = if stage == StageId::Baby && expression != Expression::Tired {
        BABBLE
    } else {
        lines_for(expression)
    };
    rng.pick(pool).copied().unwrap_or("...")
}
