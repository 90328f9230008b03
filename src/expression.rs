//! Mood derivation.
//!
//! The label is a pure function of the stats. Rules are evaluated in
//! priority order and the first matching predicate wins, so the table below
//! is the whole contract:
//!
//! 1. happiness >= 90 and energy >= 70 -> `Excited` (overrides everything)
//! 2. energy < 20 -> `Tired`
//! 3. happiness >= 80 -> `Happy`
//! 4. happiness >= 60 -> `Neutral`
//! 5. happiness < 30 -> `Sad`
//! 6. otherwise -> `Neutral`

use crate::model::Stats;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expression {
    Happy,
    #[default]
    Neutral,
    Sad,
    Excited,
    Tired,
}

impl Expression {
    pub fn label(self) -> &'static str {
        match self {
            Expression::Happy => "happy",
            Expression::Neutral => "neutral",
            Expression::Sad => "sad",
            Expression::Excited => "excited",
            Expression::Tired => "tired",
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct Rule {
    applies: fn(&Stats) -> bool,
    expression: Expression,
}

fn is_excited(s: &Stats) -> bool {
    s.happiness >= 90.0 && s.energy >= 70.0
}

fn is_tired(s: &Stats) -> bool {
    s.energy < 20.0
}

fn is_happy(s: &Stats) -> bool {
    s.happiness >= 80.0
}

fn is_content(s: &Stats) -> bool {
    s.happiness >= 60.0
}

fn is_sad(s: &Stats) -> bool {
    s.happiness < 30.0
}

// Highest priority first.
const RULES: [Rule; 5] = [
    Rule {
        applies: is_excited,
        expression: Expression::Excited,
    },
    Rule {
        applies: is_tired,
        expression: Expression::Tired,
    },
    Rule {
        applies: is_happy,
        expression: Expression::Happy,
    },
    Rule {
        applies: is_content,
        expression: Expression::Neutral,
    },
    Rule {
        applies: is_sad,
        expression: Expression::Sad,
    },
];

pub fn resolve_expression(stats: &Stats) -> Expression {
    RULES
        .iter()
        .find(|rule| (rule.applies)(stats))
        .map(|rule| rule.expression)
        .unwrap_or(Expression::Neutral)
}
