//! Suggestions for what to do during a rest interval.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CommandError;

pub const DEFAULT_REST_IDEAS: [&str; 20] = [
    "Stand up and stretch your shoulders + neck.",
    "Drink water - a full glass.",
    "Do 10 slow deep breaths (4s in, 6s out).",
    "Look outside / far away for 30 seconds (eye reset).",
    "Tidy one tiny area: desk corner or one drawer.",
    "Write 1 sentence: what's the next smallest step?",
    "Walk to another room and back (no phone).",
    "Quick wrist + hand stretches.",
    "Put on a song and just listen (no scrolling).",
    "Wash your face / apply lip balm.",
    "Refill your water bottle.",
    "Do 10 bodyweight squats or calf raises.",
    "Open a window (or step outside) for fresh air.",
    "Send a kind message to someone (one line).",
    "Check posture: feet flat, shoulders relaxed, jaw unclenched.",
    "5-min brain dump: write everything on your mind.",
    "Make the workspace 'ready' for the next work block.",
    "Do 1-minute mindfulness: notice 5 things you see.",
    "Prepare the next task materials (open docs, tabs).",
    "Quick gratitude: write 3 small wins today.",
];

const MIN_IDEA_CHARS: usize = 4;
const MAX_IDEA_CHARS: usize = 200;

/// How many ideas a user may add on top of the built-in ones.
pub const MAX_USER_IDEAS: usize = 50;

/// Clean up a user-submitted idea or refuse it.
///
/// Whitespace runs collapse to one space and the first letter is capitalized.
/// Links, letterless input, one character repeated, and letter-only text with
/// fewer than two vowels are refused.
pub fn sanitize_idea(raw: &str) -> Result<String, CommandError> {
    let reject = |why: &str| -> Result<String, CommandError> {
        Err(CommandError::Validation(format!("rest idea {why}")))
    };

    let value = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let chars = value.chars().count();
    if chars < MIN_IDEA_CHARS {
        return reject("is too short");
    }
    if chars > MAX_IDEA_CHARS {
        return reject("is too long");
    }
    let lower = value.to_lowercase();
    if lower.contains("http://") || lower.contains("https://") || lower.contains("www.") {
        return reject("must not contain links");
    }
    if !value.chars().any(|c| c.is_ascii_alphabetic()) {
        return reject("needs at least one letter");
    }
    let compact: Vec<char> = value.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() >= 5 && compact.iter().all(|c| *c == compact[0]) {
        return reject("is a single repeated character");
    }
    if value.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') {
        let vowels = lower.chars().filter(|c| "aeiou".contains(*c)).count();
        if vowels < 2 {
            return reject("does not look like words");
        }
    }

    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(chars.as_str());
    }
    Ok(out)
}

/// Built-in ideas plus the ones the user added this session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestIdeas {
    user: Vec<String>,
}

impl RestIdeas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_ideas(&self) -> &[String] {
        &self.user
    }

    /// Sanitize and store an idea. Duplicates (ignoring case) are refused, as
    /// is anything past [`MAX_USER_IDEAS`].
    pub fn add(&mut self, raw: &str) -> Result<String, CommandError> {
        if self.user.len() >= MAX_USER_IDEAS {
            return Err(CommandError::Validation(format!(
                "rest idea list is full ({MAX_USER_IDEAS} ideas)"
            )));
        }
        let idea = sanitize_idea(raw)?;
        let key = idea.to_lowercase();
        if self.pool().any(|existing| existing.to_lowercase() == key) {
            return Err(CommandError::Validation("rest idea already exists".into()));
        }
        self.user.push(idea.clone());
        Ok(idea)
    }

    pub fn pool(&self) -> impl Iterator<Item = &str> {
        DEFAULT_REST_IDEAS
            .iter()
            .copied()
            .chain(self.user.iter().map(String::as_str))
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        let pool: Vec<&str> = self.pool().collect();
        pool.choose(rng).copied().unwrap_or(DEFAULT_REST_IDEAS[0])
    }
}
