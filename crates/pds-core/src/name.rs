//! Name values: soul (vowels), persona (consonants), destiny (both) and the
//! four temperament counts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    BODY_VALUES, EMOTION_VALUES, INTUITION_VALUES, LETTER_VALUES, MIND_VALUES, VOWELS,
};
use crate::digits::{Reduction, reduction};

/// Letter counts per temperament bucket (counts, not sums).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Temperament {
    pub body: u32,
    pub mind: u32,
    pub emotion: u32,
    pub intuition: u32,
}

impl Temperament {
    fn record(&mut self, value: u8) {
        if BODY_VALUES.contains(&value) {
            self.body += 1;
        } else if MIND_VALUES.contains(&value) {
            self.mind += 1;
        } else if EMOTION_VALUES.contains(&value) {
            self.emotion += 1;
        } else if INTUITION_VALUES.contains(&value) {
            self.intuition += 1;
        }
    }
}

impl fmt::Display for Temperament {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.body, self.mind, self.emotion, self.intuition
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameValues {
    pub soul: Reduction,
    pub persona: Reduction,
    pub destiny: Reduction,
    pub temperament: Temperament,
}

/// Value of a Latin letter (case-insensitive); `None` for anything else.
pub fn letter_value(c: char) -> Option<u8> {
    if !c.is_ascii_alphabetic() {
        return None;
    }
    let idx = (c.to_ascii_uppercase() as u8 - b'A') as usize;
    Some(LETTER_VALUES[idx])
}

/// Compute name values. Non-Latin characters are skipped, so an empty or
/// untransliterated name yields all zeros.
pub fn name_values(name: &str) -> NameValues {
    let mut soul = 0u64;
    let mut persona = 0u64;
    let mut temperament = Temperament::default();

    for c in name.chars() {
        let Some(value) = letter_value(c) else {
            continue;
        };
        if VOWELS.contains(&c.to_ascii_uppercase()) {
            soul += u64::from(value);
        } else {
            persona += u64::from(value);
        }
        temperament.record(value);
    }

    NameValues {
        soul: reduction(soul),
        persona: reduction(persona),
        destiny: reduction(soul + persona),
        temperament,
    }
}
