//! Diamond chart: four life stages, each with a pinnacle (opportunity) and a
//! challenge (lesson) digit.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{STAGE_BASE_AGE, STAGE_SPAN};
use crate::date::Date;
use crate::digits::reduce_with;

/// Inclusive age range; `end == None` means "and beyond".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    pub start: u32,
    pub end: Option<u32>,
}

impl AgeRange {
    pub fn contains(&self, age: u32) -> bool {
        age >= self.start && self.end.is_none_or(|end| age <= end)
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{} ~ {end}", self.start),
            None => write!(f, "{}+", self.start),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// 1..=4
    pub index: u8,
    pub label: String,
    pub ages: AgeRange,
    pub pinnacle: u8,
    pub challenge: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiamondChart {
    /// `YYYY/MM/DD`
    pub birthday: String,
    pub life_path: u8,
    pub stages: [Stage; 4],
}

const STAGE_LABELS: [&str; 4] = [
    "Early years",
    "Youth / midlife",
    "Midlife / prime",
    "Later years",
];

impl DiamondChart {
    /// Month, day and year are reduced independently before anything else,
    /// which keeps the life path at most 9 (33 with master numbers) and the
    /// first stage boundary positive.
    pub fn compute(date: Date, keep_master: bool) -> Self {
        let reduce = |n: u64| u32::from(reduce_with(n, keep_master));

        let m = reduce(u64::from(date.month()));
        let d = reduce(u64::from(date.day()));
        let y = reduce(u64::from(date.year()));

        let life_path = reduce(u64::from(m + d + y));

        let end1 = STAGE_BASE_AGE - life_path;
        let end2 = end1 + STAGE_SPAN;
        let end3 = end2 + STAGE_SPAN;

        let p1 = reduce(u64::from(m + d));
        let p2 = reduce(u64::from(d + y));
        let p3 = reduce(u64::from(p1 + p2));
        let p4 = reduce(u64::from(m + y));

        let c1 = m.abs_diff(d);
        let c2 = d.abs_diff(y);
        let c3 = c1.abs_diff(c2);
        let c4 = m.abs_diff(y);

        let ranges = [
            AgeRange {
                start: 0,
                end: Some(end1),
            },
            AgeRange {
                start: end1 + 1,
                end: Some(end2),
            },
            AgeRange {
                start: end2 + 1,
                end: Some(end3),
            },
            AgeRange {
                start: end3 + 1,
                end: None,
            },
        ];
        let pinnacles = [p1, p2, p3, p4];
        let challenges = [c1, c2, c3, c4];

        let stages = std::array::from_fn(|i| Stage {
            index: i as u8 + 1,
            label: STAGE_LABELS[i].to_string(),
            ages: ranges[i],
            pinnacle: pinnacles[i] as u8,
            challenge: challenges[i] as u8,
        });

        Self {
            birthday: format!(
                "{:04}/{:02}/{:02}",
                date.year(),
                date.month(),
                date.day()
            ),
            life_path: life_path as u8,
            stages,
        }
    }

    /// The stage covering `age`.
    pub fn stage_at(&self, age: u32) -> &Stage {
        self.stages
            .iter()
            .find(|s| s.ages.contains(age))
            .unwrap_or(&self.stages[3])
    }
}
