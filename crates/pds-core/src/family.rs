//! Family dynamics: relationship tips keyed on the O digit, and the weighted
//! energy radar across all members.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chart::Chart;
use crate::constants::CORE_WEIGHT;
use crate::error::{PdsError, Result};
use crate::triangle::TriangleParams;

const SELF_REFLECTION: &str = "A conversation with yourself is where every relationship begins. \
Looking at this radar, which side of you is your strongest pillar right now?";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub params: TriangleParams,
}

impl Member {
    pub fn new(name: impl Into<String>, params: TriangleParams) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn from_chart(name: impl Into<String>, chart: &Chart) -> Self {
        Self::new(name, chart.params)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    /// Same O digit.
    Mirror,
    /// O digits sum to 10.
    Complementary,
    /// O digits differ by a multiple of 3.
    Harmonic,
    Divergent,
    /// Single member: no comparison.
    SelfReflection,
}

impl Relationship {
    /// Rule order matters: equal digits are also 0 apart, which would
    /// otherwise match the harmonic rule.
    pub fn classify(reference: u8, other: u8) -> Self {
        if reference == other {
            Relationship::Mirror
        } else if u32::from(reference) + u32::from(other) == 10 {
            Relationship::Complementary
        } else if reference.abs_diff(other) % 3 == 0 {
            Relationship::Harmonic
        } else {
            Relationship::Divergent
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Relationship::Mirror => "mirror",
            Relationship::Complementary => "complementary",
            Relationship::Harmonic => "harmonic",
            Relationship::Divergent => "divergent",
            Relationship::SelfReflection => "self_reflection",
        }
    }

    fn script(self, reference: u8, other: u8) -> String {
        match self {
            Relationship::Mirror => format!(
                "You mirror each other ({reference}). What bothers you in them is usually a part of \
                 yourself you have not yet accepted; what you admire in them is a gift you also hold."
            ),
            Relationship::Complementary => format!(
                "You complement each other ({reference} vs {other}). This is a partnership of souls: \
                 their strengths cover your blind spots, so learn to rely on them."
            ),
            Relationship::Harmonic => "You share a similar rhythm of energy. Communication should \
                flow easily, and you can recharge each other."
                .to_string(),
            Relationship::Divergent => "You come from different energy dimensions. This relationship \
                is here to stretch your comfort zone; try seeing the world through their eyes."
                .to_string(),
            Relationship::SelfReflection => SELF_REFLECTION.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipTip {
    pub to: String,
    pub kind: Relationship,
    pub script: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FamilyReport {
    pub tips: Vec<RelationshipTip>,
    /// Percentage of total weight per digit 1..=9, one decimal.
    pub radar: BTreeMap<u8, f64>,
}

/// Analyze a group. The first member is the reference everyone else is
/// compared against.
pub fn analyze(members: &[Member]) -> Result<FamilyReport> {
    let Some((reference, others)) = members.split_first() else {
        return Err(PdsError::invalid("family analysis needs at least one member"));
    };

    let tips = if others.is_empty() {
        vec![RelationshipTip {
            to: reference.name.clone(),
            kind: Relationship::SelfReflection,
            script: SELF_REFLECTION.to_string(),
        }]
    } else {
        others
            .iter()
            .map(|other| {
                let (a, b) = (reference.params.O, other.params.O);
                let kind = Relationship::classify(a, b);
                RelationshipTip {
                    to: other.name.clone(),
                    kind,
                    script: kind.script(a, b),
                }
            })
            .collect()
    };

    Ok(FamilyReport {
        tips,
        radar: radar(members),
    })
}

/// Weighted digit distribution: O counts 3, each of M N I J K L counts 1.
pub fn radar(members: &[Member]) -> BTreeMap<u8, f64> {
    let mut counts: BTreeMap<u8, u32> = (1..=9).map(|d| (d, 0)).collect();
    let mut total = 0u32;

    for member in members {
        let p = &member.params;
        if let Some(c) = counts.get_mut(&p.O) {
            *c += CORE_WEIGHT;
        }
        for digit in p.secondary() {
            if let Some(c) = counts.get_mut(&digit) {
                *c += 1;
            }
        }
        total += CORE_WEIGHT + 6;
    }

    counts
        .into_iter()
        .map(|(digit, count)| {
            let pct = if total == 0 {
                0.0
            } else {
                f64::from(count) / f64::from(total) * 100.0
            };
            (digit, (pct * 10.0).round() / 10.0)
        })
        .collect()
}
