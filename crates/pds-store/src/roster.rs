//! The roster: the user's own entry followed by saved profiles, grouped
//! into category tabs.

use std::collections::BTreeSet;

use pds_core::{Date, Member, NumerologyEngine, reduce};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{Account, Profile, UNCATEGORIZED};

pub const SELF_CATEGORY: &str = "Self";
pub const ALL_TAB: &str = "All";

/// Categories offered out of the box.
pub const DEFAULT_CATEGORIES: [&str; 5] =
    ["Family", "Friends", "Colleagues", "Clients", UNCATEGORIZED];

/// Tabs that always come first, in this order, when they have entries.
const FIXED_TABS: [&str; 6] = [ALL_TAB, SELF_CATEGORY, "Family", "Friends", "Colleagues", "Clients"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum EntryId {
    Me,
    Saved(Uuid),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: EntryId,
    pub name: String,
    pub english_name: String,
    pub birth_date: Date,
    pub category: String,
}

impl RosterEntry {
    /// The badge number shown on roster buttons.
    pub fn life_path_number(&self) -> u8 {
        reduce(self.birth_date.digits().iter().map(|&d| u64::from(d)).sum())
    }
}

impl From<&Profile> for RosterEntry {
    fn from(p: &Profile) -> Self {
        Self {
            id: EntryId::Saved(p.id),
            name: p.name.clone(),
            english_name: p.english_name.clone(),
            birth_date: p.birth_date,
            category: p.category.clone(),
        }
    }
}

/// The user's own entry. Missing fields fall back to `fallback_name` and
/// [`Date::PLACEHOLDER_BIRTH`].
pub fn self_entry(account: Option<&Account>, fallback_name: &str) -> RosterEntry {
    let name = account
        .map(|a| a.full_name.trim())
        .filter(|n| !n.is_empty())
        .unwrap_or(fallback_name)
        .to_string();

    RosterEntry {
        id: EntryId::Me,
        name,
        english_name: account.map(|a| a.english_name.clone()).unwrap_or_default(),
        birth_date: account.and_then(|a| a.birth_date).unwrap_or(Date::PLACEHOLDER_BIRTH),
        category: SELF_CATEGORY.to_string(),
    }
}

/// Self first, then saved profiles in the order given.
pub fn entries(account: Option<&Account>, fallback_name: &str, profiles: &[Profile]) -> Vec<RosterEntry> {
    std::iter::once(self_entry(account, fallback_name))
        .chain(profiles.iter().map(RosterEntry::from))
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    pub name: String,
    pub entries: Vec<RosterEntry>,
}

/// "All" first, then the fixed categories that have entries, then any
/// other categories alphabetically.
pub fn group_by_category(entries: &[RosterEntry]) -> Vec<Tab> {
    let category_of = |e: &RosterEntry| {
        if e.category.trim().is_empty() {
            UNCATEGORIZED.to_string()
        } else {
            e.category.clone()
        }
    };

    let present: BTreeSet<String> = entries.iter().map(category_of).collect();

    let mut names: Vec<String> = vec![ALL_TAB.to_string()];
    names.extend(
        FIXED_TABS[1..]
            .iter()
            .filter(|t| present.contains(**t))
            .map(|t| t.to_string()),
    );
    names.extend(
        present
            .iter()
            .filter(|c| !FIXED_TABS.contains(&c.as_str()))
            .cloned(),
    );

    names
        .into_iter()
        .map(|name| {
            let members = if name == ALL_TAB {
                entries.to_vec()
            } else {
                entries
                    .iter()
                    .filter(|e| category_of(*e) == name)
                    .cloned()
                    .collect()
            };
            Tab {
                name,
                entries: members,
            }
        })
        .collect()
}

/// Sorted union of configured and in-use categories.
pub fn category_options(configured: &[String], existing: &[String]) -> Vec<String> {
    configured
        .iter()
        .chain(existing)
        .map(|c| c.trim())
        .filter(|c| !c.is_empty() && *c != SELF_CATEGORY)
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Build family-analysis members by charting every entry.
pub fn family_members(
    engine: &dyn NumerologyEngine,
    entries: &[RosterEntry],
) -> pds_core::Result<Vec<Member>> {
    entries
        .iter()
        .map(|e| {
            let chart = engine.chart(e.birth_date, &e.english_name)?;
            Ok(Member::from_chart(e.name.clone(), &chart))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pds_core::{
        Chart, DiamondChart, FamilyReport, FixedClock, PdsEngine, PdsError, TriangleParams,
        analyze,
    };

    fn date(s: &str) -> Date {
        Date::parse(s).unwrap()
    }

    fn profile(name: &str, category: &str) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            owner: "u1".into(),
            name: name.into(),
            english_name: String::new(),
            birth_date: date("1990-01-01"),
            category: category.into(),
            created_at: String::new(),
        }
    }

    /// Test double: every chart gets the same triangle parameters.
    struct StubEngine {
        params: TriangleParams,
    }

    impl NumerologyEngine for StubEngine {
        fn today(&self) -> Date {
            date("2026-01-01")
        }

        fn chart(&self, birth: Date, latin_name: &str) -> pds_core::Result<Chart> {
            let real = PdsEngine::with_clock(FixedClock(self.today()));
            let mut chart = real.chart(birth, latin_name)?;
            chart.params = self.params;
            Ok(chart)
        }

        fn diamond(&self, birth: Date) -> DiamondChart {
            DiamondChart::compute(birth, false)
        }

        fn family(&self, members: &[Member]) -> pds_core::Result<FamilyReport> {
            if members.is_empty() {
                return Err(PdsError::invalid("empty"));
            }
            analyze(members)
        }
    }

    #[test]
    fn test_self_entry_fallbacks() {
        let entry = self_entry(None, "joe");
        assert_eq!(entry.id, EntryId::Me);
        assert_eq!(entry.name, "joe");
        assert_eq!(entry.birth_date, date("1990-01-01"));
        assert_eq!(entry.category, SELF_CATEGORY);

        let account = Account {
            user_id: "joe".into(),
            full_name: "Joe Chen".into(),
            english_name: "Chen Chiao".into(),
            birth_date: Some(date("1970-05-06")),
        };
        let entry = self_entry(Some(&account), "joe");
        assert_eq!(entry.name, "Joe Chen");
        assert_eq!(entry.english_name, "Chen Chiao");
        assert_eq!(entry.birth_date, date("1970-05-06"));
    }

    #[test]
    fn test_tab_order() {
        let profiles = vec![
            profile("Ann", "Friends"),
            profile("Bo", "Family"),
            profile("Cy", "Classmates"),
            profile("Di", "Book club"),
            profile("Ed", ""),
        ];
        let all = entries(None, "me", &profiles);
        let tabs = group_by_category(&all);
        let names: Vec<_> = tabs.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "All",
                "Self",
                "Family",
                "Friends",
                "Book club",
                "Classmates",
                UNCATEGORIZED
            ]
        );
        assert_eq!(tabs[0].entries.len(), 6);
        assert_eq!(tabs[2].entries[0].name, "Bo");
    }

    #[test]
    fn test_category_options() {
        let configured: Vec<String> = DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect();
        let existing = vec!["Classmates".to_string(), "Family".to_string(), " ".to_string()];
        let options = category_options(&configured, &existing);
        assert_eq!(
            options,
            vec!["Classmates", "Clients", "Colleagues", "Family", "Friends", UNCATEGORIZED]
        );
    }

    #[test]
    fn test_life_path_badge() {
        let entry = self_entry(None, "me");
        assert_eq!(entry.life_path_number(), 3);
    }

    #[test]
    fn test_family_members_use_the_given_engine() {
        let stub = StubEngine {
            params: TriangleParams {
                O: 7,
                M: 1,
                N: 1,
                I: 1,
                J: 1,
                K: 1,
                L: 1,
            },
        };
        let all = entries(None, "me", &[profile("Ann", "Family")]);
        let members = family_members(&stub, &all).unwrap();
        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|m| m.params.O == 7));

        let report = stub.family(&members).unwrap();
        assert_eq!(report.tips[0].to, "Ann");
        assert_eq!(report.tips[0].kind, pds_core::Relationship::Mirror);
    }
}
