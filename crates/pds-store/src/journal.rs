use std::fmt;
use std::str::FromStr;

use rusqlite::{OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::store::{Store, parse_uuid};

/// Shown for entries saved without an emoji.
pub const DEFAULT_EMOJI: &str = "📝";

/// The tone of a journal entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[default]
    Good,
    Bad,
    Neutral,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Bad => "bad",
            Self::Neutral => "neutral",
        }
    }

    /// Unknown stored values read back as [`Mood::Neutral`].
    pub fn from_str_lossy(s: &str) -> Self {
        s.parse().unwrap_or(Self::Neutral)
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "good" => Ok(Self::Good),
            "bad" => Ok(Self::Bad),
            "neutral" => Ok(Self::Neutral),
            other => Err(format!("unknown mood '{other}' (expected good, bad or neutral)")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: Uuid,
    pub owner: String,
    pub content: String,
    pub mood: Mood,
    pub emoji: String,
    pub created_at: String,
    pub updated_at: String,
}

impl JournalEntry {
    /// First 50 characters on one line, with `...` when cut.
    pub fn preview(&self) -> String {
        let flat = self.content.replace('\n', " ");
        if flat.chars().count() > 50 {
            format!("{}...", flat.chars().take(50).collect::<String>())
        } else {
            flat
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalInput {
    pub content: String,
    #[serde(default)]
    pub mood: Mood,
    #[serde(default)]
    pub emoji: String,
}

impl Store {
    pub fn add_journal(&self, owner: &str, input: &JournalInput) -> Result<JournalEntry> {
        let (content, emoji) = validate_journal(input)?;
        let id = Uuid::new_v4();
        self.conn().execute(
            "INSERT INTO journal_entries (id, owner, content, mood, emoji)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id.to_string(), owner, content, input.mood.as_str(), emoji],
        )?;
        tracing::info!("added journal entry {id} for {owner}");
        self.journal(id)?
            .ok_or_else(|| StoreError::NotFound(format!("journal entry {id}")))
    }

    /// Replace content, mood and emoji. `created_at` is kept.
    pub fn update_journal(&self, id: Uuid, input: &JournalInput) -> Result<JournalEntry> {
        let (content, emoji) = validate_journal(input)?;
        let changed = self.conn().execute(
            "UPDATE journal_entries SET content = ?2, mood = ?3, emoji = ?4,
                updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
             WHERE id = ?1",
            params![id.to_string(), content, input.mood.as_str(), emoji],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("journal entry {id}")));
        }
        tracing::info!("updated journal entry {id}");
        self.journal(id)?
            .ok_or_else(|| StoreError::NotFound(format!("journal entry {id}")))
    }

    pub fn delete_journal(&self, id: Uuid) -> Result<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM journal_entries WHERE id = ?1", [id.to_string()])?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("journal entry {id}")));
        }
        tracing::info!("deleted journal entry {id}");
        Ok(())
    }

    pub fn journal(&self, id: Uuid) -> Result<Option<JournalEntry>> {
        let row = self
            .conn()
            .query_row(
                "SELECT id, owner, content, mood, emoji, created_at, updated_at
                 FROM journal_entries WHERE id = ?1",
                [id.to_string()],
                journal_row,
            )
            .optional()?;
        row.map(JournalRow::into_entry).transpose()
    }

    /// All of an owner's entries, newest first.
    pub fn list_journals(&self, owner: &str) -> Result<Vec<JournalEntry>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, owner, content, mood, emoji, created_at, updated_at
             FROM journal_entries WHERE owner = ?1
             ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows: Vec<JournalRow> = stmt
            .query_map([owner], journal_row)?
            .collect::<std::result::Result<_, _>>()?;
        rows.into_iter().map(JournalRow::into_entry).collect()
    }
}

fn validate_journal(input: &JournalInput) -> Result<(&str, &str)> {
    let content = input.content.trim();
    if content.is_empty() {
        return Err(StoreError::InvalidData("journal content must not be empty".into()));
    }
    let emoji = match input.emoji.trim() {
        "" => DEFAULT_EMOJI,
        e => e,
    };
    Ok((content, emoji))
}

struct JournalRow {
    id: String,
    owner: String,
    content: String,
    mood: String,
    emoji: String,
    created_at: String,
    updated_at: String,
}

fn journal_row(row: &Row<'_>) -> rusqlite::Result<JournalRow> {
    Ok(JournalRow {
        id: row.get(0)?,
        owner: row.get(1)?,
        content: row.get(2)?,
        mood: row.get(3)?,
        emoji: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl JournalRow {
    fn into_entry(self) -> Result<JournalEntry> {
        Ok(JournalEntry {
            id: parse_uuid(&self.id)?,
            owner: self.owner,
            content: self.content,
            mood: Mood::from_str_lossy(&self.mood),
            emoji: self.emoji,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(content: &str, mood: Mood, emoji: &str) -> JournalInput {
        JournalInput {
            content: content.to_string(),
            mood,
            emoji: emoji.to_string(),
        }
    }

    #[test]
    fn test_journal_crud() {
        let store = Store::open_in_memory().unwrap();
        let entry = store
            .add_journal("u1", &input("  calm morning \n", Mood::Good, "😊"))
            .unwrap();
        assert_eq!(entry.content, "calm morning");
        assert_eq!(entry.mood, Mood::Good);
        assert_eq!(entry.emoji, "😊");
        assert_eq!(store.journal(entry.id).unwrap().unwrap(), entry);

        let edited = store
            .update_journal(entry.id, &input("rough afternoon", Mood::Bad, ""))
            .unwrap();
        assert_eq!(edited.content, "rough afternoon");
        assert_eq!(edited.mood, Mood::Bad);
        assert_eq!(edited.emoji, DEFAULT_EMOJI);
        assert_eq!(edited.created_at, entry.created_at);

        store.delete_journal(entry.id).unwrap();
        assert!(store.journal(entry.id).unwrap().is_none());
        assert!(matches!(
            store.delete_journal(entry.id),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_blank_content_is_rejected() {
        let store = Store::open_in_memory().unwrap();
        assert!(matches!(
            store.add_journal("u1", &input(" \n\t", Mood::Good, "")),
            Err(StoreError::InvalidData(_))
        ));
    }

    #[test]
    fn test_list_is_per_owner_and_newest_first() {
        let store = Store::open_in_memory().unwrap();
        store.add_journal("u1", &input("first", Mood::Good, "")).unwrap();
        store.add_journal("u1", &input("second", Mood::Bad, "")).unwrap();
        store.add_journal("u2", &input("other", Mood::Good, "")).unwrap();

        let contents: Vec<_> = store
            .list_journals("u1")
            .unwrap()
            .into_iter()
            .map(|j| j.content)
            .collect();
        assert_eq!(contents, vec!["second", "first"]);
    }

    #[test]
    fn test_unknown_stored_mood_reads_neutral() {
        let store = Store::open_in_memory().unwrap();
        let id = Uuid::new_v4();
        store
            .conn()
            .execute(
                "INSERT INTO journal_entries (id, owner, content, mood) VALUES (?1, 'u1', 'x', 'meh')",
                [id.to_string()],
            )
            .unwrap();
        assert_eq!(store.journal(id).unwrap().unwrap().mood, Mood::Neutral);
    }

    #[test]
    fn test_mood_parsing() {
        assert_eq!("Good".parse::<Mood>().unwrap(), Mood::Good);
        assert_eq!(" bad ".parse::<Mood>().unwrap(), Mood::Bad);
        assert!("great".parse::<Mood>().is_err());
    }

    #[test]
    fn test_preview_flattens_and_truncates() {
        let mut entry = JournalEntry {
            id: Uuid::new_v4(),
            owner: "u1".into(),
            content: "line one\nline two".into(),
            mood: Mood::Good,
            emoji: DEFAULT_EMOJI.into(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert_eq!(entry.preview(), "line one line two");

        entry.content = "字".repeat(60);
        assert_eq!(entry.preview(), format!("{}...", "字".repeat(50)));
    }
}
