use std::path::Path;

use pds_core::Date;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::schema;

pub const UNCATEGORIZED: &str = "Uncategorized";

/// The signed-in user's own record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub user_id: String,
    pub full_name: String,
    pub english_name: String,
    pub birth_date: Option<Date>,
}

/// A saved family/friend chart subject.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub owner: String,
    pub name: String,
    pub english_name: String,
    pub birth_date: Date,
    pub category: String,
    pub created_at: String,
}

/// Fields supplied when creating or editing a profile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInput {
    pub name: String,
    #[serde(default)]
    pub english_name: String,
    pub birth_date: Option<Date>,
    #[serde(default)]
    pub category: Option<String>,
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        tracing::info!("opened store at {}", path.display());
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // --- Accounts ---

    pub fn account(&self, user_id: &str) -> Result<Option<Account>> {
        let row = self
            .conn
            .query_row(
                "SELECT user_id, full_name, english_name, birth_date FROM accounts WHERE user_id = ?1",
                [user_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((user_id, full_name, english_name, birth_date)) = row else {
            return Ok(None);
        };
        let birth_date = birth_date.as_deref().map(parse_date).transpose()?;
        Ok(Some(Account {
            user_id,
            full_name,
            english_name,
            birth_date,
        }))
    }

    /// Insert or replace the account keyed by `user_id`.
    pub fn upsert_account(&self, account: &Account) -> Result<()> {
        if account.user_id.trim().is_empty() {
            return Err(StoreError::InvalidData("user id must not be empty".into()));
        }
        if let Some(date) = account.birth_date {
            validate_birth(date)?;
        }
        self.conn.execute(
            "INSERT INTO accounts (user_id, full_name, english_name, birth_date)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id) DO UPDATE SET
                full_name = excluded.full_name,
                english_name = excluded.english_name,
                birth_date = excluded.birth_date,
                updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')",
            params![
                account.user_id,
                account.full_name,
                account.english_name,
                account.birth_date.map(|d| d.to_string()),
            ],
        )?;
        tracing::debug!("upserted account {}", account.user_id);
        Ok(())
    }

    // --- Profiles ---

    pub fn add_profile(&self, owner: &str, input: &ProfileInput) -> Result<Profile> {
        let (name, birth_date, category) = validate_input(input)?;
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO profiles (id, owner, name, english_name, birth_date, category)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id.to_string(),
                owner,
                name,
                input.english_name.trim(),
                birth_date.to_string(),
                category,
            ],
        )?;
        tracing::info!("added profile {id} for {owner}");
        self.profile(id)?
            .ok_or_else(|| StoreError::NotFound(format!("profile {id}")))
    }

    pub fn update_profile(&self, id: Uuid, input: &ProfileInput) -> Result<Profile> {
        let (name, birth_date, category) = validate_input(input)?;
        let changed = self.conn.execute(
            "UPDATE profiles SET name = ?2, english_name = ?3, birth_date = ?4, category = ?5
             WHERE id = ?1",
            params![
                id.to_string(),
                name,
                input.english_name.trim(),
                birth_date.to_string(),
                category,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("profile {id}")));
        }
        tracing::info!("updated profile {id}");
        self.profile(id)?
            .ok_or_else(|| StoreError::NotFound(format!("profile {id}")))
    }

    pub fn delete_profile(&self, id: Uuid) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM profiles WHERE id = ?1", [id.to_string()])?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("profile {id}")));
        }
        tracing::info!("deleted profile {id}");
        Ok(())
    }

    pub fn profile(&self, id: Uuid) -> Result<Option<Profile>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, owner, name, english_name, birth_date, category, created_at
                 FROM profiles WHERE id = ?1",
                [id.to_string()],
                profile_row,
            )
            .optional()?;
        row.map(ProfileRow::into_profile).transpose()
    }

    /// All of an owner's profiles, newest first.
    pub fn list_profiles(&self, owner: &str) -> Result<Vec<Profile>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner, name, english_name, birth_date, category, created_at
             FROM profiles WHERE owner = ?1
             ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows: Vec<ProfileRow> = stmt
            .query_map([owner], profile_row)?
            .collect::<std::result::Result<_, _>>()?;
        rows.into_iter().map(ProfileRow::into_profile).collect()
    }

    /// Distinct categories in use by an owner, sorted.
    pub fn categories(&self, owner: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT category FROM profiles WHERE owner = ?1 ORDER BY category",
        )?;
        let cats = stmt
            .query_map([owner], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<_, _>>()?;
        Ok(cats)
    }
}

struct ProfileRow {
    id: String,
    owner: String,
    name: String,
    english_name: String,
    birth_date: String,
    category: String,
    created_at: String,
}

fn profile_row(row: &Row<'_>) -> rusqlite::Result<ProfileRow> {
    Ok(ProfileRow {
        id: row.get(0)?,
        owner: row.get(1)?,
        name: row.get(2)?,
        english_name: row.get(3)?,
        birth_date: row.get(4)?,
        category: row.get(5)?,
        created_at: row.get(6)?,
    })
}

impl ProfileRow {
    fn into_profile(self) -> Result<Profile> {
        Ok(Profile {
            id: parse_uuid(&self.id)?,
            owner: self.owner,
            name: self.name,
            english_name: self.english_name,
            birth_date: parse_date(&self.birth_date)?,
            category: self.category,
            created_at: self.created_at,
        })
    }
}

fn validate_input(input: &ProfileInput) -> Result<(&str, Date, String)> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(StoreError::InvalidData("profile name must not be empty".into()));
    }
    let birth_date = input
        .birth_date
        .ok_or_else(|| StoreError::InvalidData("profile birth date is required".into()))?;
    validate_birth(birth_date)?;
    Ok((name, birth_date, normalize_category(input.category.as_deref())))
}

fn validate_birth(date: Date) -> Result<()> {
    Date::birth(date.year(), date.month(), date.day())?;
    Ok(())
}

/// Blank or missing categories collapse to [`UNCATEGORIZED`].
pub fn normalize_category(category: Option<&str>) -> String {
    match category.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => UNCATEGORIZED.to_string(),
    }
}

pub(crate) fn parse_date(s: &str) -> Result<Date> {
    Date::parse(s).map_err(|e| StoreError::InvalidData(format!("bad date '{s}': {e}")))
}

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| StoreError::InvalidData(format!("bad UUID '{s}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, date: &str, category: Option<&str>) -> ProfileInput {
        ProfileInput {
            name: name.to_string(),
            english_name: String::new(),
            birth_date: Some(Date::parse(date).unwrap()),
            category: category.map(str::to_string),
        }
    }

    #[test]
    fn test_account_upsert() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.account("u1").unwrap().is_none());

        let mut account = Account {
            user_id: "u1".into(),
            full_name: "Chen Da Wen".into(),
            english_name: String::new(),
            birth_date: None,
        };
        store.upsert_account(&account).unwrap();
        assert_eq!(store.account("u1").unwrap().unwrap().birth_date, None);

        account.english_name = "Chen Ta Wen".into();
        account.birth_date = Some(Date::parse("1990-01-01").unwrap());
        store.upsert_account(&account).unwrap();
        assert_eq!(store.account("u1").unwrap().unwrap(), account);
    }

    #[test]
    fn test_account_rejects_pre_1900_birth() {
        let store = Store::open_in_memory().unwrap();
        let account = Account {
            user_id: "u1".into(),
            full_name: String::new(),
            english_name: String::new(),
            birth_date: Some(Date::parse("1850-05-05").unwrap()),
        };
        assert!(matches!(
            store.upsert_account(&account),
            Err(StoreError::Core(_))
        ));
    }

    #[test]
    fn test_profile_crud() {
        let store = Store::open_in_memory().unwrap();
        let p = store
            .add_profile("u1", &input("  Ann ", "1990-01-01", Some("Family")))
            .unwrap();
        assert_eq!(p.name, "Ann");
        assert_eq!(p.category, "Family");
        assert_eq!(store.profile(p.id).unwrap().unwrap(), p);

        let edited = store
            .update_profile(p.id, &input("Ann Lee", "1991-02-03", None))
            .unwrap();
        assert_eq!(edited.name, "Ann Lee");
        assert_eq!(edited.category, UNCATEGORIZED);
        assert_eq!(edited.birth_date.to_string(), "1991-02-03");

        store.delete_profile(p.id).unwrap();
        assert!(store.profile(p.id).unwrap().is_none());
    }

    #[test]
    fn test_unknown_profile_is_not_found() {
        let store = Store::open_in_memory().unwrap();
        let id = Uuid::new_v4();
        assert!(matches!(
            store.update_profile(id, &input("Ann", "1990-01-01", None)),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_profile(id),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_profile_validation() {
        let store = Store::open_in_memory().unwrap();
        assert!(matches!(
            store.add_profile("u1", &input("   ", "1990-01-01", None)),
            Err(StoreError::InvalidData(_))
        ));
        let no_date = ProfileInput {
            name: "Ann".into(),
            ..Default::default()
        };
        assert!(matches!(
            store.add_profile("u1", &no_date),
            Err(StoreError::InvalidData(_))
        ));
    }

    #[test]
    fn test_list_is_per_owner_and_newest_first() {
        let store = Store::open_in_memory().unwrap();
        store.add_profile("u1", &input("Ann", "1990-01-01", None)).unwrap();
        store.add_profile("u1", &input("Bo", "1991-01-01", Some("Friends"))).unwrap();
        store.add_profile("u2", &input("Cy", "1992-01-01", None)).unwrap();

        let names: Vec<_> = store
            .list_profiles("u1")
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Bo", "Ann"]);
        assert_eq!(store.list_profiles("u2").unwrap().len(), 1);
        assert_eq!(
            store.categories("u1").unwrap(),
            vec!["Friends".to_string(), UNCATEGORIZED.to_string()]
        );
    }

    #[test]
    fn test_corrupt_birth_date_is_invalid_data() {
        let store = Store::open_in_memory().unwrap();
        let id = Uuid::new_v4();
        store
            .conn()
            .execute(
                "INSERT INTO profiles (id, owner, name, birth_date) VALUES (?1, 'u1', 'Ann', '1990-02-30')",
                [id.to_string()],
            )
            .unwrap();
        assert!(matches!(
            store.list_profiles("u1"),
            Err(StoreError::InvalidData(_))
        ));
    }
}
