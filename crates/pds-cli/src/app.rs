//! Request handling shared by the CLI, the MCP server and the HTTP API.

use std::fmt;

use pds_core::{
    Chart, Clock, DECK, Date, DiamondChart, FamilyReport, Member, NumerologyEngine, PdsEngine,
    PdsError, SystemClock,
};
use pds_store::draw::HISTORY_DAYS;
use pds_store::roster::{self, EntryId, RosterEntry, Tab};
use pds_store::{Account, DataDir, Draw, Profile, ProfileInput, StoreError};
use rand::Rng;
use rand::seq::IndexedRandom;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug)]
pub enum AppError {
    InvalidInput(String),
    NotFound(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidInput(msg) => write!(f, "{msg}"),
            AppError::NotFound(what) => write!(f, "not found: {what}"),
            AppError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<PdsError> for AppError {
    fn from(e: PdsError) -> Self {
        AppError::InvalidInput(e.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => AppError::NotFound(what),
            StoreError::InvalidData(msg) => AppError::InvalidInput(msg),
            StoreError::Core(e) => e.into(),
            other => AppError::Internal(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

// --- Request types ---

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ChartRequest {
    /// Birth date as YYYY-MM-DD (1900 or later)
    pub birth_date: String,
    /// Latin-letter name for soul, persona and destiny numbers
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DiamondRequest {
    /// Birth date as YYYY-MM-DD (1900 or later)
    pub birth_date: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct MemberRequest {
    /// Display name used in relationship tips
    pub name: String,
    /// Birth date as YYYY-MM-DD
    pub birth_date: String,
    #[serde(default)]
    pub latin_name: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct FamilyRequest {
    /// Members to compare; the first is the reference. When empty, the
    /// user's own entry and saved roster are used instead.
    #[serde(default)]
    pub members: Vec<MemberRequest>,
    /// Roster owner (defaults to the configured user)
    #[serde(default)]
    pub user: Option<String>,
    /// Restrict the roster to one category
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ProfilesRequest {
    /// Roster owner (defaults to the configured user)
    #[serde(default)]
    pub user: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfilesView {
    pub user: String,
    pub tabs: Vec<Tab>,
    /// Categories to offer when adding a profile.
    pub categories: Vec<String>,
}

/// Today's card, and whether this call is what drew it.
#[derive(Debug, Serialize)]
pub struct DrawOutcome {
    pub draw: Draw,
    pub fresh: bool,
}

/// The data directory plus the engine every computation goes through.
pub struct App {
    data: DataDir,
    engine: Box<dyn NumerologyEngine + Send>,
}

impl App {
    /// System clock in the configured UTC offset, with `keep_master` taken
    /// from config.
    pub fn new(data: DataDir) -> Self {
        let clock = SystemClock::with_offset(data.config().chart.utc_offset_minutes);
        Self::with_clock(data, clock)
    }

    pub fn with_clock<C: Clock + Send + 'static>(data: DataDir, clock: C) -> Self {
        let keep_master = data.config().chart.keep_master;
        Self::with_engine(
            data,
            Box::new(PdsEngine::with_clock(clock).keep_master(keep_master)),
        )
    }

    pub fn with_engine(data: DataDir, engine: Box<dyn NumerologyEngine + Send>) -> Self {
        Self { data, engine }
    }

    pub fn data(&self) -> &DataDir {
        &self.data
    }

    /// `requested` when non-blank, else the configured default user.
    pub fn user(&self, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(&self.data.config().default_user)
            .to_string()
    }

    pub fn today(&self) -> Date {
        self.engine.today()
    }

    /// A birth date that is neither before 1900 nor after today.
    pub fn check_birth(&self, date: Date) -> Result<Date> {
        let birth = Date::birth(date.year(), date.month(), date.day())?;
        let today = self.today();
        if birth > today {
            return Err(AppError::InvalidInput(format!(
                "birth date {birth} is after today ({today})"
            )));
        }
        Ok(birth)
    }

    pub fn save_account(&self, account: &Account) -> Result<()> {
        if let Some(date) = account.birth_date {
            self.check_birth(date)?;
        }
        Ok(self.data.store().upsert_account(account)?)
    }

    pub fn add_profile(&self, user: &str, input: &ProfileInput) -> Result<Profile> {
        if let Some(date) = input.birth_date {
            self.check_birth(date)?;
        }
        Ok(self.data.store().add_profile(user, input)?)
    }

    pub fn update_profile(&self, id: Uuid, input: &ProfileInput) -> Result<Profile> {
        if let Some(date) = input.birth_date {
            self.check_birth(date)?;
        }
        Ok(self.data.store().update_profile(id, input)?)
    }

    pub fn chart(&self, req: &ChartRequest) -> Result<Chart> {
        let birth = Date::parse_birth(&req.birth_date)?;
        Ok(self.engine.chart(birth, req.name.as_deref().unwrap_or(""))?)
    }

    pub fn diamond(&self, req: &DiamondRequest) -> Result<DiamondChart> {
        let birth = Date::parse_birth(&req.birth_date)?;
        Ok(self.engine.diamond(birth))
    }

    pub fn family(&self, req: &FamilyRequest) -> Result<FamilyReport> {
        let members = if req.members.is_empty() {
            let user = self.user(req.user.as_deref());
            let entries = self.roster(&user, req.category.as_deref())?;
            tracing::debug!("family analysis over {} roster entries", entries.len());
            roster::family_members(&*self.engine, &entries)?
        } else {
            req.members
                .iter()
                .map(|m| -> Result<Member> {
                    let birth = Date::parse_birth(&m.birth_date)?;
                    let chart = self
                        .engine
                        .chart(birth, m.latin_name.as_deref().unwrap_or(""))?;
                    Ok(Member::from_chart(m.name.clone(), &chart))
                })
                .collect::<Result<Vec<_>>>()?
        };
        Ok(self.engine.family(&members)?)
    }

    /// Self first, then saved profiles newest first. A category filter
    /// never drops the self entry.
    pub fn roster(&self, user: &str, category: Option<&str>) -> Result<Vec<RosterEntry>> {
        let store = self.data.store();
        let account = store.account(user)?;
        let profiles = store.list_profiles(user)?;
        let mut all = roster::entries(account.as_ref(), user, &profiles);
        if let Some(category) = category.map(str::trim).filter(|c| !c.is_empty()) {
            all.retain(|e| e.id == EntryId::Me || e.category == category);
        }
        Ok(all)
    }

    pub fn profiles(&self, req: &ProfilesRequest) -> Result<ProfilesView> {
        let user = self.user(req.user.as_deref());
        let entries = self.roster(&user, None)?;
        let in_use = self.data.store().categories(&user)?;
        Ok(ProfilesView {
            tabs: roster::group_by_category(&entries),
            categories: roster::category_options(&self.data.config().roster.categories, &in_use),
            user,
        })
    }

    /// The user's draw for today, drawing a card with `rng` if there is
    /// none yet.
    pub fn draw<R: Rng + ?Sized>(&self, user: &str, rng: &mut R) -> Result<DrawOutcome> {
        let store = self.data.store();
        let today = self.today();
        if let Some(draw) = store.draw_on(user, today)? {
            return Ok(DrawOutcome { draw, fresh: false });
        }
        let card = DECK
            .choose(rng)
            .ok_or_else(|| AppError::Internal("the card deck is empty".into()))?;
        let draw = store.save_draw(user, today, card)?;
        tracing::debug!("{user} drew '{}' on {today}", draw.title);
        Ok(DrawOutcome { draw, fresh: true })
    }

    /// The past week of draws, latest first.
    pub fn draw_history(&self, user: &str) -> Result<Vec<Draw>> {
        Ok(self.data.store().draw_history(user, HISTORY_DAYS)?)
    }
}
