use pds_core::{Card, Date};
use rusqlite::{OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::store::{Store, parse_date, parse_uuid};

/// Default window for [`Store::draw_history`]: one week of draws.
pub const HISTORY_DAYS: usize = 7;

/// A stored card draw. At most one exists per owner and day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    pub id: Uuid,
    pub owner: String,
    pub draw_date: Date,
    pub title: String,
    pub poem: String,
    pub guidance: String,
    pub image_url: String,
    pub created_at: String,
}

impl Store {
    pub fn draw_on(&self, owner: &str, date: Date) -> Result<Option<Draw>> {
        let row = self
            .conn()
            .query_row(
                "SELECT id, owner, draw_date, title, poem, guidance, image_url, created_at
                 FROM daily_draws WHERE owner = ?1 AND draw_date = ?2",
                params![owner, date.to_string()],
                draw_row,
            )
            .optional()?;
        row.map(DrawRow::into_draw).transpose()
    }

    /// Record `card` as the owner's draw for `date`. If that day already
    /// has a draw, it is returned unchanged.
    pub fn save_draw(&self, owner: &str, date: Date, card: &Card) -> Result<Draw> {
        let id = Uuid::new_v4();
        let inserted = self.conn().execute(
            "INSERT INTO daily_draws (id, owner, draw_date, title, poem, guidance, image_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(owner, draw_date) DO NOTHING",
            params![
                id.to_string(),
                owner,
                date.to_string(),
                card.title,
                card.poem,
                card.guidance,
                card.image_url,
            ],
        )?;
        if inserted == 0 {
            tracing::debug!("{owner} already drew on {date}");
        } else {
            tracing::info!("saved draw {id} for {owner} on {date}");
        }
        self.draw_on(owner, date)?
            .ok_or_else(|| StoreError::NotFound(format!("draw for {owner} on {date}")))
    }

    /// The owner's most recent `limit` draws, latest day first.
    pub fn draw_history(&self, owner: &str, limit: usize) -> Result<Vec<Draw>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, owner, draw_date, title, poem, guidance, image_url, created_at
             FROM daily_draws WHERE owner = ?1
             ORDER BY draw_date DESC LIMIT ?2",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<DrawRow> = stmt
            .query_map(params![owner, limit], draw_row)?
            .collect::<std::result::Result<_, _>>()?;
        rows.into_iter().map(DrawRow::into_draw).collect()
    }
}

struct DrawRow {
    id: String,
    owner: String,
    draw_date: String,
    title: String,
    poem: String,
    guidance: String,
    image_url: String,
    created_at: String,
}

fn draw_row(row: &Row<'_>) -> rusqlite::Result<DrawRow> {
    Ok(DrawRow {
        id: row.get(0)?,
        owner: row.get(1)?,
        draw_date: row.get(2)?,
        title: row.get(3)?,
        poem: row.get(4)?,
        guidance: row.get(5)?,
        image_url: row.get(6)?,
        created_at: row.get(7)?,
    })
}

impl DrawRow {
    fn into_draw(self) -> Result<Draw> {
        Ok(Draw {
            id: parse_uuid(&self.id)?,
            owner: self.owner,
            draw_date: parse_date(&self.draw_date)?,
            title: self.title,
            poem: self.poem,
            guidance: self.guidance,
            image_url: self.image_url,
            created_at: self.created_at,
        })
    }
}
