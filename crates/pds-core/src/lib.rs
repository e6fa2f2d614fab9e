//! PDS numerology engine.
//!
//! Digit reduction, name values, the natal triangle, composed charts, family
//! dynamics, the pinnacle/challenge diamond chart and the daily guidance
//! deck. Every computation is a pure function of its inputs; the only notion
//! of "now" is an injected [`Clock`].
//!
//! Zero I/O: no opinions about transport or persistence.

pub mod chart;
pub mod constants;
pub mod date;
pub mod deck;
pub mod diamond;
pub mod digits;
pub mod engine;
pub mod error;
pub mod family;
pub mod name;
pub mod triangle;

pub use chart::{Chart, compose_chart};
pub use date::{Clock, Date, FixedClock, SystemClock};
pub use deck::{Card, DECK};
pub use diamond::{AgeRange, DiamondChart, Stage};
pub use digits::{Reduction, digit_sum, reduce, reduce_with, reduction, tradition_path};
pub use engine::{NumerologyEngine, PdsEngine};
pub use error::{PdsError, Result};
pub use family::{FamilyReport, Member, Relationship, RelationshipTip, analyze};
pub use name::{NameValues, Temperament, letter_value, name_values};
pub use triangle::{TriangleChart, TriangleParams};
