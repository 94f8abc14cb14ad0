//! Request and response value objects for catalog queries.
//!
//! None of these are persisted. Field names are camelCase on the wire so a
//! browse request can be deserialized straight from a JSON payload.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::field::{FieldValue, GameField, UnknownField};
use crate::types::Game;

// ── Filter ──────────────────────────────────────────────────────────────────

/// One `field = value` style term of a filter.
///
/// `field` stays a plain string until the predicate builder resolves it, so a
/// request naming an unknown column is reported instead of dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldTerm {
    pub field: String,
    pub value: FieldValue,
}

impl FieldTerm {
    pub fn new(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Search intent: field terms and free-text phrases to include or exclude.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    pub whitelist: Vec<FieldTerm>,
    pub blacklist: Vec<FieldTerm>,
    /// Phrases that must appear in title, alternate titles, developer or publisher.
    pub generic_whitelist: Vec<String>,
    /// Phrases that must not appear in any of those columns.
    pub generic_blacklist: Vec<String>,
    /// Restrict to members of this playlist, ordered by their position.
    pub playlist_id: Option<String>,
}

impl FilterSpec {
    pub fn with_whitelist(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.whitelist.push(FieldTerm::new(field, value));
        self
    }

    pub fn with_blacklist(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.blacklist.push(FieldTerm::new(field, value));
        self
    }

    pub fn with_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.generic_whitelist.push(phrase.into());
        self
    }

    pub fn without_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.generic_blacklist.push(phrase.into());
        self
    }

    pub fn in_playlist(mut self, playlist_id: impl Into<String>) -> Self {
        self.playlist_id = Some(playlist_id.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.whitelist.is_empty()
            && self.blacklist.is_empty()
            && self.generic_whitelist.is_empty()
            && self.generic_blacklist.is_empty()
            && self.playlist_id.is_none()
    }
}

// ── Order ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for OrderDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            other => Err(format!("invalid order direction '{other}' (expected ASC or DESC)")),
        }
    }
}

/// Order key for a game listing. `id` is always the tiebreak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderSpec {
    pub field: GameField,
    pub direction: OrderDirection,
}

impl OrderSpec {
    pub fn new(field: GameField, direction: OrderDirection) -> Self {
        Self { field, direction }
    }

    pub fn asc(field: GameField) -> Self {
        Self::new(field, OrderDirection::Asc)
    }

    pub fn desc(field: GameField) -> Self {
        Self::new(field, OrderDirection::Desc)
    }

    /// Resolve a request-supplied field name.
    pub fn parse(field: &str, direction: OrderDirection) -> Result<Self, UnknownField> {
        Ok(Self::new(field.parse()?, direction))
    }
}

impl Default for OrderSpec {
    fn default() -> Self {
        Self::asc(GameField::Id)
    }
}

// ── Cursor / Page Index ─────────────────────────────────────────────────────

/// Resume point of a keyset query: the order value and id of the last row seen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub order_val: FieldValue,
    pub id: String,
}

impl Cursor {
    pub fn new(order_val: impl Into<FieldValue>, id: impl Into<String>) -> Self {
        Self {
            order_val: order_val.into(),
            id: id.into(),
        }
    }

    /// The cursor positioned on `game` under an ordering by `field`.
    pub fn for_game(game: &Game, field: GameField) -> Self {
        Self {
            order_val: field.value_of(game),
            id: game.id.clone(),
        }
    }
}

/// Jump-to-page index for one filter + order + page size.
///
/// Entry `k` is the cursor of the last row of page `k`; resuming after it
/// yields page `k + 1`. Only full pages have an entry, so a trailing short
/// page has none, while a result that fills its last page exactly gets an
/// entry for it too. Use [`PageIndex::page_count`] for the real page count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageIndex {
    pages: BTreeMap<u32, Cursor>,
}

impl PageIndex {
    /// Build an index from boundary cursors in order (page 1's boundary first).
    pub fn from_boundaries(boundaries: impl IntoIterator<Item = Cursor>) -> Self {
        let pages = (1u32..).zip(boundaries).collect();
        Self { pages }
    }

    /// Boundary cursor that closes `page`.
    pub fn get(&self, page: u32) -> Option<&Cursor> {
        self.pages.get(&page)
    }

    /// Cursor to resume from in order to read `page`.
    ///
    /// Page 1 (and page 0) start at the beginning, so they return `None`; so
    /// does any page past the end of the index.
    pub fn resume_cursor(&self, page: u32) -> Option<&Cursor> {
        page.checked_sub(1).and_then(|prev| self.pages.get(&prev))
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Pages needed to show `rows` rows at `page_size`. An empty result still
    /// has page 1.
    pub fn page_count(rows: u64, page_size: u32) -> u32 {
        let size = u64::from(page_size.max(1));
        u32::try_from(rows.div_ceil(size)).unwrap_or(u32::MAX).max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Cursor)> {
        self.pages.iter().map(|(k, v)| (*k, v))
    }
}

// ── Request ─────────────────────────────────────────────────────────────────

/// A browse request as received from the transport layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameQuery {
    pub filter: Option<FilterSpec>,
    pub order_by: Option<String>,
    pub order_direction: Option<OrderDirection>,
    /// Legacy row offset. Ignored when `cursor` is set.
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    /// Return [`crate::ViewGame`] rows instead of full games.
    pub shallow: bool,
    /// Also count every row matching the filter.
    pub get_total: bool,
    pub cursor: Option<Cursor>,
}

impl GameQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn ordered_by(mut self, order: OrderSpec) -> Self {
        self.order_by = Some(order.field.name().to_string());
        self.order_direction = Some(order.direction);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn after(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn shallow(mut self) -> Self {
        self.shallow = true;
        self
    }

    pub fn with_total(mut self) -> Self {
        self.get_total = true;
        self
    }

    /// The validated order key; id ascending when none was requested.
    pub fn order_spec(&self) -> Result<OrderSpec, UnknownField> {
        let direction = self.order_direction.unwrap_or_default();
        match &self.order_by {
            Some(name) => OrderSpec::parse(name, direction),
            None => Ok(OrderSpec::new(GameField::Id, direction)),
        }
    }
}
