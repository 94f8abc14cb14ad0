//! Keyset-paginated game listings.
//!
//! Pages are addressed by the `(order value, id)` of the last row seen. The
//! legacy numeric offset still works when no cursor is given.

use std::time::Instant;

use arcadia_catalog::{Cursor, FilterSpec, Game, GameQuery, OrderSpec, ViewGame};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use serde::Serialize;

use crate::operations::OperationError;
use crate::plan::SelectPlan;
use crate::queries::{
    attach_add_apps, row_to_game, row_to_view, GAME_COLUMNS, GAME_COLUMN_COUNT, VIEW_COLUMNS,
    VIEW_COLUMN_COUNT,
};

/// Rows of one page: full games, or list-view rows for shallow queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GameRows {
    Full(Vec<Game>),
    Shallow(Vec<ViewGame>),
}

impl GameRows {
    pub fn len(&self) -> usize {
        match self {
            GameRows::Full(games) => games.len(),
            GameRows::Shallow(games) => games.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> Vec<&str> {
        match self {
            GameRows::Full(games) => games.iter().map(|g| g.id.as_str()).collect(),
            GameRows::Shallow(games) => games.iter().map(|g| g.id.as_str()).collect(),
        }
    }

    pub fn into_full(self) -> Option<Vec<Game>> {
        match self {
            GameRows::Full(games) => Some(games),
            GameRows::Shallow(_) => None,
        }
    }

    pub fn into_shallow(self) -> Option<Vec<ViewGame>> {
        match self {
            GameRows::Shallow(games) => Some(games),
            GameRows::Full(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResults {
    pub games: GameRows,
    /// Rows matching the filter (and cursor), ignoring limit and offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    /// Cursor of the last returned row, when a full page came back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
}

/// Run one browse request.
pub fn find_games(conn: &Connection, query: &GameQuery) -> Result<GameResults, OperationError> {
    let start = Instant::now();
    let order = query.order_spec()?;
    let mut plan = SelectPlan::new(query.filter.as_ref(), &order)?;

    let offset = match &query.cursor {
        Some(cursor) => {
            plan.push_cursor(cursor)?;
            if let Some(offset) = query.offset.filter(|o| *o > 0) {
                log::debug!("Cursor given, ignoring offset {}", offset);
            }
            0
        }
        None => query.offset.unwrap_or(0),
    };

    let total = if query.get_total {
        let count = count_rows(conn, &plan)?;
        log::debug!("{}ms for query total", start.elapsed().as_millis());
        Some(count)
    } else {
        None
    };

    let projection = if query.shallow { VIEW_COLUMNS } else { GAME_COLUMNS };
    let mut sql = format!("SELECT {projection}, {} AS order_val", plan.order.column);
    let mut params = Vec::new();
    plan.render_from_where(&mut sql, &mut params);
    sql.push(' ');
    sql.push_str(&plan.order_by_sql());
    if query.limit.is_some() || offset > 0 {
        // SQLite needs a LIMIT before OFFSET; -1 means unbounded.
        sql.push_str(" LIMIT ? OFFSET ?");
        params.push(Value::Integer(query.limit.map_or(-1, clamp_i64)));
        params.push(Value::Integer(clamp_i64(offset)));
    }

    let key = plan.order;
    let mut stmt = conn.prepare(&sql)?;
    let (games, last) = if query.shallow {
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                Ok((row_to_view(row)?, row.get::<_, Value>(VIEW_COLUMN_COUNT)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let last = rows
            .last()
            .map(|(game, val)| key.cursor(val.clone(), game.id.clone()));
        let games = rows.into_iter().map(|(game, _)| game).collect();
        (GameRows::Shallow(games), last)
    } else {
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                Ok((row_to_game(row)?, row.get::<_, Value>(GAME_COLUMN_COUNT)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let last = rows
            .last()
            .map(|(game, val)| key.cursor(val.clone(), game.id.clone()));
        let mut games: Vec<Game> = rows.into_iter().map(|(game, _)| game).collect();
        attach_add_apps(conn, &mut games)?;
        (GameRows::Full(games), last)
    };

    let next_cursor = match query.limit {
        Some(limit) if limit > 0 && games.len() as u64 == limit => last,
        _ => None,
    };

    log::debug!(
        "{}ms for query ({} rows)",
        start.elapsed().as_millis(),
        games.len()
    );
    Ok(GameResults {
        games,
        total,
        next_cursor,
    })
}

/// 1-based position of a game within a filtered, ordered listing.
///
/// `None` when the game does not match the filter.
pub fn find_game_row(
    conn: &Connection,
    game_id: &str,
    filter: &FilterSpec,
    order: &OrderSpec,
) -> Result<Option<i64>, OperationError> {
    let start = Instant::now();
    let plan = SelectPlan::new(Some(filter), order)?;

    let mut params = Vec::new();
    let mut inner = format!("SELECT game.id AS id, {} AS rn", plan.row_number_sql());
    plan.render_from_where(&mut inner, &mut params);
    let sql = format!("SELECT rn FROM ({inner}) WHERE id = ?");
    params.push(Value::Text(game_id.to_string()));

    let row = conn
        .query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))
        .optional()?;
    log::debug!("{}ms for game row lookup", start.elapsed().as_millis());
    Ok(row)
}

fn count_rows(conn: &Connection, plan: &SelectPlan) -> Result<i64, OperationError> {
    let mut sql = String::from("SELECT COUNT(*)");
    let mut params = Vec::new();
    plan.render_from_where(&mut sql, &mut params);
    let count = conn.query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))?;
    Ok(count)
}

fn clamp_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
