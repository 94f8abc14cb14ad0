//! Shared FROM / WHERE / ORDER BY composition for game listings.
//!
//! The keyset paginator, the page-index builder and the row lookup all start
//! from the same [`SelectPlan`], so for one filter and order they agree on
//! which rows exist and in what order.

use arcadia_catalog::{Cursor, FilterSpec, GameField, OrderDirection, OrderSpec};
use rusqlite::types::Value;

use crate::operations::OperationError;
use crate::predicate::{
    apply_filter, from_sql_value, to_sql_value, ColumnRef, CompareOp, Predicate, ValueKind,
    WhereClause, GAME_ALIAS, PLAYLIST_GAME_ALIAS,
};

/// The effective sort key of a listing. `game.id` is always the tiebreak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderKey {
    pub column: ColumnRef,
    pub direction: OrderDirection,
    pub kind: ValueKind,
}

impl OrderKey {
    pub fn for_field(order: &OrderSpec) -> Self {
        Self {
            column: ColumnRef::game(order.field),
            direction: order.direction,
            kind: order.field.kind().into(),
        }
    }

    /// Playlist listings always follow membership position.
    pub fn playlist_position() -> Self {
        Self {
            column: ColumnRef::playlist_position(),
            direction: OrderDirection::Asc,
            kind: ValueKind::Int,
        }
    }

    /// `ORDER BY` body: the key then the id, both in the key's direction.
    pub fn sql(&self) -> String {
        let dir = self.direction.as_sql();
        format!("{} {dir}, {GAME_ALIAS}.id {dir}", self.column)
    }

    /// Predicate selecting rows strictly after `cursor` in this ordering.
    pub fn after(&self, cursor: &Cursor) -> Result<Predicate, OperationError> {
        let op = match self.direction {
            OrderDirection::Asc => CompareOp::Gt,
            OrderDirection::Desc => CompareOp::Lt,
        };
        let order_val = to_sql_value(self.kind, &cursor.order_val, self.column.column)?;
        Ok(Predicate::RowCompare {
            columns: vec![self.column, ColumnRef::game(GameField::Id)],
            op,
            values: vec![order_val, Value::Text(cursor.id.clone())],
        })
    }

    /// Build the cursor for a row from its raw order value and id.
    pub fn cursor(&self, order_val: Value, id: String) -> Cursor {
        Cursor {
            order_val: from_sql_value(self.kind, order_val),
            id,
        }
    }
}

/// A filtered, ordered game selection without projection or bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectPlan {
    pub clause: WhereClause,
    pub playlist_id: Option<String>,
    pub order: OrderKey,
}

impl SelectPlan {
    pub fn new(filter: Option<&FilterSpec>, order: &OrderSpec) -> Result<Self, OperationError> {
        let mut clause = WhereClause::default();
        let mut playlist_id = None;
        let mut key = OrderKey::for_field(order);

        if let Some(filter) = filter {
            apply_filter(&mut clause, filter)?;

            // Playlist scope rides on a join and replaces the requested order.
            if let Some(id) = &filter.playlist_id {
                clause.push(Predicate::Compare {
                    column: ColumnRef::playlist_id(),
                    op: CompareOp::Eq,
                    value: Value::Text(id.clone()),
                });
                playlist_id = Some(id.clone());
                key = OrderKey::playlist_position();
            }
        }

        Ok(Self {
            clause,
            playlist_id,
            order: key,
        })
    }

    /// Restrict the plan to rows strictly after `cursor`.
    pub fn push_cursor(&mut self, cursor: &Cursor) -> Result<(), OperationError> {
        let predicate = self.order.after(cursor)?;
        self.clause.push(predicate);
        Ok(())
    }

    /// FROM body, including the membership join for playlist scope.
    pub fn from_sql(&self) -> String {
        if self.playlist_id.is_some() {
            format!(
                "{GAME_ALIAS} INNER JOIN playlist_game {PLAYLIST_GAME_ALIAS} \
                 ON {PLAYLIST_GAME_ALIAS}.game_id = {GAME_ALIAS}.id"
            )
        } else {
            GAME_ALIAS.to_string()
        }
    }

    pub fn order_by_sql(&self) -> String {
        format!("ORDER BY {}", self.order.sql())
    }

    /// `ROW_NUMBER()` over this plan's ordering.
    pub fn row_number_sql(&self) -> String {
        format!("ROW_NUMBER() OVER (ORDER BY {})", self.order.sql())
    }

    /// `FROM ... [WHERE ...]`, with parameters pushed onto `params`.
    pub fn render_from_where(&self, sql: &mut String, params: &mut Vec<Value>) {
        sql.push_str(" FROM ");
        sql.push_str(&self.from_sql());
        self.clause.render(sql, params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(plan: &SelectPlan) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut params = Vec::new();
        plan.render_from_where(&mut sql, &mut params);
        sql.push(' ');
        sql.push_str(&plan.order_by_sql());
        (sql, params)
    }

    #[test]
    fn descending_cursor_uses_less_than() {
        let mut plan = SelectPlan::new(None, &OrderSpec::desc(GameField::Title)).unwrap();
        plan.push_cursor(&Cursor::new("M", "m1")).unwrap();
        let (sql, params) = render(&plan);
        assert_eq!(
            sql,
            " FROM game WHERE ((game.title, game.id) < (?, ?)) ORDER BY game.title DESC, game.id DESC"
        );
        assert_eq!(
            params,
            vec![Value::Text("M".to_string()), Value::Text("m1".to_string())]
        );
    }

    #[test]
    fn cursor_is_anded_after_filters() {
        let filter = FilterSpec::default().with_whitelist("library", "arcade");
        let mut plan = SelectPlan::new(Some(&filter), &OrderSpec::asc(GameField::Title)).unwrap();
        plan.push_cursor(&Cursor::new("B", "b")).unwrap();
        let (sql, _) = render(&plan);
        assert!(sql.contains("WHERE (game.library = ?) AND ((game.title, game.id) > (?, ?))"));
    }

    #[test]
    fn playlist_scope_joins_and_overrides_order() {
        let filter = FilterSpec::default().in_playlist("favs");
        let plan = SelectPlan::new(Some(&filter), &OrderSpec::desc(GameField::Title)).unwrap();
        let (sql, params) = render(&plan);
        assert_eq!(
            sql,
            " FROM game INNER JOIN playlist_game pg ON pg.game_id = game.id \
             WHERE (pg.playlist_id = ?) ORDER BY pg.position ASC, game.id ASC"
        );
        assert_eq!(params, vec![Value::Text("favs".to_string())]);
    }

    #[test]
    fn bool_order_cursor_coerces_value() {
        let mut plan = SelectPlan::new(None, &OrderSpec::asc(GameField::Extreme)).unwrap();
        plan.push_cursor(&Cursor::new(true, "x")).unwrap();
        let (_, params) = render(&plan);
        assert_eq!(params[0], Value::Integer(1));
    }
}
