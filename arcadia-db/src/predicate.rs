//! Predicate construction for game filters.
//!
//! A [`FilterSpec`] is turned into a small predicate tree which renders to a
//! SQL fragment plus positional parameters. Column names only ever come from
//! the [`GameField`] registry; user input is always bound as a parameter.

use std::fmt;

use arcadia_catalog::{FieldKind, FieldTerm, FieldValue, FilterSpec, GameField};
use rusqlite::types::Value;

use crate::operations::OperationError;

/// The game table; columns are always qualified with it.
pub const GAME_ALIAS: &str = "game";
/// Alias of the playlist membership table when a query is playlist-scoped.
pub const PLAYLIST_GAME_ALIAS: &str = "pg";

/// A qualified column reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: &'static str,
    pub column: &'static str,
}

impl ColumnRef {
    pub fn game(field: GameField) -> Self {
        Self {
            table: GAME_ALIAS,
            column: field.column(),
        }
    }

    pub fn playlist_position() -> Self {
        Self {
            table: PLAYLIST_GAME_ALIAS,
            column: "position",
        }
    }

    pub fn playlist_id() -> Self {
        Self {
            table: PLAYLIST_GAME_ALIAS,
            column: "playlist_id",
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
}

impl CompareOp {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Lt => "<",
        }
    }
}

/// Storage type a value is bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Bool,
    Int,
}

impl From<FieldKind> for ValueKind {
    fn from(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text => Self::Text,
            FieldKind::Bool => Self::Bool,
        }
    }
}

/// Boolean predicate over game rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        column: ColumnRef,
        op: CompareOp,
        value: Value,
    },
    Like {
        column: ColumnRef,
        pattern: String,
        negated: bool,
    },
    /// Row-value comparison, e.g. `(game.title, game.id) > (?, ?)`.
    RowCompare {
        columns: Vec<ColumnRef>,
        op: CompareOp,
        values: Vec<Value>,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    /// Append this predicate's SQL to `sql`, pushing its parameters in textual order.
    pub fn render(&self, sql: &mut String, params: &mut Vec<Value>) {
        match self {
            Self::Compare { column, op, value } => {
                sql.push_str(&format!("{column} {} ?", op.as_sql()));
                params.push(value.clone());
            }
            Self::Like {
                column,
                pattern,
                negated,
            } => {
                let not = if *negated { "NOT " } else { "" };
                sql.push_str(&format!("{column} {not}LIKE ? ESCAPE '\\'"));
                params.push(Value::Text(pattern.clone()));
            }
            Self::RowCompare {
                columns,
                op,
                values,
            } => {
                let cols: Vec<String> = columns.iter().map(ToString::to_string).collect();
                let marks = vec!["?"; values.len()].join(", ");
                sql.push_str(&format!("({}) {} ({marks})", cols.join(", "), op.as_sql()));
                params.extend(values.iter().cloned());
            }
            Self::And(parts) => render_group(parts, " AND ", "1", sql, params),
            Self::Or(parts) => render_group(parts, " OR ", "0", sql, params),
            Self::Not(inner) => {
                sql.push_str("NOT (");
                inner.render(sql, params);
                sql.push(')');
            }
        }
    }
}

fn render_group(
    parts: &[Predicate],
    joiner: &str,
    empty: &str,
    sql: &mut String,
    params: &mut Vec<Value>,
) {
    if parts.is_empty() {
        sql.push_str(empty);
        return;
    }
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            sql.push_str(joiner);
        }
        sql.push('(');
        part.render(sql, params);
        sql.push(')');
    }
}

/// An accumulating WHERE clause.
///
/// The first predicate pushed becomes the base condition and every later one
/// is AND-appended to it, so no push can ever loosen an earlier constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    base: Option<Predicate>,
    and: Vec<Predicate>,
}

impl WhereClause {
    pub fn push(&mut self, predicate: Predicate) {
        if self.base.is_none() {
            self.base = Some(predicate);
        } else {
            self.and.push(predicate);
        }
    }

    pub fn len(&self) -> usize {
        usize::from(self.base.is_some()) + self.and.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_none()
    }

    /// Append ` WHERE ...` to `sql`, or nothing when the clause is empty.
    pub fn render(&self, sql: &mut String, params: &mut Vec<Value>) {
        let Some(base) = &self.base else {
            return;
        };
        sql.push_str(" WHERE (");
        base.render(sql, params);
        sql.push(')');
        for predicate in &self.and {
            sql.push_str(" AND (");
            predicate.render(sql, params);
            sql.push(')');
        }
    }
}

/// Append the predicates for `filter` to `clause`.
///
/// Whitelist field terms go first (they are usually the most selective),
/// then blacklist terms, then free-text phrases. Playlist scoping is not
/// handled here; see [`crate::plan::SelectPlan`].
pub fn apply_filter(clause: &mut WhereClause, filter: &FilterSpec) -> Result<(), OperationError> {
    for term in &filter.whitelist {
        clause.push(field_term(term, true)?);
    }
    for term in &filter.blacklist {
        clause.push(field_term(term, false)?);
    }
    for phrase in &filter.generic_whitelist {
        if let Some(p) = phrase_term(phrase, true) {
            clause.push(p);
        }
    }
    for phrase in &filter.generic_blacklist {
        if let Some(p) = phrase_term(phrase, false) {
            clause.push(p);
        }
    }
    Ok(())
}

/// Build a fresh clause holding only `filter`'s predicates.
pub fn build_filter(filter: &FilterSpec) -> Result<WhereClause, OperationError> {
    let mut clause = WhereClause::default();
    apply_filter(&mut clause, filter)?;
    Ok(clause)
}

fn field_term(term: &FieldTerm, include: bool) -> Result<Predicate, OperationError> {
    let field: GameField = term.field.parse()?;
    let column = ColumnRef::game(field);

    // Substring match only for free text; exact fields, typed values and the
    // empty string compare with equality.
    let substring = match &term.value {
        FieldValue::Text(s) => !s.is_empty() && !field.is_exact() && field.kind() == FieldKind::Text,
        _ => false,
    };

    if let (true, FieldValue::Text(s)) = (substring, &term.value) {
        return Ok(Predicate::Like {
            column,
            pattern: contains_pattern(s),
            negated: !include,
        });
    }

    Ok(Predicate::Compare {
        column,
        op: if include { CompareOp::Eq } else { CompareOp::Ne },
        value: to_sql_value(field.kind().into(), &term.value, field.name())?,
    })
}

/// Whitelist: any generic column contains the phrase. Blacklist: any generic
/// column lacks it, so a row is only dropped when all of them contain it.
fn phrase_term(phrase: &str, include: bool) -> Option<Predicate> {
    if phrase.is_empty() {
        return None;
    }
    let pattern = contains_pattern(phrase);
    Some(Predicate::Or(
        GameField::GENERIC_SEARCH
            .into_iter()
            .map(|field| Predicate::Like {
                column: ColumnRef::game(field),
                pattern: pattern.clone(),
                negated: !include,
            })
            .collect(),
    ))
}

/// `%value%` with LIKE wildcards in `value` escaped so they match literally.
pub fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Convert a request value into the SQL value stored for a column of `kind`.
pub fn to_sql_value(kind: ValueKind, value: &FieldValue, field: &str) -> Result<Value, OperationError> {
    let invalid = || OperationError::InvalidFilterValue {
        field: field.to_string(),
        value: value.to_string(),
    };
    match (kind, value) {
        (ValueKind::Bool, FieldValue::Bool(b)) => Ok(Value::Integer(i64::from(*b))),
        (ValueKind::Bool, FieldValue::Int(i @ (0 | 1))) => Ok(Value::Integer(*i)),
        (ValueKind::Bool, FieldValue::Text(s)) => match s.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Value::Integer(1)),
            "false" | "0" => Ok(Value::Integer(0)),
            _ => Err(invalid()),
        },
        (ValueKind::Bool, FieldValue::Int(_)) => Err(invalid()),
        (ValueKind::Int, FieldValue::Int(i)) => Ok(Value::Integer(*i)),
        (ValueKind::Int, FieldValue::Text(s)) => {
            s.trim().parse().map(Value::Integer).map_err(|_| invalid())
        }
        (ValueKind::Int, FieldValue::Bool(_)) => Err(invalid()),
        (ValueKind::Text, FieldValue::Text(s)) => Ok(Value::Text(s.clone())),
        (ValueKind::Text, FieldValue::Int(i)) => Ok(Value::Integer(*i)),
        (ValueKind::Text, FieldValue::Bool(b)) => Ok(Value::Integer(i64::from(*b))),
    }
}

/// Convert a value read back from SQLite into a cursor value of `kind`.
pub fn from_sql_value(kind: ValueKind, value: Value) -> FieldValue {
    match (kind, value) {
        (ValueKind::Bool, Value::Integer(i)) => FieldValue::Bool(i != 0),
        (_, Value::Integer(i)) => FieldValue::Int(i),
        (_, Value::Text(s)) => FieldValue::Text(s),
        (_, Value::Real(f)) => FieldValue::Text(f.to_string()),
        (_, Value::Blob(b)) => FieldValue::Text(String::from_utf8_lossy(&b).into_owned()),
        (_, Value::Null) => FieldValue::Text(String::new()),
    }
}
