//! Page-boundary index for jump-to-page navigation.

use std::time::Instant;

use arcadia_catalog::{FilterSpec, OrderSpec, PageIndex};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use crate::operations::OperationError;
use crate::plan::SelectPlan;

/// Compute the cursor of the last row of every full page.
///
/// Entry `k` closes page `k`, so it is the cursor to resume from when
/// opening page `k + 1`. A trailing partial page has no entry.
pub fn build_page_index(
    conn: &Connection,
    filter: &FilterSpec,
    order: &OrderSpec,
    page_size: u32,
) -> Result<PageIndex, OperationError> {
    if page_size == 0 {
        return Err(OperationError::InvalidPageSize);
    }
    let start = Instant::now();
    let plan = SelectPlan::new(Some(filter), order)?;

    let mut params = Vec::new();
    let mut inner = format!(
        "SELECT {} AS order_val, game.id AS id, {} AS rn",
        plan.order.column,
        plan.row_number_sql()
    );
    plan.render_from_where(&mut inner, &mut params);
    let sql = format!("SELECT order_val, id FROM ({inner}) WHERE rn % ? = 0 ORDER BY rn");
    params.push(Value::Integer(page_size.into()));

    let key = plan.order;
    let mut stmt = conn.prepare(&sql)?;
    let boundaries = stmt
        .query_map(params_from_iter(params.iter()), |row| {
            Ok(key.cursor(row.get(0)?, row.get(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let index = PageIndex::from_boundaries(boundaries);
    log::debug!(
        "{}ms for page index ({} boundaries, page size {})",
        start.elapsed().as_millis(),
        index.len(),
        page_size
    );
    Ok(index)
}
