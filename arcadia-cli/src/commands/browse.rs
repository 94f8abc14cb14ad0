use std::path::{Path, PathBuf};

use arcadia_catalog::{Cursor, FilterSpec, GameQuery, OrderSpec, PageIndex};
use arcadia_db::Catalog;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use crate::cli_types::{FilterArgs, OrderArgs};
use crate::settings::Settings;
use crate::CliError;

use super::{open_catalog, print_json, truncate_str};

/// Flags of the `query` command.
pub(crate) struct QueryArgs {
    pub(crate) filter: FilterArgs,
    pub(crate) order: OrderArgs,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) after: Option<String>,
    pub(crate) page: Option<u32>,
    pub(crate) shallow: bool,
    pub(crate) total: bool,
    pub(crate) request: Option<PathBuf>,
}

pub(crate) fn run_query(
    settings: &Settings,
    db: Option<PathBuf>,
    args: QueryArgs,
) -> Result<(), CliError> {
    let catalog = open_catalog(settings, db)?;
    let query = match &args.request {
        Some(path) => read_request(path)?,
        None => build_query(&catalog, &args)?,
    };

    let results = catalog
        .find_games(&query)
        .map_err(|e| CliError::database(format!("Query failed: {}", e)))?;
    print_json(&results)?;

    if let Some(total) = results.total {
        log::info!("{} matching games", total);
    }
    if let Some(cursor) = &results.next_cursor {
        let json = serde_json::to_string(cursor)
            .map_err(|e| CliError::invalid_argument(e.to_string()))?;
        log::info!(
            "Next page: {} '{}'",
            "--after".if_supports_color(Stderr, |t| t.cyan()),
            json
        );
    }
    Ok(())
}

fn read_request(path: &Path) -> Result<GameQuery, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| CliError::invalid_argument(format!("{}: {}", path.display(), e)))
}

fn build_query(catalog: &Catalog, args: &QueryArgs) -> Result<GameQuery, CliError> {
    let filter = args.filter.to_filter()?;
    let order = args.order.to_order()?;

    let mut query = GameQuery::new()
        .with_filter(filter.clone())
        .ordered_by(order);
    query.limit = args.limit;
    query.offset = args.offset;
    query.shallow = args.shallow;
    query.get_total = args.total;

    if let Some(raw) = &args.after {
        let cursor: Cursor = serde_json::from_str(raw)
            .map_err(|e| CliError::invalid_argument(format!("--after: {}", e)))?;
        query.cursor = Some(cursor);
    }

    if let Some(page) = args.page {
        query.cursor = page_cursor(catalog, &filter, &order, page)?;
        query.limit = Some(u64::from(catalog.options().page_size));
    }

    Ok(query)
}

/// Cursor that starts `page` at the configured page size.
fn page_cursor(
    catalog: &Catalog,
    filter: &FilterSpec,
    order: &OrderSpec,
    page: u32,
) -> Result<Option<Cursor>, CliError> {
    if page == 0 {
        return Err(CliError::invalid_argument("pages start at 1"));
    }
    let page_size = catalog.options().page_size;

    let mut count = GameQuery::new()
        .with_filter(filter.clone())
        .ordered_by(*order);
    count.limit = Some(0);
    count.shallow = true;
    count.get_total = true;
    let rows = catalog
        .find_games(&count)
        .map_err(|e| CliError::database(format!("Failed to count games: {}", e)))?
        .total
        .unwrap_or(0);
    let last = PageIndex::page_count(u64::try_from(rows).unwrap_or(0), page_size);
    if page > last {
        return Err(CliError::invalid_argument(format!(
            "page {} is past the last page ({})",
            page, last
        )));
    }

    let index = catalog
        .page_index(filter, order)
        .map_err(|e| CliError::database(format!("Failed to build page index: {}", e)))?;
    Ok(index.resume_cursor(page).cloned())
}

pub(crate) fn run_index(
    settings: &Settings,
    db: Option<PathBuf>,
    filter: &FilterArgs,
    order: &OrderArgs,
    page_size: Option<u32>,
) -> Result<(), CliError> {
    let catalog = open_catalog(settings, db)?;
    let page_size = page_size.unwrap_or(catalog.options().page_size);
    let index = catalog
        .page_index_with_size(&filter.to_filter()?, &order.to_order()?, page_size)
        .map_err(|e| CliError::database(format!("Failed to build page index: {}", e)))?;

    print_json(index.as_ref())?;
    log::info!("{} full pages of {} rows", index.len(), page_size);
    Ok(())
}

pub(crate) fn run_row(
    settings: &Settings,
    db: Option<PathBuf>,
    game_id: &str,
    filter: &FilterArgs,
    order: &OrderArgs,
) -> Result<(), CliError> {
    let catalog = open_catalog(settings, db)?;
    let row = catalog
        .find_game_row(game_id, &filter.to_filter()?, &order.to_order()?)
        .map_err(|e| CliError::database(format!("Row lookup failed: {}", e)))?;

    match row {
        Some(row) => {
            let page_size = i64::from(catalog.options().page_size.max(1));
            println!("{row}");
            log::info!("Page {} at {} rows per page", (row - 1) / page_size + 1, page_size);
            Ok(())
        }
        None => Err(CliError::not_found(format!(
            "game '{}' is not in this listing",
            game_id
        ))),
    }
}

pub(crate) fn run_random(
    settings: &Settings,
    db: Option<PathBuf>,
    count: u32,
) -> Result<(), CliError> {
    let catalog = open_catalog(settings, db)?;
    let games = catalog
        .find_random_games(count)
        .map_err(|e| CliError::database(format!("Failed to pick games: {}", e)))?;

    for game in &games {
        log::info!(
            "  {:<38} {:<40} {}",
            game.id.if_supports_color(Stderr, |t| t.dimmed()),
            truncate_str(&game.title, 40),
            game.platform
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcadia_catalog::Game;
    use arcadia_db::CatalogOptions;

    fn catalog_with(n: usize) -> Catalog {
        let options = CatalogOptions {
            page_size: 2,
            ..CatalogOptions::default()
        };
        let catalog = Catalog::open_memory(options).unwrap();
        let games: Vec<Game> = (0..n)
            .map(|i| Game::new(format!("g{i}"), format!("Title {i}")))
            .collect();
        catalog.update_games(&games).unwrap();
        catalog
    }

    #[test]
    fn exactly_full_last_page_is_the_last_page() {
        let catalog = catalog_with(4);
        let filter = FilterSpec::default();
        let order = OrderSpec::default();

        assert_eq!(page_cursor(&catalog, &filter, &order, 1).unwrap(), None);
        let second = page_cursor(&catalog, &filter, &order, 2).unwrap().unwrap();
        assert_eq!(second.id, "g1");
        assert!(page_cursor(&catalog, &filter, &order, 3).is_err());
        assert!(page_cursor(&catalog, &filter, &order, 0).is_err());
    }

    #[test]
    fn trailing_short_page_is_reachable() {
        let catalog = catalog_with(5);
        let cursor = page_cursor(&catalog, &FilterSpec::default(), &OrderSpec::default(), 3)
            .unwrap()
            .unwrap();
        assert_eq!(cursor.id, "g3");
        assert!(page_cursor(&catalog, &FilterSpec::default(), &OrderSpec::default(), 4).is_err());
    }

    #[test]
    fn empty_result_still_has_page_one() {
        let catalog = catalog_with(0);
        assert_eq!(
            page_cursor(&catalog, &FilterSpec::default(), &OrderSpec::default(), 1).unwrap(),
            None
        );
    }
}
