//! Read-only views over the record store

use crate::model::{
    name_key, CategorySummary, InventoryStats, Item, SearchMode, LOW_STOCK_THRESHOLD,
};
use crate::store::{item_from_row, DbResult, ITEM_COLUMNS};
use rusqlite::{params, Connection, OptionalExtension};

/// Check whether any item holds `name` (case-insensitive, exact)
///
/// `exclude_id` leaves that item out of the match, so an item being updated
/// may keep its own name.
pub fn exists_by_name(conn: &Connection, name: &str, exclude_id: Option<i64>) -> DbResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM items WHERE name_key = ?1 AND (?2 IS NULL OR id <> ?2) LIMIT 1",
            params![name_key(name), exclude_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Case-insensitive substring search, ordered by name
///
/// The term is matched literally; `%` and `_` carry no wildcard meaning.
/// [`SearchMode::Unknown`] yields no results.
pub fn search(conn: &Connection, term: &str, mode: SearchMode) -> DbResult<Vec<Item>> {
    let filter = match mode {
        SearchMode::Name => {
            "instr(fold_case(name), ?1) > 0 OR instr(fold_case(description), ?1) > 0"
        }
        SearchMode::Category => "instr(fold_case(category), ?1) > 0",
        SearchMode::Unknown => return Ok(Vec::new()),
    };

    let mut stmt = conn.prepare(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE {filter} ORDER BY name"
    ))?;
    let results: DbResult<Vec<Item>> = stmt
        .query_map(params![term.to_lowercase()], item_from_row)?
        .collect();
    results
}

/// Every distinct non-blank category, ascending
pub fn distinct_categories(conn: &Connection) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT category FROM items
         WHERE category IS NOT NULL AND trim(category) <> ''
         ORDER BY category",
    )?;
    let results: DbResult<Vec<String>> = stmt.query_map([], |row| row.get(0))?.collect();
    results
}

/// Aggregate statistics; `total_value` is 0.0 for an empty store
pub fn stats(conn: &Connection) -> DbResult<InventoryStats> {
    conn.query_row(
        "SELECT
             COUNT(*),
             COALESCE(SUM(quantity * price), 0.0),
             COALESCE(SUM(CASE WHEN quantity < ?1 THEN 1 ELSE 0 END), 0),
             COUNT(DISTINCT CASE WHEN trim(category) <> '' THEN category END)
         FROM items",
        params![LOW_STOCK_THRESHOLD],
        |row| {
            Ok(InventoryStats {
                total_products: row.get(0)?,
                total_value: row.get(1)?,
                low_stock: row.get(2)?,
                categories: row.get(3)?,
            })
        },
    )
}

/// Item count and stock value per category, largest categories first
pub fn category_breakdown(conn: &Connection) -> DbResult<Vec<CategorySummary>> {
    let mut stmt = conn.prepare(
        "SELECT category, COUNT(*) AS items, COALESCE(SUM(quantity * price), 0.0)
         FROM items
         GROUP BY category
         ORDER BY items DESC, category",
    )?;
    let results: DbResult<Vec<CategorySummary>> = stmt
        .query_map([], |row| {
            Ok(CategorySummary {
                category: row.get(0)?,
                items: row.get(1)?,
                value: row.get(2)?,
            })
        })?
        .collect();
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewItem;
    use crate::store::tests::{make_new_item, test_db};
    use crate::store::{insert_item, now};

    fn seed(conn: &Connection) {
        insert_item(conn, &make_new_item("Widget", 5, 2.0, "Tools"), now()).unwrap();
        insert_item(conn, &make_new_item("Gadget", 50, 10.0, "Tools"), now()).unwrap();
        insert_item(
            conn,
            &NewItem {
                name: "Lámpara de Pie LED".to_string(),
                description: "Lámpara moderna con regulador".to_string(),
                quantity: 8,
                price: 125.0,
                category: "Hogar".to_string(),
            },
            now(),
        )
        .unwrap();
    }

    #[test]
    fn exists_by_name_is_case_insensitive() {
        let conn = test_db();
        seed(&conn);

        assert!(exists_by_name(&conn, "widget", None).unwrap());
        assert!(exists_by_name(&conn, "  WIDGET ", None).unwrap());
        assert!(exists_by_name(&conn, "LÁMPARA DE PIE LED", None).unwrap());
        assert!(!exists_by_name(&conn, "Widgets", None).unwrap());
    }

    #[test]
    fn exists_by_name_excludes_own_id() {
        let conn = test_db();
        let item = insert_item(&conn, &make_new_item("Widget", 5, 2.0, "Tools"), now()).unwrap();

        assert!(!exists_by_name(&conn, "Widget", Some(item.id)).unwrap());
        assert!(exists_by_name(&conn, "Widget", Some(item.id + 1)).unwrap());
    }

    #[test]
    fn search_by_name_matches_description_too() {
        let conn = test_db();
        seed(&conn);

        let results = search(&conn, "REGULADOR", SearchMode::Name).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Lámpara de Pie LED");

        let names: Vec<String> = search(&conn, "dget", SearchMode::Name)
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Gadget", "Widget"]);
    }

    #[test]
    fn search_by_category() {
        let conn = test_db();
        seed(&conn);

        let results = search(&conn, "OOL", SearchMode::Category).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "Gadget");
        assert!(search(&conn, "Widget", SearchMode::Category).unwrap().is_empty());
    }

    #[test]
    fn search_treats_wildcards_literally() {
        let conn = test_db();
        seed(&conn);
        assert!(search(&conn, "%", SearchMode::Name).unwrap().is_empty());
        assert!(search(&conn, "W_dget", SearchMode::Name).unwrap().is_empty());
    }

    #[test]
    fn search_unknown_mode_is_empty() {
        let conn = test_db();
        seed(&conn);
        assert!(search(&conn, "Widget", SearchMode::Unknown).unwrap().is_empty());
    }

    #[test]
    fn distinct_categories_sorted() {
        let conn = test_db();
        seed(&conn);
        assert_eq!(distinct_categories(&conn).unwrap(), vec!["Hogar", "Tools"]);
    }

    #[test]
    fn stats_on_empty_store() {
        let conn = test_db();
        assert_eq!(
            stats(&conn).unwrap(),
            InventoryStats {
                total_products: 0,
                total_value: 0.0,
                low_stock: 0,
                categories: 0,
            }
        );
    }

    #[test]
    fn stats_sum_quantity_times_price() {
        let conn = test_db();
        insert_item(&conn, &make_new_item("Widget", 5, 2.0, "Tools"), now()).unwrap();
        insert_item(&conn, &make_new_item("Gadget", 50, 10.0, "Tools"), now()).unwrap();

        let stats = stats(&conn).unwrap();
        assert_eq!(stats.total_products, 2);
        assert!((stats.total_value - 510.0).abs() < 1e-9);
        assert_eq!(stats.low_stock, 1);
        assert_eq!(stats.categories, 1);
    }

    #[test]
    fn category_breakdown_orders_by_size() {
        let conn = test_db();
        seed(&conn);

        let breakdown = category_breakdown(&conn).unwrap();
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].category, "Tools");
        assert_eq!(breakdown[0].items, 2);
        assert!((breakdown[0].value - 510.0).abs() < 1e-9);
        assert_eq!(breakdown[1].category, "Hogar");
        assert!((breakdown[1].value - 1000.0).abs() < 1e-9);
    }
}
