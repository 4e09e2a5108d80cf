use inventory_mirror::{
    Config, ImportError, Inventory, InventoryError, ItemFields, MirrorFormat, SearchMode,
    ValidationError,
};
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

// Test fixtures

fn file_inventory() -> (Inventory, TempDir) {
    let dir = TempDir::new().unwrap();
    let config = Config::beside_database(dir.path().join("inventory.db"));
    let inventory = Inventory::open(&config).unwrap();
    (inventory, dir)
}

fn csv_fixture(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

fn widget() -> ItemFields {
    ItemFields::new("Widget", "5", "2.00").with_category("Tools")
}

fn gadget() -> ItemFields {
    ItemFields::new("Gadget", "50", "10.00").with_category("Tools")
}

// CRUD properties

#[test]
fn test_create_then_get_returns_normalized_item() {
    let (inventory, _dir) = file_inventory();
    let fields = ItemFields::new("  Widget ", "5", "2.00")
        .with_description(" a part ")
        .with_category("");

    let created = inventory.create(&fields).unwrap();
    let fetched = inventory.get(created.id).unwrap().unwrap();

    assert_eq!(fetched.name, "Widget");
    assert_eq!(fetched.description, "a part");
    assert_eq!(fetched.quantity, 5);
    assert_eq!(fetched.price, 2.0);
    assert_eq!(fetched.category, "General");
    assert_eq!(fetched.created_at, fetched.updated_at);
}

#[test]
fn test_get_missing_is_none() {
    let (inventory, _dir) = file_inventory();
    assert!(inventory.get(404).unwrap().is_none());
}

#[test]
fn test_case_variant_name_rejected_and_count_unchanged() {
    let (inventory, _dir) = file_inventory();
    inventory.create(&widget()).unwrap();

    let err = inventory
        .create(&ItemFields::new("wIdGeT", "1", "1"))
        .unwrap_err();
    assert!(matches!(
        err,
        InventoryError::Validation(ValidationError::DuplicateName)
    ));
    assert_eq!(inventory.count().unwrap(), 1);
}

#[test]
fn test_update_keeping_own_name_advances_updated_at() {
    let (inventory, _dir) = file_inventory();
    let item = inventory.create(&widget()).unwrap();

    let updated = inventory
        .update(item.id, &ItemFields::new("Widget", "9", "2.00"))
        .unwrap();
    assert!(updated.updated_at > item.updated_at);
    assert_eq!(updated.created_at, item.created_at);
    assert_eq!(updated.category, "General");
}

#[test]
fn test_delete_missing_is_not_found() {
    let (inventory, _dir) = file_inventory();
    inventory.create(&widget()).unwrap();

    let err = inventory.delete(999).unwrap_err();
    assert!(matches!(err, InventoryError::NotFound(999)));
    assert!(err.is_expected());
    assert_eq!(inventory.count().unwrap(), 1);
}

#[test]
fn test_store_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let config = Config::beside_database(dir.path().join("inventory.db"));

    let id = {
        let inventory = Inventory::open(&config).unwrap();
        inventory.create(&widget()).unwrap().id
    };

    let inventory = Inventory::open(&config).unwrap();
    assert_eq!(inventory.get(id).unwrap().unwrap().name, "Widget");
}

// Queries

#[test]
fn test_stats_on_empty_store() {
    let (inventory, _dir) = file_inventory();
    let stats = inventory.stats().unwrap();
    assert_eq!(stats.total_products, 0);
    assert_eq!(stats.total_value, 0.0);
    assert_eq!(stats.low_stock, 0);
    assert_eq!(stats.categories, 0);

    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "total_products": 0,
            "total_value": 0.0,
            "low_stock": 0,
            "categories": 0
        })
    );
}

#[test]
fn test_stats_scenario() {
    let (inventory, _dir) = file_inventory();
    inventory.create(&widget()).unwrap();
    inventory.create(&gadget()).unwrap();

    let stats = inventory.stats().unwrap();
    assert_eq!(stats.total_products, 2);
    // 5 * 2.00 + 50 * 10.00
    assert!((stats.total_value - 510.0).abs() < 1e-9);
    assert_eq!(stats.low_stock, 1);
    assert_eq!(stats.categories, 1);
}

#[test]
fn test_search_modes() {
    let (inventory, _dir) = file_inventory();
    inventory.create(&widget()).unwrap();
    inventory
        .create(&ItemFields::new("Desk Lamp", "3", "20").with_description("tool-free assembly"))
        .unwrap();

    let by_name: Vec<String> = inventory
        .search("TOOL", SearchMode::Name)
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(by_name, vec!["Desk Lamp"]);

    let by_category = inventory.search("tool", SearchMode::Category).unwrap();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].name, "Widget");

    let unknown = inventory
        .search("tool", "supplier".parse().unwrap())
        .unwrap();
    assert!(unknown.is_empty());

    assert_eq!(inventory.categories().unwrap(), vec!["General", "Tools"]);
}

// Mirrors

#[test]
fn test_mutations_regenerate_all_mirrors() {
    let (inventory, _dir) = file_inventory();
    inventory.create(&widget()).unwrap();
    inventory.create(&gadget()).unwrap();

    let txt = fs::read_to_string(inventory.mirrors().path(MirrorFormat::Text)).unwrap();
    assert_eq!(txt.lines().count(), 4);
    assert!(txt.lines().nth(2).unwrap().starts_with("2|Gadget|"));

    let json: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(inventory.mirrors().path(MirrorFormat::Json)).unwrap(),
    )
    .unwrap();
    assert_eq!(json["metadata"]["total_items"], 2);
    assert_eq!(json["items"].as_array().unwrap().len(), 2);

    let csv_text = fs::read_to_string(inventory.mirrors().path(MirrorFormat::Csv)).unwrap();
    assert_eq!(csv_text.lines().count(), 3);
}

#[test]
fn test_export_then_import_is_idempotent() {
    let (inventory, _dir) = file_inventory();
    inventory.create(&widget()).unwrap();
    inventory.create(&gadget()).unwrap();
    inventory
        .create(&ItemFields::new("Gizmo", "0", "0").with_description("with | pipe, and comma"))
        .unwrap();
    inventory.resync().unwrap();

    let csv_path = inventory.mirrors().path(MirrorFormat::Csv);
    let summary = inventory.import_file(&csv_path, None).unwrap();
    assert_eq!(summary.inserted, 0);
    assert_eq!(summary.skipped, 3);
    assert_eq!(inventory.count().unwrap(), 3);

    let json_path = inventory.mirrors().path(MirrorFormat::Json);
    let summary = inventory.import_file(&json_path, None).unwrap();
    assert_eq!(summary.inserted, 0);
    assert_eq!(inventory.count().unwrap(), 3);
}

#[test]
fn test_import_one_new_one_existing() {
    let (inventory, _dir) = file_inventory();
    inventory.create(&widget()).unwrap();

    let file = csv_fixture(
        "id,name,description,quantity,price,category,created_at,updated_at\n\
         1,WIDGET,,5,2.0,Tools,2024-01-01T00:00:00Z,2024-01-01T00:00:00Z\n\
         2,Sprocket,Steel,12,1.5,,2024-01-01T00:00:00Z,2024-01-01T00:00:00Z\n",
    );

    let summary = inventory.import_file(file.path(), None).unwrap();
    assert_eq!(summary.inserted, 1);

    let items = inventory.list_all().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].name, "Sprocket");
    assert_eq!(items[0].category, "General");

    // Imported item is in the regenerated mirror
    let csv_text = fs::read_to_string(inventory.mirrors().path(MirrorFormat::Csv)).unwrap();
    assert!(csv_text.contains("Sprocket"));
}

#[test]
fn test_malformed_import_leaves_store_unchanged() {
    let (inventory, _dir) = file_inventory();
    inventory.create(&widget()).unwrap();

    let file = csv_fixture("name,quantity,price\nSprocket,12,1.5\nCog,twelve,1.5\n");
    let err = inventory.import_file(file.path(), None).unwrap_err();
    assert!(matches!(
        err,
        InventoryError::Import(ImportError::InvalidNumber { record: 2, .. })
    ));

    assert_eq!(inventory.count().unwrap(), 1);
    assert!(!inventory.exists_by_name("Sprocket", None).unwrap());
}

#[test]
fn test_unsupported_format_fails_before_reading() {
    let (inventory, dir) = file_inventory();

    // The file does not exist: an I/O error here would mean we tried to open it
    let missing = dir.path().join("does_not_exist.txt");
    let err = inventory.import_file(&missing, None).unwrap_err();
    assert!(matches!(err, InventoryError::UnsupportedFormat(_)));

    let err = inventory
        .import_file(&dir.path().join("stock.xml"), None)
        .unwrap_err();
    assert!(matches!(err, InventoryError::UnsupportedFormat(_)));

    let err = inventory
        .import_file(&missing, Some(MirrorFormat::Text))
        .unwrap_err();
    assert!(matches!(err, InventoryError::UnsupportedFormat(_)));
}

#[test]
fn test_resync_restores_deleted_mirror() {
    let (inventory, _dir) = file_inventory();
    inventory.create(&widget()).unwrap();

    let json_path = inventory.mirrors().path(MirrorFormat::Json);
    fs::remove_file(&json_path).unwrap();

    let report = inventory.resync().unwrap();
    assert!(report.is_complete());
    assert_eq!(report.items, 1);
    assert!(json_path.exists());
}
