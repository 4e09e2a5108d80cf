//! Sample catalog for demos and manual testing

use crate::error::Result;
use crate::inventory::Inventory;
use crate::model::ItemFields;
use crate::mutation::create_item;
use crate::query::exists_by_name;

/// (name, description, quantity, price, category)
const SAMPLE_ITEMS: &[(&str, &str, i64, f64, &str)] = &[
    ("Laptop Inspiron 15", "15 inch laptop with Core i5 processor", 15, 750.00, "Electronics"),
    ("Smartphone Pro 14", "Phone with 48MP camera", 8, 1200.00, "Electronics"),
    ("Tablet Air 10.9", "Tablet with 10.9 inch display", 6, 650.00, "Electronics"),
    ("Wireless Earbuds", "Earbuds with active noise cancelling", 25, 249.99, "Electronics"),
    ("Three Seat Sofa", "Grey fabric sofa with wooden legs", 3, 899.00, "Home"),
    ("LED Floor Lamp", "Dimmable floor lamp", 8, 125.00, "Home"),
    ("Blackout Curtains", "Light-blocking curtains for bedrooms", 15, 75.00, "Home"),
    ("Classic Denim Jeans", "Blue denim, assorted sizes", 30, 89.99, "Clothing"),
    ("Running Shoes", "Cushioned road running shoes", 18, 180.00, "Clothing"),
    ("Rain Jacket", "Waterproof jacket for outdoor activities", 12, 199.99, "Clothing"),
    ("Python Programming 4th Ed", "Complete guide to learning Python", 25, 49.99, "Books"),
    ("World Atlas 2024", "Updated atlas with detailed maps", 10, 65.00, "Books"),
    ("Mountain Bike", "All-terrain bike with 21 speeds", 5, 450.00, "Sports"),
    ("Adjustable Dumbbells", "2kg to 20kg set with bar and plates", 8, 189.99, "Sports"),
    ("Yoga Mat", "6mm non-slip mat", 30, 45.00, "Sports"),
    ("Espresso Machine", "Capsule espresso maker", 12, 199.00, "Kitchen"),
    ("Non-stick Pan 28cm", "Ceramic coated frying pan", 16, 75.00, "Kitchen"),
    ("Ergonomic Office Chair", "Lumbar support and adjustable armrests", 11, 289.00, "Office"),
    ("27 inch 4K Monitor", "Monitor for design work", 6, 349.99, "Office"),
    ("Notebook Pack", "Three hardcover ruled notebooks", 25, 45.00, "Office"),
];

/// Result of a seeding run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub added: usize,
    pub skipped: usize,
}

/// Insert the sample catalog, skipping names already present
///
/// Runs as one batch, so mirrors are regenerated once at the end.
pub fn seed_sample_items(inventory: &Inventory) -> Result<SeedReport> {
    let report = inventory.batch(|tx| {
        let mut report = SeedReport::default();
        for &(name, description, quantity, price, category) in SAMPLE_ITEMS {
            if exists_by_name(tx, name, None)? {
                log::warn!("Sample item already exists: {}", name);
                report.skipped += 1;
                continue;
            }
            let fields = ItemFields::new(name, &quantity.to_string(), &price.to_string())
                .with_description(description)
                .with_category(category);
            create_item(tx, &fields)?;
            report.added += 1;
        }
        Ok(report)
    })?;

    log::info!(
        "Seeded {} sample items ({} already present)",
        report.added,
        report.skipped
    );
    Ok(report)
}
