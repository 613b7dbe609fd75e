//! Deterministic mock sales data for the demo dashboard endpoint.

use chrono::{DateTime, Duration, Utc};
use dashlytics_core::Record;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Regions orders are attributed to.
pub const REGIONS: [&str; 4] = ["north", "south", "east", "west"];

/// Products and their list prices.
pub const PRODUCTS: [(&str, f64); 5] = [
    ("starter", 29.0),
    ("team", 99.0),
    ("business", 249.0),
    ("enterprise", 899.0),
    ("addon", 15.0),
];

/// Generates `days` days of orders ending on the day of `end`.
///
/// The same `seed` and `end` date always yield the same records. Each record
/// carries `date`, `region`, `product`, `units` and `revenue`.
pub fn generate_sales(days: u32, seed: u64, end: DateTime<Utc>) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(seed);
    let last_day = end.date_naive();
    let mut records = Vec::new();

    for offset in (0..i64::from(days)).rev() {
        let day = last_day - Duration::days(offset);
        let Some(midnight) = day.and_hms_opt(0, 0, 0) else {
            continue;
        };
        let midnight = midnight.and_utc();
        // Gentle upward trend with weekly noise.
        let base_orders = 8 + (i64::from(days) - offset) / 7;
        let orders = base_orders + rng.gen_range(0..6);

        for _ in 0..orders {
            let region = REGIONS[rng.gen_range(0..REGIONS.len())];
            let (product, price) = PRODUCTS[rng.gen_range(0..PRODUCTS.len())];
            let units: i64 = rng.gen_range(1..=5);
            let discount: f64 = rng.gen_range(0.0..0.2);
            let revenue = (price * units as f64 * (1.0 - discount) * 100.0).round() / 100.0;
            let at = midnight + Duration::minutes(rng.gen_range(0..24 * 60));

            records.push(
                Record::new()
                    .with("date", at)
                    .with("region", region)
                    .with("product", product)
                    .with("units", units)
                    .with("revenue", revenue),
            );
        }
    }

    tracing::debug!(days, seed, records = records.len(), "generated mock sales");
    records
}
