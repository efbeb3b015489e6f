use anyhow::Context;
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::db::queries;

struct CategorySeed {
    code: &'static str,
    name: &'static str,
    description: &'static str,
    /// (duration months, km package, price per month)
    plans: [(u32, u32, i64); 9],
    cars: [(&'static str, &'static str, &'static str); 4],
}

const SEEDS: [CategorySeed; 3] = [
    CategorySeed {
        code: "SEDAN_STANDARD",
        name: "Standard Sedan",
        description: "Comfortable 5-seater sedans for daily commute",
        plans: [
            (1, 500, 25000),
            (1, 1000, 28000),
            (1, 2000, 32000),
            (3, 500, 23000),
            (3, 1000, 26000),
            (3, 2000, 30000),
            (6, 500, 21000),
            (6, 1000, 24000),
            (6, 2000, 28000),
        ],
        cars: [
            ("Honda", "City", "https://images.unsplash.com/photo-1549317661-bd32c8ce0db2?w=800&h=600&fit=crop"),
            ("Toyota", "Camry", "https://images.unsplash.com/photo-1603584173870-7f23fdae1b7a?w=800&h=600&fit=crop"),
            ("Hyundai", "Verna", "https://images.unsplash.com/photo-1605559424843-9e4c228bf1c2?w=800&h=600&fit=crop"),
            ("Volkswagen", "Virtus", "https://images.unsplash.com/photo-1606664515524-ed2f786a0ad6?w=800&h=600&fit=crop"),
        ],
    },
    CategorySeed {
        code: "SUV_STANDARD",
        name: "Standard SUV",
        description: "Spacious SUVs for family trips",
        plans: [
            (1, 500, 35000),
            (1, 1000, 40000),
            (1, 2000, 45000),
            (3, 500, 33000),
            (3, 1000, 38000),
            (3, 2000, 43000),
            (6, 500, 31000),
            (6, 1000, 36000),
            (6, 2000, 41000),
        ],
        cars: [
            ("Toyota", "Fortuner", "https://images.unsplash.com/photo-1606220945770-b5b6c2c55bf1?w=800&h=600&fit=crop"),
            ("Mahindra", "XUV700", "https://images.unsplash.com/photo-1606664515524-ed2f786a0ad6?w=800&h=600&fit=crop"),
            ("Hyundai", "Creta", "https://images.unsplash.com/photo-1606220945770-b5b6c2c55bf1?w=800&h=600&fit=crop"),
            ("Kia", "Seltos", "https://images.unsplash.com/photo-1605559424843-9e4c228bf1c2?w=800&h=600&fit=crop"),
        ],
    },
    CategorySeed {
        code: "LUXURY_EXECUTIVE",
        name: "Luxury Executive",
        description: "Premium luxury vehicles",
        plans: [
            (1, 500, 75000),
            (1, 1000, 85000),
            (1, 2000, 95000),
            (3, 500, 70000),
            (3, 1000, 80000),
            (3, 2000, 90000),
            (6, 500, 65000),
            (6, 1000, 75000),
            (6, 2000, 85000),
        ],
        cars: [
            ("BMW", "5 Series", "https://images.unsplash.com/photo-1555215695-3004980ad54e?w=800&h=600&fit=crop"),
            ("Mercedes-Benz", "E-Class", "https://images.unsplash.com/photo-1618843479313-40f8afb4b4d8?w=800&h=600&fit=crop"),
            ("Audi", "A6", "https://images.unsplash.com/photo-1606220945770-b5b6c2c55bf1?w=800&h=600&fit=crop"),
            ("BMW", "X5", "https://images.unsplash.com/photo-1555215695-3004980ad54e?w=800&h=600&fit=crop"),
        ],
    },
];

/// Loads the demo catalog when the database has no categories yet.
/// Returns true if data was written.
pub fn seed_demo_data(conn: &Connection) -> anyhow::Result<bool> {
    if queries::count_categories(conn)? > 0 {
        tracing::info!("catalog already present, skipping seed");
        return Ok(false);
    }

    let tx = conn
        .unchecked_transaction()
        .context("failed to begin seed transaction")?;

    for seed in &SEEDS {
        let category_id = queries::insert_category(&tx, seed.code, seed.name, Some(seed.description))
            .with_context(|| format!("failed to seed category {}", seed.code))?;

        for (duration, km, price) in seed.plans {
            queries::insert_pricing_plan(&tx, category_id, duration, km, Decimal::from(price))?;
        }

        for (brand, model, image_url) in seed.cars {
            queries::insert_car(&tx, category_id, brand, model, Some(image_url))?;
        }
    }

    tx.commit().context("failed to commit seed transaction")?;

    tracing::info!(
        categories = SEEDS.len(),
        plans = SEEDS.len() * 9,
        cars = SEEDS.len() * 4,
        "seeded demo catalog"
    );
    Ok(true)
}
