//! Benchmark tests for catalog queries
//!
//! Run with: cargo test --release bench -- --ignored --nocapture

use std::time::Instant;

use tempfile::{NamedTempFile, TempDir};

use listings::config::AppConfig;
use listings::database::{init_db, AppState};
use listings::model::ListingFields;
use listings::query::{Direction, ListingQuery, SortField};

/// Benchmark helper to measure execution time
fn benchmark<F>(name: &str, iterations: usize, mut f: F)
where
    F: FnMut(),
{
    let start = Instant::now();

    for _ in 0..iterations {
        f();
    }

    let duration = start.elapsed();
    let avg_ms = duration.as_secs_f64() * 1000.0 / iterations as f64;
    let ops_per_sec = (iterations as f64 / duration.as_secs_f64()) as u64;

    println!("  {} ({} iterations)", name, iterations);
    println!("    Total time: {:?}", duration);
    println!("    Avg time: {:.3}ms", avg_ms);
    println!("    Throughput: {} ops/sec\n", ops_per_sec);
}

fn seeded_state(listings: usize) -> (AppState, NamedTempFile, TempDir) {
    let temp_db = NamedTempFile::new().unwrap();
    let media = tempfile::tempdir().unwrap();
    let db = init_db(temp_db.path().to_str().unwrap()).unwrap();
    let config = AppConfig {
        media_root: media.path().to_path_buf(),
        ..AppConfig::default()
    };
    let state = AppState::new(db, &config);

    let categories: Vec<_> = ["Books", "Electronics", "Garden", "Toys"]
        .iter()
        .map(|name| state.catalog.ensure_category(name).unwrap())
        .collect();

    for i in 0..listings {
        state
            .catalog
            .create(
                ListingFields {
                    name: format!("Item {i}"),
                    about: if i % 10 == 0 {
                        "works with your phone".to_string()
                    } else {
                        "plain item".to_string()
                    },
                    category_id: Some(categories[i % categories.len()].id),
                    sku: Some(format!("SKU-{i:05}")),
                    price: (i % 500) as f64 + 0.99,
                    rating: None,
                    image_url: None,
                },
                None,
            )
            .unwrap();
    }

    (state, temp_db, media)
}

#[test]
#[ignore] // Run explicitly with: cargo test bench --release -- --ignored --nocapture
fn bench_find_listings() {
    println!("\n=== Benchmark: Find Listings ===\n");

    println!("  Preparing: Creating 5000 listings...");
    let (state, _temp_db, _media) = seeded_state(5000);
    println!("  Done!\n");

    let iterations = 100;

    benchmark("Unfiltered, id order", iterations, || {
        let _ = state.catalog.find(&ListingQuery::new()).unwrap();
    });

    benchmark("Sorted by name", iterations, || {
        let query = ListingQuery::new().sorted_by(SortField::Name, Direction::Asc);
        let _ = state.catalog.find(&query).unwrap();
    });

    benchmark("Category filter + price desc", iterations, || {
        let query = ListingQuery::new()
            .sorted_by(SortField::Price, Direction::Desc)
            .in_categories(vec!["Books".to_string(), "Toys".to_string()]);
        let _ = state.catalog.find(&query).unwrap();
    });

    benchmark("Search", iterations, || {
        let query = ListingQuery::new().matching("phone");
        let rows = state.catalog.find(&query).unwrap();
        assert_eq!(rows.len(), 500);
    });
}

#[test]
fn bench_summary() {
    println!("\n{}", "=".repeat(60));
    println!("Benchmark Test Suite");
    println!("{}", "=".repeat(60));
    println!("\nTo run benchmarks, use:");
    println!("  cargo test --release bench -- --ignored --nocapture");
    println!("\nAvailable benchmarks:");
    println!("  • bench_find_listings - query cost over a 5000-listing catalog");
    println!("\n{}\n", "=".repeat(60));
}
