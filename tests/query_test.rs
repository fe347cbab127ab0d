//! Tests for listing query semantics, independent of storage

use chrono::Utc;

use listings::handler::current_sorting;
use listings::model::{Category, Listing, ListingView};
use listings::query::{Direction, ListingQuery, QueryError, SortField};

fn view(id: u64, name: &str, about: &str, price: f64, category: Option<&str>) -> ListingView {
    let now = Utc::now();
    ListingView {
        listing: Listing {
            id,
            name: name.to_string(),
            about: about.to_string(),
            category_id: category.map(|_| id * 10),
            sku: None,
            price,
            rating: None,
            image_url: None,
            image: None,
            created_at: now,
            updated_at: now,
        },
        category: category.map(|name| Category {
            id: id * 10,
            name: name.to_string(),
        }),
    }
}

fn ids(rows: &[ListingView]) -> Vec<u64> {
    rows.iter().map(|row| row.listing.id).collect()
}

#[test]
fn test_sort_field_parsing() {
    assert_eq!("name".parse::<SortField>(), Ok(SortField::Name));
    assert_eq!("category".parse::<SortField>(), Ok(SortField::Category));
    assert_eq!("price".parse::<SortField>(), Ok(SortField::Price));
    assert_eq!("rating".parse::<SortField>(), Ok(SortField::Rating));
    assert_eq!(
        "lower_name".parse::<SortField>(),
        Err(QueryError::InvalidSortKey("lower_name".to_string()))
    );
    assert_eq!(
        "about".parse::<SortField>(),
        Err(QueryError::InvalidSortKey("about".to_string()))
    );
}

#[test]
fn test_only_desc_reverses() {
    assert_eq!(Direction::from_param(Some("desc")), Direction::Desc);
    assert_eq!(Direction::from_param(Some("asc")), Direction::Asc);
    assert_eq!(Direction::from_param(Some("DESC")), Direction::Asc);
    assert_eq!(Direction::from_param(None), Direction::Asc);
}

#[test]
fn test_current_sorting_descriptor() {
    assert_eq!(current_sorting(Some("name"), Some("desc")), "name_desc");
    assert_eq!(current_sorting(Some("price"), None), "price_None");
    assert_eq!(current_sorting(None, None), "None_None");
}

#[test]
fn test_unsorted_query_keeps_id_order() {
    let rows = vec![
        view(3, "c", "", 1.0, None),
        view(1, "a", "", 1.0, None),
        view(2, "b", "", 1.0, None),
    ];

    assert_eq!(ids(&ListingQuery::new().apply(rows)), vec![1, 2, 3]);
}

#[test]
fn test_name_sort_ignores_case() {
    let rows = vec![
        view(1, "Banana", "", 1.0, None),
        view(2, "apple", "", 1.0, None),
        view(3, "Cherry", "", 1.0, None),
    ];

    let asc = ListingQuery::new()
        .sorted_by(SortField::Name, Direction::Asc)
        .apply(rows.clone());
    assert_eq!(ids(&asc), vec![2, 1, 3]);

    let desc = ListingQuery::new()
        .sorted_by(SortField::Name, Direction::Desc)
        .apply(rows);
    assert_eq!(ids(&desc), vec![3, 1, 2]);
}

#[test]
fn test_ties_break_by_id() {
    let rows = vec![
        view(2, "same", "", 5.0, None),
        view(1, "same", "", 5.0, None),
        view(3, "other", "", 1.0, None),
    ];

    let desc = ListingQuery::new()
        .sorted_by(SortField::Price, Direction::Desc)
        .apply(rows);
    assert_eq!(ids(&desc), vec![1, 2, 3]);
}

#[test]
fn test_missing_rating_sorts_last_ascending() {
    let mut rated_low = view(1, "low", "", 1.0, None);
    rated_low.listing.rating = Some(1.5);
    let mut rated_high = view(2, "high", "", 1.0, None);
    rated_high.listing.rating = Some(4.5);
    let unrated = view(3, "none", "", 1.0, None);
    let rows = vec![unrated, rated_high, rated_low];

    let asc = ListingQuery::new()
        .sorted_by(SortField::Rating, Direction::Asc)
        .apply(rows.clone());
    assert_eq!(ids(&asc), vec![1, 2, 3]);

    let desc = ListingQuery::new()
        .sorted_by(SortField::Rating, Direction::Desc)
        .apply(rows);
    assert_eq!(ids(&desc), vec![3, 2, 1]);
}

#[test]
fn test_category_filter_is_exact() {
    let rows = vec![
        view(1, "Radio", "", 1.0, Some("Electronics")),
        view(2, "Atlas", "", 1.0, Some("Books")),
        view(3, "Yo-yo", "", 1.0, Some("Toys")),
        view(4, "Box", "", 1.0, None),
        view(5, "Ebook reader", "", 1.0, Some("electronics")),
    ];

    let filtered = ListingQuery::new()
        .in_categories(vec!["Electronics".to_string(), "Books".to_string()])
        .apply(rows);
    assert_eq!(ids(&filtered), vec![1, 2]);
}

#[test]
fn test_search_matches_name_or_about_ignoring_case() {
    let rows = vec![
        view(1, "Smartphone", "", 1.0, None),
        view(2, "Headset", "Pairs with any Phone", 1.0, None),
        view(3, "Kettle", "Boils water", 1.0, None),
    ];

    let found = ListingQuery::new().matching("PHONE").apply(rows);
    assert_eq!(ids(&found), vec![1, 2]);
}

#[test]
fn test_filters_combine() {
    let rows = vec![
        view(1, "Phone case", "", 10.0, Some("Accessories")),
        view(2, "Phone", "", 300.0, Some("Electronics")),
        view(3, "Phone charger", "", 20.0, Some("Electronics")),
        view(4, "Laptop", "", 900.0, Some("Electronics")),
    ];

    let query = ListingQuery::new()
        .sorted_by(SortField::Price, Direction::Asc)
        .in_categories(vec!["Electronics".to_string()])
        .matching("phone");
    assert!(query.matches(&rows[1]));
    assert!(!query.matches(&rows[0]));

    assert_eq!(ids(&query.apply(rows)), vec![3, 2]);
}
