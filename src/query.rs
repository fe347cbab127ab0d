//! Listing query builder
//!
//! A [`ListingQuery`] is a plain value describing which listings a caller
//! wants and in what order. The store loads the candidate rows and hands them
//! to [`ListingQuery::apply`], which filters and sorts them eagerly.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::str::FromStr;

use crate::model::ListingView;

/// Errors raised while interpreting list parameters
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum QueryError {
    #[error("Cannot sort by '{0}'. Allowed: name, category, price, rating, sku, id")]
    InvalidSortKey(String),
}

/// Fields a listing page may be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// Case-insensitive name
    Name,
    /// Name of the related category
    Category,
    Price,
    Rating,
    Sku,
    Id,
}

impl SortField {
    fn compare(&self, a: &ListingView, b: &ListingView) -> Ordering {
        match self {
            SortField::Name => a
                .listing
                .name
                .to_lowercase()
                .cmp(&b.listing.name.to_lowercase()),
            SortField::Category => {
                missing_last(a.category_name(), b.category_name(), |x, y| x.cmp(y))
            }
            SortField::Price => a.listing.price.total_cmp(&b.listing.price),
            SortField::Rating => {
                missing_last(a.listing.rating, b.listing.rating, |x, y| x.total_cmp(&y))
            }
            SortField::Sku => missing_last(
                a.listing.sku.as_deref(),
                b.listing.sku.as_deref(),
                |x, y| x.cmp(y),
            ),
            SortField::Id => a.listing.id.cmp(&b.listing.id),
        }
    }
}

impl FromStr for SortField {
    type Err = QueryError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key {
            "name" => Ok(SortField::Name),
            "category" => Ok(SortField::Category),
            "price" => Ok(SortField::Price),
            "rating" => Ok(SortField::Rating),
            "sku" => Ok(SortField::Sku),
            "id" => Ok(SortField::Id),
            other => Err(QueryError::InvalidSortKey(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Only the literal `desc` reverses the order.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("desc") => Direction::Desc,
            _ => Direction::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: Direction,
}

/// Filters and ordering for a listing lookup
///
/// # Example
///
/// ```
/// # use listings::query::{Direction, ListingQuery, SortField};
/// let query = ListingQuery::new()
///     .sorted_by(SortField::Price, Direction::Desc)
///     .in_categories(vec!["Books".to_string()])
///     .matching("phone");
/// assert!(query.sort().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
    sort: Option<SortSpec>,
    categories: Option<HashSet<String>>,
    search: Option<String>,
}

impl ListingQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sorted_by(mut self, field: SortField, direction: Direction) -> Self {
        self.sort = Some(SortSpec { field, direction });
        self
    }

    /// Restricts results to listings whose category name is in `names`.
    /// Listings without a category never match.
    pub fn in_categories<I>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.categories = Some(names.into_iter().collect());
        self
    }

    /// Restricts results to listings whose name or about text contains
    /// `term`, ignoring case.
    pub fn matching(mut self, term: &str) -> Self {
        self.search = Some(term.to_lowercase());
        self
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    pub fn matches(&self, view: &ListingView) -> bool {
        if let Some(categories) = &self.categories {
            match view.category_name() {
                Some(name) if categories.contains(name) => {}
                _ => return false,
            }
        }

        if let Some(term) = &self.search {
            let in_name = view.listing.name.to_lowercase().contains(term.as_str());
            let in_about = view.listing.about.to_lowercase().contains(term.as_str());
            if !in_name && !in_about {
                return false;
            }
        }

        true
    }

    /// Filters `rows` and orders the survivors.
    ///
    /// Ties, and the unsorted case, fall back to ascending id.
    pub fn apply(&self, rows: Vec<ListingView>) -> Vec<ListingView> {
        let mut rows: Vec<ListingView> = rows.into_iter().filter(|row| self.matches(row)).collect();

        rows.sort_by(|a, b| {
            let primary = match self.sort {
                Some(SortSpec { field, direction }) => {
                    let ordering = field.compare(a, b);
                    match direction {
                        Direction::Asc => ordering,
                        Direction::Desc => ordering.reverse(),
                    }
                }
                None => Ordering::Equal,
            };
            primary.then_with(|| a.listing.id.cmp(&b.listing.id))
        });

        rows
    }
}

/// Orders present values before missing ones.
fn missing_last<T, F>(a: Option<T>, b: Option<T>, cmp: F) -> Ordering
where
    F: FnOnce(T, T) -> Ordering,
{
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
