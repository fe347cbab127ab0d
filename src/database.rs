//! Database initialization, table definitions and the catalog store
//!
//! This module handles the setup of the embedded redb database and owns every
//! read and write against it. Handlers never open transactions themselves;
//! they go through [`Catalog`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use redb::{
    Database, ReadTransaction, ReadableDatabase, ReadableTable, ReadableTableMetadata,
    TableDefinition, WriteTransaction,
};

use crate::config::AppConfig;
use crate::media::MediaStore;
use crate::model::{Category, Listing, ListingFields, ListingView};
use crate::query::ListingQuery;

/// Main table for storing listings
///
/// Key: listing id
/// Value: JSON-serialized Listing
pub const TABLE_LISTINGS: TableDefinition<u64, &str> = TableDefinition::new("listings_v1");

/// Table for storing categories
///
/// Key: category id
/// Value: JSON-serialized Category
pub const TABLE_CATEGORIES: TableDefinition<u64, &str> = TableDefinition::new("categories_v1");

/// Unique index from category name to category id
pub const TABLE_CATEGORY_NAMES: TableDefinition<&str, u64> =
    TableDefinition::new("category_names_v1");

/// Last allocated id per entity kind
///
/// Key: sequence name ("listings" or "categories")
/// Value: highest id handed out so far
pub const TABLE_SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences_v1");

const LISTING_SEQUENCE: &str = "listings";
const CATEGORY_SEQUENCE: &str = "categories";

/// Errors raised by the catalog store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] redb::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Category {0} does not exist")]
    UnknownCategory(u64),
}

macro_rules! storage_error_from {
    ($($err:ty),* $(,)?) => {
        $(
            impl From<$err> for StoreError {
                fn from(err: $err) -> Self {
                    StoreError::Storage(err.into())
                }
            }
        )*
    };
}

storage_error_from!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// Application state shared across all request handlers
///
/// Everything inside is either reference counted or immutable, so cloning
/// the state per request is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Listing and category storage
    pub catalog: Catalog,

    /// Where uploaded listing images are written
    pub media: MediaStore,

    /// Token required on write routes, if configured
    pub admin_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(db: Database, config: &AppConfig) -> Self {
        Self {
            catalog: Catalog::new(Arc::new(db)),
            media: MediaStore::new(&config.media_root),
            admin_token: config.admin_token.as_deref().map(Arc::from),
        }
    }
}

/// Initializes the embedded database and creates required tables
///
/// This function:
/// 1. Creates or opens the database file at the specified path
/// 2. Opens every catalog table so later read transactions find them
/// 3. Commits the transaction to ensure tables are persisted
///
/// # Example
///
/// ```no_run
/// # use listings::database::init_db;
/// let db = init_db("data.db").expect("Failed to initialize database");
/// ```
pub fn init_db(db_path: &str) -> Result<Database, redb::Error> {
    let db = Database::create(db_path)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_LISTINGS)?;
        write_txn.open_table(TABLE_CATEGORIES)?;
        write_txn.open_table(TABLE_CATEGORY_NAMES)?;
        write_txn.open_table(TABLE_SEQUENCES)?;
    }
    write_txn.commit()?;

    Ok(db)
}

/// Listing and category store backed by redb
///
/// Every operation runs in its own transaction. Writes are serialized by
/// redb, so id allocation and the category-exists check stay consistent
/// without extra locking.
#[derive(Clone)]
pub struct Catalog {
    db: Arc<Database>,
}

impl Catalog {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// All categories, ordered by name
    pub fn categories(&self) -> Result<Vec<Category>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let mut categories: Vec<Category> = read_categories(&read_txn)?.into_values().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    /// Categories whose name is in `names`, ordered by name
    ///
    /// Unknown names are skipped.
    pub fn categories_named(&self, names: &[String]) -> Result<Vec<Category>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(TABLE_CATEGORY_NAMES)?;
        let table = read_txn.open_table(TABLE_CATEGORIES)?;

        let mut found: Vec<Category> = Vec::new();
        for name in names {
            let Some(id) = index.get(name.as_str())?.map(|guard| guard.value()) else {
                continue;
            };
            if found.iter().any(|category| category.id == id) {
                continue;
            }
            if let Some(value) = table.get(id)? {
                found.push(serde_json::from_str(value.value())?);
            }
        }

        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    /// Returns the category called `name`, creating it when missing
    pub fn ensure_category(&self, name: &str) -> Result<Category, StoreError> {
        let write_txn = self.db.begin_write()?;

        let existing = {
            let index = write_txn.open_table(TABLE_CATEGORY_NAMES)?;
            let id = index.get(name)?.map(|guard| guard.value());
            id
        };

        let category = match existing {
            Some(id) => {
                let table = write_txn.open_table(TABLE_CATEGORIES)?;
                let value = table.get(id)?.map(|guard| guard.value().to_string());
                match value {
                    Some(json) => serde_json::from_str(&json)?,
                    None => return Err(StoreError::UnknownCategory(id)),
                }
            }
            None => {
                let category = Category {
                    id: next_id(&write_txn, CATEGORY_SEQUENCE)?,
                    name: name.to_string(),
                };
                let record_json = serde_json::to_string(&category)?;

                let mut table = write_txn.open_table(TABLE_CATEGORIES)?;
                table.insert(category.id, record_json.as_str())?;

                let mut index = write_txn.open_table(TABLE_CATEGORY_NAMES)?;
                index.insert(category.name.as_str(), category.id)?;

                tracing::info!(category_id = category.id, name = %category.name, "category created");
                category
            }
        };

        write_txn.commit()?;
        Ok(category)
    }

    /// A single listing with its category, or `None` when the id is unknown
    pub fn listing(&self, id: u64) -> Result<Option<ListingView>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_LISTINGS)?;

        let Some(value) = table.get(id)? else {
            return Ok(None);
        };
        let listing: Listing = serde_json::from_str(value.value())?;
        let categories = read_categories(&read_txn)?;

        Ok(Some(view(listing, &categories)))
    }

    /// Runs `query` against every stored listing
    ///
    /// Listings and categories are read in the same transaction, so the
    /// resolved categories always match the listings returned.
    pub fn find(&self, query: &ListingQuery) -> Result<Vec<ListingView>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let categories = read_categories(&read_txn)?;
        let table = read_txn.open_table(TABLE_LISTINGS)?;

        let mut rows = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let listing: Listing = serde_json::from_str(value.value())?;
            rows.push(view(listing, &categories));
        }

        Ok(query.apply(rows))
    }

    pub fn count(&self) -> Result<u64, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_LISTINGS)?;
        Ok(table.len()?)
    }

    /// Persists a new listing and returns it with its allocated id
    pub fn create(&self, fields: ListingFields, image: Option<String>) -> Result<Listing, StoreError> {
        let write_txn = self.db.begin_write()?;
        ensure_category_exists(&write_txn, fields.category_id)?;

        let now = Utc::now();
        let listing = Listing {
            id: next_id(&write_txn, LISTING_SEQUENCE)?,
            name: fields.name,
            about: fields.about,
            category_id: fields.category_id,
            sku: fields.sku,
            price: fields.price,
            rating: fields.rating,
            image_url: fields.image_url,
            image,
            created_at: now,
            updated_at: now,
        };
        let record_json = serde_json::to_string(&listing)?;

        {
            let mut table = write_txn.open_table(TABLE_LISTINGS)?;
            table.insert(listing.id, record_json.as_str())?;
        }
        write_txn.commit()?;

        Ok(listing)
    }

    /// Replaces the editable fields of listing `id`
    ///
    /// The id and creation time are kept. Returns `None` when the listing
    /// does not exist.
    pub fn update(
        &self,
        id: u64,
        fields: ListingFields,
        image: Option<String>,
    ) -> Result<Option<Listing>, StoreError> {
        let write_txn = self.db.begin_write()?;
        ensure_category_exists(&write_txn, fields.category_id)?;

        let listing = {
            let mut table = write_txn.open_table(TABLE_LISTINGS)?;
            let current = table.get(id)?.map(|guard| guard.value().to_string());
            let Some(current) = current else {
                return Ok(None);
            };
            let current: Listing = serde_json::from_str(&current)?;

            let listing = Listing {
                id: current.id,
                name: fields.name,
                about: fields.about,
                category_id: fields.category_id,
                sku: fields.sku,
                price: fields.price,
                rating: fields.rating,
                image_url: fields.image_url,
                image,
                created_at: current.created_at,
                updated_at: Utc::now(),
            };
            let record_json = serde_json::to_string(&listing)?;
            table.insert(id, record_json.as_str())?;
            listing
        };
        write_txn.commit()?;

        Ok(Some(listing))
    }

    /// Removes listing `id` permanently, returning what was removed
    pub fn delete(&self, id: u64) -> Result<Option<Listing>, StoreError> {
        let write_txn = self.db.begin_write()?;

        let removed = {
            let mut table = write_txn.open_table(TABLE_LISTINGS)?;
            let value = table.remove(id)?.map(|guard| guard.value().to_string());
            value
        };
        let Some(removed) = removed else {
            return Ok(None);
        };
        let listing: Listing = serde_json::from_str(&removed)?;

        write_txn.commit()?;
        Ok(Some(listing))
    }
}

/// Allocates the next id of `sequence` inside `write_txn`
fn next_id(write_txn: &WriteTransaction, sequence: &str) -> Result<u64, StoreError> {
    let mut table = write_txn.open_table(TABLE_SEQUENCES)?;
    let last = table.get(sequence)?.map(|guard| guard.value()).unwrap_or(0);
    let next = last + 1;
    table.insert(sequence, next)?;
    Ok(next)
}

fn ensure_category_exists(
    write_txn: &WriteTransaction,
    category_id: Option<u64>,
) -> Result<(), StoreError> {
    let Some(id) = category_id else {
        return Ok(());
    };
    let table = write_txn.open_table(TABLE_CATEGORIES)?;
    if table.get(id)?.is_none() {
        return Err(StoreError::UnknownCategory(id));
    }
    Ok(())
}

fn read_categories(read_txn: &ReadTransaction) -> Result<HashMap<u64, Category>, StoreError> {
    let table = read_txn.open_table(TABLE_CATEGORIES)?;

    let mut categories = HashMap::new();
    for entry in table.iter()? {
        let (_, value) = entry?;
        let category: Category = serde_json::from_str(value.value())?;
        categories.insert(category.id, category);
    }
    Ok(categories)
}

fn view(listing: Listing, categories: &HashMap<u64, Category>) -> ListingView {
    let category = listing
        .category_id
        .and_then(|id| categories.get(&id))
        .cloned();
    ListingView { listing, category }
}
