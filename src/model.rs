//! Data models for the listing catalog
//!
//! This module defines the records kept in the database, the views handed to
//! the presentation layer, and the query parameters accepted by the list page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named grouping of listings
///
/// Category names are unique across the catalog.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Category {
    /// Unique identifier allocated by the store
    pub id: u64,

    /// Display name, also the key used by the `category` list filter
    pub name: String,
}

/// Represents a listing record stored in the database
///
/// This structure contains everything the catalog knows about an item:
/// - The unique identifier
/// - Name and free-form "about" text
/// - Optional category reference
/// - Commerce attributes (sku, price, rating)
/// - Image references (external URL or uploaded file)
/// - Creation and last-update timestamps
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Listing {
    /// Unique identifier, never reused after deletion
    pub id: u64,

    /// Display name of the listing
    pub name: String,

    /// Free-form description
    pub about: String,

    /// Reference to the owning category, if any
    /// Must point at an existing category
    pub category_id: Option<u64>,

    /// Stock keeping unit
    #[serde(default)]
    pub sku: Option<String>,

    /// Price in the store currency, at most two decimal places
    pub price: f64,

    /// Average rating between 0 and 5
    #[serde(default)]
    pub rating: Option<f64>,

    /// External image location
    #[serde(default)]
    pub image_url: Option<String>,

    /// File name of the uploaded image, relative to the media root
    #[serde(default)]
    pub image: Option<String>,

    /// Timestamp when this listing was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last successful edit
    pub updated_at: DateTime<Utc>,
}

/// A listing together with its resolved category
///
/// This is what list and detail pages hand to the presentation layer.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ListingView {
    #[serde(flatten)]
    pub listing: Listing,

    /// The category referenced by `listing.category_id`
    pub category: Option<Category>,
}

impl ListingView {
    /// Name of the resolved category, if the listing has one
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|category| category.name.as_str())
    }
}

/// Query parameters for the listings page
///
/// # Example
/// Query string: `?sort=price&direction=desc&category=Books,Toys&q=phone`
#[derive(Deserialize, Debug, Default)]
pub struct ListParams {
    /// Field to sort by (`name`, `category`, `price`, `rating`, `sku`, `id`)
    pub sort: Option<String>,

    /// `desc` reverses the order, anything else sorts ascending
    /// Only read when `sort` is present
    pub direction: Option<String>,

    /// Comma-separated category names to restrict the results to
    pub category: Option<String>,

    /// Free-text term matched against name and about text
    /// Present but empty is an error, absent means no search
    pub q: Option<String>,
}

/// The editable part of a listing, as produced by a validated form
#[derive(Debug, Clone, PartialEq)]
pub struct ListingFields {
    pub name: String,
    pub about: String,
    pub category_id: Option<u64>,
    pub sku: Option<String>,
    pub price: f64,
    pub rating: Option<f64>,
    pub image_url: Option<String>,
}
