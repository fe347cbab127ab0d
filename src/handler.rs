//! HTTP request handlers for the listing catalog
//!
//! This module implements the catalog's pages:
//! - Listing browse page with sorting, category filtering and search
//! - Listing detail page
//! - Add, edit and delete flows for listings
//! - Category choices for the listing form

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::database::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::{ListQuery, ListingId};
use crate::form::{CleanListing, ImageChange, ListingForm, ListingSubmission};
use crate::model::{Category, Listing, ListingView};
use crate::query::{Direction, ListingQuery, SortField};
use crate::response::{Message, Page, SeeOther};

pub const LISTINGS_PATH: &str = "/listings";

pub const EMPTY_SEARCH: &str = "You didn't enter any search criteria!";
pub const ADDED: &str = "Successfully added listing!";
pub const ADD_FAILED: &str = "Failed to add listing. Please ensure the form is valid.";
pub const UPDATED: &str = "Successfully updated listing!";
pub const UPDATE_FAILED: &str = "Failed to update listing. Please ensure the form is valid.";
pub const DELETED: &str = "Listing deleted!";

pub fn detail_path(listing_id: u64) -> String {
    format!("{LISTINGS_PATH}/{listing_id}")
}

/// Descriptor of the active sort, e.g. `price_desc`
///
/// Missing parts render as `None`, so a page without sort parameters reports
/// `None_None`.
pub fn current_sorting(sort: Option<&str>, direction: Option<&str>) -> String {
    format!(
        "{}_{}",
        sort.unwrap_or("None"),
        direction.unwrap_or("None")
    )
}

#[derive(Serialize)]
struct ListingsContext<'a> {
    listings: Vec<ListingView>,
    search_term: Option<&'a str>,
    current_categories: Option<Vec<Category>>,
    current_sorting: String,
}

/// Lists listings with optional sorting, category filter and search
///
/// # Query Parameters
///
/// - `sort` (optional) - `name`, `category`, `price`, `rating`, `sku` or `id`
/// - `direction` (optional) - `desc` reverses the order; ignored without `sort`
/// - `category` (optional) - comma-separated category names
/// - `q` (optional) - search term matched against name and about text
///
/// # Example Request
///
/// `GET /listings?sort=name&direction=desc&category=Books,Toys&q=phone`
///
/// # Response
///
/// - **200 OK** - `listings`, `search_term`, `current_categories`, `current_sorting`
/// - **303 See Other** - `q` was present but empty; back to `/listings` with an error
/// - **400 Bad Request** - unknown sort key or malformed query string
///
/// The empty-search redirect takes precedence over sort key validation.
pub async fn all_listings(
    State(state): State<AppState>,
    ListQuery(params): ListQuery,
) -> AppResult<Response> {
    if params.q.as_deref() == Some("") {
        return Ok(SeeOther::to(LISTINGS_PATH)
            .with_message(Message::error(EMPTY_SEARCH))
            .into_response());
    }

    let mut query = ListingQuery::new();
    let mut sort = None;
    let mut direction = None;

    if let Some(key) = params.sort.as_deref() {
        let field: SortField = key.parse()?;
        sort = Some(key);
        direction = params.direction.as_deref();
        query = query.sorted_by(field, Direction::from_param(direction));
    }

    let mut current_categories = None;
    if let Some(raw) = params.category.as_deref() {
        let names: Vec<String> = raw.split(',').map(str::to_string).collect();
        current_categories = Some(state.catalog.categories_named(&names)?);
        query = query.in_categories(names);
    }

    if let Some(term) = params.q.as_deref() {
        query = query.matching(term);
    }

    let listings = state.catalog.find(&query)?;
    tracing::debug!(count = listings.len(), ?sort, ?direction, "listings query");

    let context = ListingsContext {
        listings,
        search_term: params.q.as_deref(),
        current_categories,
        current_sorting: current_sorting(sort, direction),
    };
    Ok(Page::new(context).into_response())
}

/// Shows a single listing
///
/// # Response
///
/// - **200 OK** - `listing` with its resolved `category`
/// - **404 Not Found** - no listing with this id
pub async fn listing_detail(
    State(state): State<AppState>,
    ListingId(listing_id): ListingId,
) -> AppResult<Response> {
    let listing = state
        .catalog
        .listing(listing_id)?
        .ok_or_else(|| AppError::listing_not_found(listing_id))?;

    Ok(Page::new(json!({ "listing": listing })).into_response())
}

/// Displays an empty add-listing form
pub async fn add_listing_form(State(state): State<AppState>) -> AppResult<Response> {
    let categories = state.catalog.categories()?;

    Ok(Page::new(json!({
        "form": ListingForm::blank(),
        "categories": categories,
    }))
    .into_response())
}

/// Creates a listing from a submitted form
///
/// # Response
///
/// - **303 See Other** - to the new listing's detail page
/// - **422 Unprocessable Entity** - the form with field errors; nothing stored
pub async fn add_listing(
    State(state): State<AppState>,
    submission: ListingSubmission,
) -> AppResult<Response> {
    let categories = state.catalog.categories()?;

    let clean = match submission.validate(&categories) {
        Ok(clean) => clean,
        Err(form) => {
            tracing::debug!(errors = ?form.errors, "add listing form rejected");
            return Ok(Page::new(json!({
                "form": form,
                "categories": categories,
            }))
            .with_status(StatusCode::UNPROCESSABLE_ENTITY)
            .with_message(Message::error(ADD_FAILED))
            .into_response());
        }
    };

    let listing = create_listing(&state, clean).await?;
    tracing::info!(listing_id = listing.id, name = %listing.name, "listing added");

    Ok(SeeOther::to(detail_path(listing.id))
        .with_message(Message::success(ADDED))
        .into_response())
}

/// Displays the edit form prefilled from the listing
///
/// # Response
///
/// - **200 OK** - `form`, `listing`, `categories` and an info message
/// - **404 Not Found** - no listing with this id
pub async fn edit_listing_form(
    State(state): State<AppState>,
    ListingId(listing_id): ListingId,
) -> AppResult<Response> {
    let view = state
        .catalog
        .listing(listing_id)?
        .ok_or_else(|| AppError::listing_not_found(listing_id))?;
    let categories = state.catalog.categories()?;
    let notice = Message::info(format!("You are editing {}", view.listing.name));

    Ok(Page::new(json!({
        "form": ListingForm::from_listing(&view.listing),
        "listing": view,
        "categories": categories,
    }))
    .with_message(notice)
    .into_response())
}

/// Updates a listing in place from a submitted form
///
/// Without a new upload the stored image is kept, unless `image-clear` is set.
///
/// # Response
///
/// - **303 See Other** - to the listing's detail page
/// - **404 Not Found** - no listing with this id
/// - **422 Unprocessable Entity** - the form with field errors; nothing changed
pub async fn edit_listing(
    State(state): State<AppState>,
    ListingId(listing_id): ListingId,
    submission: ListingSubmission,
) -> AppResult<Response> {
    let view = state
        .catalog
        .listing(listing_id)?
        .ok_or_else(|| AppError::listing_not_found(listing_id))?;
    let categories = state.catalog.categories()?;

    let clean = match submission.validate(&categories) {
        Ok(clean) => clean,
        Err(form) => {
            tracing::debug!(listing_id, errors = ?form.errors, "edit listing form rejected");
            return Ok(Page::new(json!({
                "form": form,
                "listing": view,
                "categories": categories,
            }))
            .with_status(StatusCode::UNPROCESSABLE_ENTITY)
            .with_message(Message::error(UPDATE_FAILED))
            .into_response());
        }
    };

    let listing = update_listing(&state, listing_id, clean, view.listing.image)
        .await?
        .ok_or_else(|| AppError::listing_not_found(listing_id))?;
    tracing::info!(listing_id, name = %listing.name, "listing updated");

    Ok(SeeOther::to(detail_path(listing_id))
        .with_message(Message::success(UPDATED))
        .into_response())
}

/// Stores a validated listing, writing its uploaded image first
///
/// The image is removed again when the listing cannot be stored.
pub async fn create_listing(state: &AppState, clean: CleanListing) -> AppResult<Listing> {
    let image = match &clean.image {
        ImageChange::Replace(upload) => Some(state.media.save(upload).await?),
        ImageChange::Keep | ImageChange::Clear => None,
    };

    match state.catalog.create(clean.fields, image.clone()) {
        Ok(listing) => Ok(listing),
        Err(err) => {
            if let Some(stored) = &image {
                state.media.discard(stored).await;
            }
            Err(err.into())
        }
    }
}

/// Applies a validated form to listing `listing_id`
///
/// `current_image` is what the listing holds now and survives an
/// [`ImageChange::Keep`]. A freshly uploaded image is removed again when the
/// update fails or the listing is gone.
pub async fn update_listing(
    state: &AppState,
    listing_id: u64,
    clean: CleanListing,
    current_image: Option<String>,
) -> AppResult<Option<Listing>> {
    let (image, uploaded) = match &clean.image {
        ImageChange::Keep => (current_image, None),
        ImageChange::Clear => (None, None),
        ImageChange::Replace(upload) => {
            let stored = state.media.save(upload).await?;
            (Some(stored.clone()), Some(stored))
        }
    };

    let result = state.catalog.update(listing_id, clean.fields, image);
    if let (Ok(None) | Err(_), Some(stored)) = (&result, &uploaded) {
        state.media.discard(stored).await;
    }
    Ok(result?)
}

/// Deletes a listing permanently
///
/// # Response
///
/// - **303 See Other** - to `/listings`
/// - **404 Not Found** - no listing with this id
pub async fn delete_listing(
    State(state): State<AppState>,
    ListingId(listing_id): ListingId,
) -> AppResult<Response> {
    let listing = state
        .catalog
        .delete(listing_id)?
        .ok_or_else(|| AppError::listing_not_found(listing_id))?;
    tracing::info!(listing_id, name = %listing.name, "listing deleted");

    Ok(SeeOther::to(LISTINGS_PATH)
        .with_message(Message::success(DELETED))
        .into_response())
}

/// Lists every category, ordered by name
pub async fn all_categories(State(state): State<AppState>) -> AppResult<Response> {
    let categories = state.catalog.categories()?;
    Ok(Page::new(json!({ "categories": categories })).into_response())
}
