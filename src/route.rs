//! Route definitions for the listing catalog
//!
//! This module configures all HTTP routes and maps them to their respective handlers.

use axum::middleware;
use axum::routing::get;
use axum::Router;

use crate::database::AppState;
use crate::handler::{
    add_listing, add_listing_form, all_categories, all_listings, delete_listing, edit_listing,
    edit_listing_form, listing_detail,
};
use crate::middleware::admin_middleware;

/// Creates and configures the application router with all routes
///
/// # Route Definitions
///
/// - `GET /listings` - Browse listings (sort, direction, category, q)
/// - `GET /listings/{id}` - Listing detail
/// - `GET|POST /listings/add` - Add-listing form and submission
/// - `GET|POST /listings/{id}/edit` - Edit form and submission
/// - `GET|POST /listings/{id}/delete` - Delete a listing
/// - `GET /categories` - Category choices
///
/// Add, edit and delete sit behind the admin token check.
///
/// # Example Usage
///
/// ```no_run
/// # use listings::config::AppConfig;
/// # use listings::database::{init_db, AppState};
/// # use listings::route::create_app;
/// # let db = init_db("data.db").unwrap();
/// let state = AppState::new(db, &AppConfig::default());
/// let app = create_app(state);
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    let write_routes = Router::new()
        .route("/listings/add", get(add_listing_form).post(add_listing))
        .route(
            "/listings/{id}/edit",
            get(edit_listing_form).post(edit_listing),
        )
        .route(
            "/listings/{id}/delete",
            get(delete_listing).post(delete_listing),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_middleware,
        ));

    Router::new()
        .route("/listings", get(all_listings))
        .route("/listings/{id}", get(listing_detail))
        .route("/categories", get(all_categories))
        .merge(write_routes)
        .with_state(state)
}
