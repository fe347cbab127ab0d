//! Listing form: submission extraction and validation
//!
//! Add and edit pages accept either `application/x-www-form-urlencoded` or
//! `multipart/form-data` bodies. [`ListingSubmission`] reads both into the
//! same shape, and [`ListingSubmission::validate`] turns it into
//! [`ListingFields`] or a [`ListingForm`] carrying field errors for
//! redisplay.

use std::collections::{BTreeMap, HashMap};

use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header;
use axum::Form;
use serde::Serialize;
use validator::Validate;

use crate::error::AppError;
use crate::media::{Upload, IMAGE_EXTENSIONS};
use crate::model::{Category, Listing, ListingFields};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_NUMBER: &str = "Enter a number.";
pub const TOO_MANY_DECIMALS: &str = "Ensure that there are no more than 2 decimal places.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
pub const EMPTY_FILE: &str = "The submitted file is empty.";
pub const FILE_AND_CLEAR: &str =
    "Please either submit a file or check the clear checkbox, not both.";

/// Text fields echoed back when a form is redisplayed
const TEXT_FIELDS: [&str; 7] = ["name", "about", "category", "sku", "price", "rating", "image_url"];

/// Checkbox that removes the stored image on edit
const IMAGE_CLEAR: &str = "image-clear";

/// A listing form as shown to the user
///
/// `values` holds the raw text of every field, `errors` maps a field name to
/// its messages. A blank form has neither.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ListingForm {
    pub values: BTreeMap<String, String>,
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ListingForm {
    pub fn blank() -> Self {
        Self::default()
    }

    /// Form prefilled from an existing listing
    pub fn from_listing(listing: &Listing) -> Self {
        let mut values = BTreeMap::new();
        values.insert("name".to_string(), listing.name.clone());
        values.insert("about".to_string(), listing.about.clone());
        values.insert("price".to_string(), format!("{:.2}", listing.price));
        if let Some(category_id) = listing.category_id {
            values.insert("category".to_string(), category_id.to_string());
        }
        if let Some(sku) = &listing.sku {
            values.insert("sku".to_string(), sku.clone());
        }
        if let Some(rating) = listing.rating {
            values.insert("rating".to_string(), format!("{rating:.2}"));
        }
        if let Some(image_url) = &listing.image_url {
            values.insert("image_url".to_string(), image_url.clone());
        }
        if let Some(image) = &listing.image {
            values.insert("image".to_string(), image.clone());
        }

        Self {
            values,
            errors: BTreeMap::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn add_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }
}

/// What to do with the stored image when a form is saved
#[derive(Debug, Clone, PartialEq)]
pub enum ImageChange {
    Keep,
    Clear,
    Replace(Upload),
}

/// A successfully validated submission
#[derive(Debug, Clone, PartialEq)]
pub struct CleanListing {
    pub fields: ListingFields,
    pub image: ImageChange,
}

/// Rules the `validator` crate checks once raw text has been parsed
#[derive(Debug, Validate)]
struct ListingInput {
    #[validate(length(max = 254, message = "Ensure this value has at most 254 characters."))]
    name: String,

    #[validate(length(max = 254, message = "Ensure this value has at most 254 characters."))]
    sku: Option<String>,

    #[validate(range(
        min = 0.0,
        max = 999999.99,
        message = "Ensure this value is between 0 and 999999.99."
    ))]
    price: Option<f64>,

    #[validate(range(min = 0.0, max = 5.0, message = "Ensure this value is between 0 and 5."))]
    rating: Option<f64>,

    #[validate(
        url(message = "Enter a valid URL."),
        length(max = 1024, message = "Ensure this value has at most 1024 characters.")
    )]
    image_url: Option<String>,
}

/// A submitted add/edit form, before validation
#[derive(Debug, Clone, Default)]
pub struct ListingSubmission {
    pub fields: HashMap<String, String>,
    pub image: Option<Upload>,
}

impl ListingSubmission {
    /// Trimmed value of `name`, `None` when missing or blank
    fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    /// Validates the submission against the listing schema
    ///
    /// `categories` are the valid choices for the `category` field. On
    /// failure the returned form echoes the submitted text with errors.
    pub fn validate(&self, categories: &[Category]) -> Result<CleanListing, ListingForm> {
        let mut form = ListingForm {
            values: TEXT_FIELDS
                .iter()
                .filter_map(|field| {
                    self.fields
                        .get(*field)
                        .map(|value| (field.to_string(), value.clone()))
                })
                .collect(),
            errors: BTreeMap::new(),
        };

        let name = self.text("name");
        if name.is_none() {
            form.add_error("name", REQUIRED);
        }

        let about = self.text("about");
        if about.is_none() {
            form.add_error("about", REQUIRED);
        }

        let price = match self.text("price") {
            Some(raw) => parse_decimal(&raw).map_err(|msg| form.add_error("price", msg)).ok(),
            None => {
                form.add_error("price", REQUIRED);
                None
            }
        };

        let rating = match self.text("rating") {
            Some(raw) => parse_decimal(&raw).map_err(|msg| form.add_error("rating", msg)).ok(),
            None => None,
        };

        let category_id = match self.text("category") {
            Some(raw) => {
                let chosen = raw
                    .parse::<u64>()
                    .ok()
                    .filter(|id| categories.iter().any(|category| category.id == *id));
                if chosen.is_none() {
                    form.add_error("category", INVALID_CHOICE);
                }
                chosen
            }
            None => None,
        };

        let image = self.image_change(&mut form);

        let input = ListingInput {
            name: name.clone().unwrap_or_default(),
            sku: self.text("sku"),
            price,
            rating,
            image_url: self.text("image_url"),
        };
        if let Err(errors) = input.validate() {
            for (field, field_errors) in errors.field_errors() {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    form.add_error(&field, message);
                }
            }
        }

        match (name, about, price) {
            (Some(name), Some(about), Some(price)) if form.is_valid() => Ok(CleanListing {
                fields: ListingFields {
                    name,
                    about,
                    category_id,
                    sku: input.sku,
                    price,
                    rating,
                    image_url: input.image_url,
                },
                image,
            }),
            _ => Err(form),
        }
    }

    fn image_change(&self, form: &mut ListingForm) -> ImageChange {
        let clear = self
            .fields
            .get(IMAGE_CLEAR)
            .is_some_and(|value| !value.is_empty());

        match (&self.image, clear) {
            (Some(_), true) => {
                form.add_error("image", FILE_AND_CLEAR);
                ImageChange::Keep
            }
            (Some(upload), false) => {
                if upload.bytes.is_empty() {
                    form.add_error("image", EMPTY_FILE);
                    return ImageChange::Keep;
                }
                let is_image = upload
                    .extension()
                    .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()));
                if !is_image {
                    form.add_error("image", INVALID_IMAGE);
                    return ImageChange::Keep;
                }
                ImageChange::Replace(upload.clone())
            }
            (None, true) => ImageChange::Clear,
            (None, false) => ImageChange::Keep,
        }
    }
}

/// Parses a decimal with at most two fractional digits
fn parse_decimal(raw: &str) -> Result<f64, &'static str> {
    let value: f64 = raw.parse().map_err(|_| INVALID_NUMBER)?;
    if !value.is_finite() {
        return Err(INVALID_NUMBER);
    }
    let decimals = raw.split_once('.').map_or(0, |(_, fraction)| fraction.len());
    if decimals > 2 {
        return Err(TOO_MANY_DECIMALS);
    }
    Ok(value)
}

impl<S> FromRequest<S> for ListingSubmission
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|content_type| content_type.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
            return Ok(Self {
                fields,
                image: None,
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        let mut submission = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            if name == "image" {
                let file_name = field.file_name().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                // browsers send an empty part when no file was chosen
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                submission.image = Some(Upload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                submission.fields.insert(name, text);
            }
        }

        Ok(submission)
    }
}
