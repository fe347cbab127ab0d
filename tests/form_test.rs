//! Tests for listing form validation

use std::collections::HashMap;

use chrono::Utc;

use listings::form::{
    self, ImageChange, ListingForm, ListingSubmission, EMPTY_FILE, FILE_AND_CLEAR, INVALID_CHOICE,
    REQUIRED,
};
use listings::media::Upload;
use listings::model::{Category, Listing};

fn submission(fields: &[(&str, &str)]) -> ListingSubmission {
    ListingSubmission {
        fields: fields
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>(),
        image: None,
    }
}

fn categories() -> Vec<Category> {
    vec![
        Category {
            id: 1,
            name: "Books".to_string(),
        },
        Category {
            id: 2,
            name: "Toys".to_string(),
        },
    ]
}

#[test]
fn test_valid_submission_is_trimmed() {
    let clean = submission(&[
        ("name", "  Atlas  "),
        ("about", "Maps"),
        ("price", " 19.5 "),
        ("category", "1"),
        ("sku", ""),
        ("rating", "4.25"),
        ("image_url", "https://example.com/atlas.png"),
    ])
    .validate(&categories())
    .expect("valid form");

    assert_eq!(clean.fields.name, "Atlas");
    assert_eq!(clean.fields.price, 19.5);
    assert_eq!(clean.fields.category_id, Some(1));
    assert_eq!(clean.fields.sku, None);
    assert_eq!(clean.fields.rating, Some(4.25));
    assert_eq!(
        clean.fields.image_url.as_deref(),
        Some("https://example.com/atlas.png")
    );
    assert_eq!(clean.image, ImageChange::Keep);
}

#[test]
fn test_every_required_field_is_reported() {
    let form = submission(&[("sku", "X-1")])
        .validate(&categories())
        .expect_err("invalid form");

    assert_eq!(form.errors["name"], vec![REQUIRED]);
    assert_eq!(form.errors["about"], vec![REQUIRED]);
    assert_eq!(form.errors["price"], vec![REQUIRED]);
    assert!(!form.errors.contains_key("sku"));
    assert_eq!(form.values["sku"], "X-1");
}

#[test]
fn test_blank_name_counts_as_missing() {
    let form = submission(&[("name", "   "), ("about", "a"), ("price", "1")])
        .validate(&categories())
        .expect_err("invalid form");

    assert_eq!(form.errors["name"], vec![REQUIRED]);
}

#[test]
fn test_range_and_length_rules() {
    let long_name = "n".repeat(255);
    let form = submission(&[
        ("name", long_name.as_str()),
        ("about", "a"),
        ("price", "-1"),
        ("rating", "5.5"),
    ])
    .validate(&categories())
    .expect_err("invalid form");

    assert_eq!(
        form.errors["name"],
        vec!["Ensure this value has at most 254 characters."]
    );
    assert_eq!(
        form.errors["price"],
        vec!["Ensure this value is between 0 and 999999.99."]
    );
    assert_eq!(
        form.errors["rating"],
        vec!["Ensure this value is between 0 and 5."]
    );
}

#[test]
fn test_numbers_are_checked() {
    let form = submission(&[
        ("name", "n"),
        ("about", "a"),
        ("price", "NaN"),
        ("rating", "4.125"),
    ])
    .validate(&categories())
    .expect_err("invalid form");

    assert_eq!(form.errors["price"], vec![form::INVALID_NUMBER]);
    assert_eq!(form.errors["rating"], vec![form::TOO_MANY_DECIMALS]);
}

#[test]
fn test_unknown_category_is_an_invalid_choice() {
    for raw in ["3", "Books", "-1"] {
        let form = submission(&[("name", "n"), ("about", "a"), ("price", "1"), ("category", raw)])
            .validate(&categories())
            .expect_err("invalid form");

        assert_eq!(form.errors["category"], vec![INVALID_CHOICE], "{raw}");
    }
}

#[test]
fn test_image_rules() {
    let fields = [("name", "n"), ("about", "a"), ("price", "1")];

    let mut with_image = submission(&fields);
    with_image.image = Some(Upload {
        file_name: "Photo.JPG".to_string(),
        bytes: vec![1, 2, 3],
    });
    let clean = with_image.validate(&categories()).expect("valid form");
    assert!(matches!(clean.image, ImageChange::Replace(ref upload) if upload.file_name == "Photo.JPG"));

    let mut empty = submission(&fields);
    empty.image = Some(Upload {
        file_name: "photo.png".to_string(),
        bytes: Vec::new(),
    });
    let form = empty.validate(&categories()).expect_err("invalid form");
    assert_eq!(form.errors["image"], vec![EMPTY_FILE]);

    let mut both = submission(&[("name", "n"), ("about", "a"), ("price", "1"), ("image-clear", "on")]);
    both.image = Some(Upload {
        file_name: "photo.png".to_string(),
        bytes: vec![1],
    });
    let form = both.validate(&categories()).expect_err("invalid form");
    assert_eq!(form.errors["image"], vec![FILE_AND_CLEAR]);

    let clear = submission(&[("name", "n"), ("about", "a"), ("price", "1"), ("image-clear", "on")])
        .validate(&categories())
        .expect("valid form");
    assert_eq!(clear.image, ImageChange::Clear);
}

#[test]
fn test_form_prefilled_from_listing() {
    let now = Utc::now();
    let listing = Listing {
        id: 4,
        name: "Kite".to_string(),
        about: "Flies".to_string(),
        category_id: Some(2),
        sku: Some("K-4".to_string()),
        price: 8.0,
        rating: Some(3.5),
        image_url: None,
        image: Some("kite_ab12CD.png".to_string()),
        created_at: now,
        updated_at: now,
    };

    let form = ListingForm::from_listing(&listing);
    assert!(form.is_valid());
    assert_eq!(form.values["name"], "Kite");
    assert_eq!(form.values["price"], "8.00");
    assert_eq!(form.values["rating"], "3.50");
    assert_eq!(form.values["category"], "2");
    assert_eq!(form.values["sku"], "K-4");
    assert_eq!(form.values["image"], "kite_ab12CD.png");
    assert!(!form.values.contains_key("image_url"));

    assert_eq!(ListingForm::blank(), ListingForm::default());
}
