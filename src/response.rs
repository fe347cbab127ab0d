//! Page and redirect responses
//!
//! Rendering is left to whatever sits in front of this service. A page is the
//! JSON context a template would receive plus the messages for this request:
//!
//! ```json
//! { "messages": [{ "level": "info", "text": "You are editing Lamp" }], "listing": { ... } }
//! ```
//!
//! A redirect is a `303 See Other` whose body carries the messages the next
//! page would have shown.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Error,
}

/// A leveled notice for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub level: Level,
    pub text: String,
}

impl Message {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            text: text.into(),
        }
    }
}

/// A rendered page: status, context and messages
#[derive(Debug)]
pub struct Page<T> {
    status: StatusCode,
    context: T,
    messages: Vec<Message>,
}

impl<T: Serialize> Page<T> {
    pub fn new(context: T) -> Self {
        Self {
            status: StatusCode::OK,
            context,
            messages: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }
}

#[derive(Serialize)]
struct PageBody<'a, T> {
    messages: &'a [Message],
    #[serde(flatten)]
    context: &'a T,
}

impl<T: Serialize> IntoResponse for Page<T> {
    fn into_response(self) -> Response {
        let body = PageBody {
            messages: &self.messages,
            context: &self.context,
        };
        (self.status, Json(body)).into_response()
    }
}

/// A `303 See Other` redirect with the messages for the next page
#[derive(Debug)]
pub struct SeeOther {
    location: String,
    messages: Vec<Message>,
}

impl SeeOther {
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            messages: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }
}

impl IntoResponse for SeeOther {
    fn into_response(self) -> Response {
        let body = json!({
            "redirect": self.location,
            "messages": self.messages,
        });
        (
            StatusCode::SEE_OTHER,
            [(header::LOCATION, self.location)],
            Json(body),
        )
            .into_response()
    }
}
