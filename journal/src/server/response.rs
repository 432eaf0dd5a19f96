//! HTTP response rendering for the journal server.
//!
//! Entries are rendered as an HTML page by default. Clients that send
//! `Accept: application/json` get the same entries as a JSON document.

use std::fmt::{self, Write};

use axum::Json;
use axum::http::{HeaderMap, header};
use axum::response::{Html, IntoResponse, Response};
use serde::Serialize;

use crate::model::{JournalEntry, Scope};

const CONTENT_TYPE_JSON: &str = "application/json";

/// Desired response format based on Accept header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Html,
    Json,
}

impl ResponseFormat {
    /// Determine response format from request headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let wants_json = headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(|accept| accept.contains(CONTENT_TYPE_JSON))
            .unwrap_or(false);

        if wants_json {
            ResponseFormat::Json
        } else {
            ResponseFormat::Html
        }
    }
}

/// JSON view of one entry.
#[derive(Debug, Serialize)]
pub struct EntryView<'a> {
    pub sequence: u64,
    pub id: &'a str,
    pub name: &'a str,
    pub value: &'a str,
}

/// JSON view of a scope's entries.
#[derive(Debug, Serialize)]
pub struct EntriesView<'a> {
    pub scope: &'a str,
    pub entries: Vec<EntryView<'a>>,
}

impl<'a> EntriesView<'a> {
    fn new(scope: &'a Scope, entries: &'a [JournalEntry]) -> Self {
        Self {
            scope: scope.as_str(),
            entries: entries
                .iter()
                .map(|e| EntryView {
                    sequence: e.sequence,
                    id: &e.entry.id,
                    name: &e.entry.name,
                    value: &e.entry.value,
                })
                .collect(),
        }
    }
}

/// Renders `entries` in the requested format.
pub fn render_entries(
    scope: &Scope,
    entries: &[JournalEntry],
    format: ResponseFormat,
) -> Result<Response, fmt::Error> {
    match format {
        ResponseFormat::Json => Ok(Json(EntriesView::new(scope, entries)).into_response()),
        ResponseFormat::Html => Ok(Html(render_html(scope, entries)?).into_response()),
    }
}

const FAVICON: &str = "data:image/svg+xml,<svg xmlns='http://www.w3.org/2000/svg' \
viewBox='0 0 32 32'><text y='24' font-size='24'>🦋</text></svg>";

/// Renders the HTML entry listing. All user-supplied text is escaped.
pub fn render_html(scope: &Scope, entries: &[JournalEntry]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html>")?;
    writeln!(out, "<head>")?;
    writeln!(out, "    <title>Entries</title>")?;
    writeln!(out, "    <link rel=\"icon\" href=\"{}\">", escape_html(FAVICON))?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "    <h1>Entries for {}</h1>", escape_html(scope.as_str()))?;
    writeln!(out, "    <ul>")?;
    for entry in entries {
        writeln!(
            out,
            "        <li>ID: {}, Name: {}, Value: {}</li>",
            escape_html(&entry.entry.id),
            escape_html(&entry.entry.name),
            escape_html(&entry.entry.value),
        )?;
    }
    writeln!(out, "    </ul>")?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")?;
    Ok(out)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
