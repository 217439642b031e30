//! RSS / Atom feed parsing
//!
//! Reads `<item>` (RSS 2.0) and `<entry>` (Atom) elements with a streaming
//! reader. Channel-level metadata is ignored.

use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use reqwest::Client;
use reqwest::header::ACCEPT;

use crate::error::{ResearchError, Result};
use crate::http;
use crate::model::parse_timestamp;

/// One feed entry with markup stripped from the description
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub description: String,
    /// Outlet named by a `<source>` element (Google News sets this)
    pub source: Option<String>,
    pub published: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy)]
enum Field {
    Title,
    Link,
    Description,
    Source,
    Published,
}

/// Entry under construction; the date stays raw until the entry closes
#[derive(Default)]
struct Draft {
    entry: FeedEntry,
    published: String,
}

impl Draft {
    fn push(&mut self, field: Field, text: &str) {
        let target = match field {
            Field::Title => &mut self.entry.title,
            Field::Link => &mut self.entry.link,
            Field::Description => &mut self.entry.description,
            Field::Source => self.entry.source.get_or_insert_with(String::new),
            Field::Published => &mut self.published,
        };
        target.push_str(text);
    }

    fn finish(mut self) -> FeedEntry {
        self.entry.title = self.entry.title.trim().to_string();
        self.entry.link = self.entry.link.trim().to_string();
        self.entry.description = strip_markup(&self.entry.description);
        self.entry.published = parse_timestamp(&self.published);
        self.entry
    }
}

/// Fetch a feed and parse its entries
pub async fn fetch_feed(
    client: &Client,
    service: &'static str,
    url: &str,
    query: &[(&str, &str)],
) -> Result<Vec<FeedEntry>> {
    let response = client
        .get(url)
        .header(ACCEPT, http::RSS_ACCEPT)
        .query(query)
        .send()
        .await?;

    let body = http::check_status(service, response).await?.text().await?;
    parse_feed(service, &body)
}

/// Parse RSS 2.0 or Atom XML into entries, in document order
pub fn parse_feed(service: &'static str, xml: &str) -> Result<Vec<FeedEntry>> {
    let malformed = |e: &dyn std::fmt::Display| {
        ResearchError::upstream(service, format!("malformed feed: {e}"))
    };

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut draft: Option<Draft> = None;
    let mut field: Option<Field> = None;
    // Open elements inside the current entry; fields come from direct children only
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if draft.is_none() {
                    if matches!(e.local_name().as_ref(), b"item" | b"entry") {
                        draft = Some(Draft::default());
                        depth = 0;
                    }
                    continue;
                }
                let Some(d) = draft.as_mut() else { continue };

                field = None;
                if depth == 0 {
                    field = child_field(&e);
                    // Keep the first date when both published and updated are present
                    if matches!(field, Some(Field::Published)) && !d.published.is_empty() {
                        field = None;
                    }
                    if matches!(field, Some(Field::Link)) && d.entry.link.is_empty() {
                        if let Some(href) = href(&e) {
                            d.entry.link = href;
                            field = None;
                        }
                    }
                }
                depth += 1;
            }
            Ok(Event::Empty(e)) => {
                // Atom: <link href="..."/>
                if let Some(d) = draft.as_mut() {
                    if depth == 0 && matches!(child_field(&e), Some(Field::Link)) {
                        if let Some(href) = href(&e) {
                            if d.entry.link.is_empty() {
                                d.entry.link = href;
                            }
                        }
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some(d), Some(f)) = (draft.as_mut(), field) {
                    let text = t.unescape().map_err(|e| malformed(&e))?;
                    d.push(f, &text);
                }
            }
            Ok(Event::CData(c)) => {
                if let (Some(d), Some(f)) = (draft.as_mut(), field) {
                    d.push(f, &String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::End(_)) => {
                field = None;
                if draft.is_some() {
                    if depth == 0 {
                        if let Some(d) = draft.take() {
                            entries.push(d.finish());
                        }
                    } else {
                        depth -= 1;
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(&e)),
            Ok(_) => {}
        }
    }

    Ok(entries)
}

/// Field carried by a direct entry child; namespaced elements other than
/// dates (`dc:date`) belong to extensions such as `media:` and are skipped
fn child_field(e: &BytesStart<'_>) -> Option<Field> {
    let prefixed = e.name().prefix().is_some();
    match e.local_name().as_ref() {
        b"title" if !prefixed => Some(Field::Title),
        b"link" if !prefixed => Some(Field::Link),
        b"description" | b"summary" if !prefixed => Some(Field::Description),
        b"source" if !prefixed => Some(Field::Source),
        b"pubDate" | b"published" | b"updated" | b"date" => Some(Field::Published),
        _ => None,
    }
}

fn href(e: &BytesStart<'_>) -> Option<String> {
    let attr = e.try_get_attribute("href").ok()??;
    attr.unescape_value().ok().map(|v| v.trim().to_string())
}

/// Drop HTML tags and collapse whitespace
pub fn strip_markup(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;

    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }

    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
