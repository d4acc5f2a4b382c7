//! Page snapshot consumed by the detection engine.
//!
//! `MatchContext` is a fully materialized, read-only snapshot: body text with
//! any external script bodies appended, URL components, lowercased headers and
//! cookies, and the discovered resource URLs. How it is produced is up to the
//! caller; `MatchContextBuilder` assembles one from already-fetched parts
//! without doing any network I/O.

mod extract;
mod headers;

use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::HashSet;
use url::Url;

use extract::extract_resource_urls;
use headers::{parse_cookie_header, parse_cookie_pair, parse_header_line, parse_set_cookie};

/// Snapshot of a fetched page.
///
/// Header and cookie maps are keyed by lowercased name and ordered, so
/// evaluation (and therefore evidence) is deterministic.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchContext {
    /// Page body plus appended external script bodies
    pub html: String,
    /// Requested URL
    pub url: String,
    /// Hostname of `url` (empty if it cannot be parsed)
    pub hostname: String,
    /// Path of `url` (empty if it cannot be parsed)
    pub path: String,
    /// Response headers, lowercased names
    pub headers: BTreeMap<String, String>,
    /// Cookies, lowercased names
    pub cookies: BTreeMap<String, String>,
    /// Script sources and other discovered resource URLs
    pub resource_urls: Vec<String>,
}

impl MatchContext {
    /// Starts building a context for a page fetched from `url`.
    pub fn builder(url: impl Into<String>) -> MatchContextBuilder {
        MatchContextBuilder::new(url)
    }
}

/// Assembles a `MatchContext` from already-fetched page parts.
#[derive(Debug, Clone, Default)]
pub struct MatchContextBuilder {
    url: String,
    html: String,
    script_bodies: Vec<String>,
    headers: BTreeMap<String, String>,
    cookies: BTreeMap<String, String>,
    resource_urls: Vec<String>,
    extract_resources: bool,
}

impl MatchContextBuilder {
    /// Creates a builder for the page at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the primary page body.
    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = html.into();
        self
    }

    /// Appends the body of an externally fetched script.
    pub fn script_body(mut self, body: impl Into<String>) -> Self {
        self.script_bodies.push(body.into());
        self
    }

    /// Adds a response header. `Set-Cookie` headers also populate cookies.
    ///
    /// Repeated header names are joined with `, `.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        let name = name.trim().to_lowercase();
        let value = value.into();
        if name == "set-cookie" {
            if let Some((cookie, cookie_value)) = parse_set_cookie(&value) {
                self.cookies.insert(cookie, cookie_value);
            }
        } else if name == "cookie" {
            self.cookies.extend(parse_cookie_header(&value));
        }
        self.headers
            .entry(name)
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
        self
    }

    /// Adds a raw `Name: value` header line; malformed lines are skipped.
    pub fn header_line(self, line: &str) -> Self {
        match parse_header_line(line) {
            Some((name, value)) => self.header(&name, value),
            None => {
                log::debug!("Skipping malformed header line: {:?}", line);
                self
            }
        }
    }

    /// Adds a cookie by name.
    pub fn cookie(mut self, name: &str, value: impl Into<String>) -> Self {
        self.cookies.insert(name.trim().to_lowercase(), value.into());
        self
    }

    /// Adds the cookie carried by a `Set-Cookie` value without recording a header.
    pub fn set_cookie(mut self, header_value: &str) -> Self {
        match parse_set_cookie(header_value) {
            Some((name, value)) => {
                self.cookies.insert(name, value);
            }
            None => log::debug!("Skipping malformed Set-Cookie value: {:?}", header_value),
        }
        self
    }

    /// Adds a raw `name=value` cookie pair; malformed pairs are skipped.
    pub fn cookie_pair(mut self, pair: &str) -> Self {
        match parse_cookie_pair(pair) {
            Some((name, value)) => {
                self.cookies.insert(name, value);
            }
            None => log::debug!("Skipping malformed cookie pair: {:?}", pair),
        }
        self
    }

    /// Adds a resource URL discovered outside the page body.
    pub fn resource_url(mut self, url: impl Into<String>) -> Self {
        self.resource_urls.push(url.into());
        self
    }

    /// Also collects script sources and resource hints from the page body.
    pub fn extract_resources(mut self, enabled: bool) -> Self {
        self.extract_resources = enabled;
        self
    }

    /// Builds the snapshot.
    pub fn build(self) -> MatchContext {
        let parsed = Url::parse(self.url.trim()).ok();
        if parsed.is_none() && !self.url.is_empty() {
            log::debug!("Could not parse page URL {:?}; hostname and path left empty", self.url);
        }
        let hostname = parsed
            .as_ref()
            .and_then(|u| u.host_str())
            .map(|h| h.to_lowercase())
            .unwrap_or_default();
        let path = parsed
            .as_ref()
            .map(|u| u.path().to_string())
            .unwrap_or_default();

        let mut resource_urls = if self.extract_resources {
            extract_resource_urls(&self.html, parsed.as_ref())
        } else {
            Vec::new()
        };
        let mut seen: HashSet<String> = resource_urls.iter().cloned().collect();
        for url in self.resource_urls {
            if seen.insert(url.clone()) {
                resource_urls.push(url);
            }
        }

        let mut html = self.html;
        for body in &self.script_bodies {
            html.push('\n');
            html.push_str(body);
        }

        MatchContext {
            html,
            url: self.url,
            hostname,
            path,
            headers: self.headers,
            cookies: self.cookies,
            resource_urls,
        }
    }
}
