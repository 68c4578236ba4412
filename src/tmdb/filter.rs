//! Keyword blocklist applied to catalog results.
//!
//! The blocklist is a comma-separated settings value. It is compiled into a
//! single case-insensitive whole-word pattern and checked against each
//! movie/show title and overview. Matching entries are flagged with
//! `nsfw = true`; nothing is removed from the result set.

use std::sync::Arc;

use regex::Regex;
use tracing::{trace, warn};

use super::models::{MovieResult, MultiResult, Paged, TvResult};
use crate::config::SettingsSource;

// ---------------------------------------------------------------------------
// Blocklist
// ---------------------------------------------------------------------------

/// Compiled form of a comma-separated keyword list.
#[derive(Debug, Clone, Default)]
pub struct KeywordBlocklist {
    pattern: Option<Regex>,
}

impl KeywordBlocklist {
    /// Compile `raw`. An empty or whitespace-only list blocks nothing.
    pub fn parse(raw: &str) -> Self {
        let keywords: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|keyword| !keyword.is_empty())
            .map(regex::escape)
            .collect();

        if keywords.is_empty() {
            return Self::default();
        }

        let source = format!(r"(?i)\b(?:{})\b", keywords.join("|"));
        match Regex::new(&source) {
            Ok(pattern) => Self {
                pattern: Some(pattern),
            },
            Err(e) => {
                warn!(error = %e, "Invalid keyword blocklist, filtering disabled");
                Self::default()
            }
        }
    }

    /// Whether the list contains no keywords.
    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
    }

    /// Whether `title` or `overview` contains a listed keyword as a whole word.
    pub fn is_blocked(&self, title: &str, overview: &str) -> bool {
        let Some(pattern) = &self.pattern else {
            return false;
        };
        pattern.is_match(&clean(title)) || pattern.is_match(&clean(overview))
    }
}

/// Replace every character other than ASCII letters, digits and spaces with
/// a space, so punctuation acts as a word separator.
fn clean(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == ' ' { c } else { ' ' })
        .collect()
}

// ---------------------------------------------------------------------------
// Screenable entries
// ---------------------------------------------------------------------------

/// A catalog entry the blocklist can flag.
pub trait Screenable {
    fn display_title(&self) -> &str;
    fn overview(&self) -> &str;
    fn set_nsfw(&mut self, nsfw: bool);
}

impl Screenable for MovieResult {
    fn display_title(&self) -> &str {
        &self.title
    }

    fn overview(&self) -> &str {
        &self.overview
    }

    fn set_nsfw(&mut self, nsfw: bool) {
        self.nsfw = nsfw;
    }
}

impl Screenable for TvResult {
    fn display_title(&self) -> &str {
        &self.name
    }

    fn overview(&self) -> &str {
        &self.overview
    }

    fn set_nsfw(&mut self, nsfw: bool) {
        self.nsfw = nsfw;
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Flags catalog entries against the live keyword blocklist.
///
/// The blocklist is re-read from the settings source at the start of every
/// pass, so settings changes apply to the next response without restarting.
#[derive(Clone)]
pub struct ContentFilter {
    settings: Arc<dyn SettingsSource>,
}

impl ContentFilter {
    pub fn new(settings: Arc<dyn SettingsSource>) -> Self {
        Self { settings }
    }

    /// The blocklist as currently configured.
    pub fn blocklist(&self) -> KeywordBlocklist {
        KeywordBlocklist::parse(&self.settings.filtered_keywords())
    }

    /// One-off check against the current blocklist.
    pub fn is_blocked(&self, title: &str, overview: &str) -> bool {
        self.blocklist().is_blocked(title, overview)
    }

    /// Set `nsfw` on every entry.
    pub fn apply<T: Screenable>(&self, entries: &mut [T]) {
        let blocklist = self.blocklist();
        for entry in entries.iter_mut() {
            screen(&blocklist, entry);
        }
    }

    /// [`ContentFilter::apply`] over a page, returning it.
    pub fn apply_page<T: Screenable>(&self, mut page: Paged<T>) -> Paged<T> {
        self.apply(&mut page.results);
        page
    }

    /// Set `nsfw` on the movie and show entries of a mixed listing. People
    /// and collections pass through unchanged.
    pub fn apply_multi(&self, mut page: Paged<MultiResult>) -> Paged<MultiResult> {
        let blocklist = self.blocklist();
        for entry in page.results.iter_mut() {
            match entry {
                MultiResult::Movie(movie) => screen(&blocklist, movie),
                MultiResult::Tv(tv) => screen(&blocklist, tv),
                MultiResult::Person(_) | MultiResult::Collection(_) | MultiResult::Other => {}
            }
        }
        page
    }
}

impl std::fmt::Debug for ContentFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentFilter").finish_non_exhaustive()
    }
}

fn screen<T: Screenable>(blocklist: &KeywordBlocklist, entry: &mut T) {
    let nsfw = blocklist.is_blocked(entry.display_title(), entry.overview());
    if nsfw {
        trace!(title = entry.display_title(), "entry matched keyword blocklist");
    }
    entry.set_nsfw(nsfw);
}
