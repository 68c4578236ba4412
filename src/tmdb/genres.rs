//! Localized genre lists with an English fallback for untranslated names.

use std::collections::HashMap;

use mediagate_common::Result;
use tracing::debug;

use super::models::{Genre, GenreList};
use super::{TmdbClient, TTL_DAY};
use crate::gateway::QueryParams;

const FALLBACK_LANGUAGE: &str = "en";

/// Which genre list to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreKind {
    Movie,
    Tv,
}

impl GenreKind {
    fn path(self) -> &'static str {
        match self {
            GenreKind::Movie => "/genre/movie/list",
            GenreKind::Tv => "/genre/tv/list",
        }
    }
}

/// Whether a list fetched in `language` needs names from the English list.
pub fn needs_fallback(language: &str, genres: &[Genre]) -> bool {
    !language.starts_with(FALLBACK_LANGUAGE) && genres.iter().any(|genre| genre.name.is_empty())
}

/// Fill empty names from `english` by id.
pub fn backfill(genres: &mut [Genre], english: &[Genre]) {
    let names: HashMap<u64, &str> = english
        .iter()
        .filter(|genre| !genre.name.is_empty())
        .map(|genre| (genre.id, genre.name.as_str()))
        .collect();

    for genre in genres.iter_mut().filter(|genre| genre.name.is_empty()) {
        if let Some(name) = names.get(&genre.id) {
            genre.name = (*name).to_string();
        }
    }
}

/// Drop entries still without a name and sort by name.
pub fn finalize(mut genres: Vec<Genre>) -> Vec<Genre> {
    genres.retain(|genre| !genre.name.is_empty());
    genres.sort_by(|a, b| a.name.cmp(&b.name));
    genres
}

impl TmdbClient {
    /// Movie genres in `language` (default: configured locale).
    pub async fn movie_genres(&self, language: Option<&str>) -> Result<Vec<Genre>> {
        self.genres(GenreKind::Movie, language).await
    }

    /// TV genres in `language` (default: configured locale).
    pub async fn tv_genres(&self, language: Option<&str>) -> Result<Vec<Genre>> {
        self.genres(GenreKind::Tv, language).await
    }

    /// Genre list for `kind`, with untranslated names taken from the English
    /// list. The English list is fetched at most once per call.
    pub async fn genres(&self, kind: GenreKind, language: Option<&str>) -> Result<Vec<Genre>> {
        let language = self.language(language);
        let mut list = self.fetch_genre_list(kind, &language).await?;

        if needs_fallback(&language, &list.genres) {
            debug!(language = %language, ?kind, "backfilling untranslated genre names");
            let english = self.fetch_genre_list(kind, FALLBACK_LANGUAGE).await?;
            backfill(&mut list.genres, &english.genres);
        }

        Ok(finalize(list.genres))
    }

    async fn fetch_genre_list(&self, kind: GenreKind, language: &str) -> Result<GenreList> {
        let params = QueryParams::new().set("language", language);
        self.gateway
            .get_cached(kind.path(), params, Some(TTL_DAY))
            .await
    }
}
