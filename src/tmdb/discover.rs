//! Discover, upcoming and trending listings.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use mediagate_common::Result;

use super::models::{MovieResult, MultiResult, Paged, TvResult, UpcomingMovies};
use super::TmdbClient;
use crate::gateway::QueryParams;

// ---------------------------------------------------------------------------
// Option types
// ---------------------------------------------------------------------------

/// Sort orders accepted by the discover endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOption {
    #[default]
    PopularityDesc,
    PopularityAsc,
    ReleaseDateDesc,
    ReleaseDateAsc,
    RevenueDesc,
    RevenueAsc,
    PrimaryReleaseDateDesc,
    PrimaryReleaseDateAsc,
    OriginalTitleAsc,
    OriginalTitleDesc,
    VoteAverageDesc,
    VoteAverageAsc,
    VoteCountDesc,
    VoteCountAsc,
    FirstAirDateDesc,
    FirstAirDateAsc,
}

impl SortOption {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOption::PopularityDesc => "popularity.desc",
            SortOption::PopularityAsc => "popularity.asc",
            SortOption::ReleaseDateDesc => "release_date.desc",
            SortOption::ReleaseDateAsc => "release_date.asc",
            SortOption::RevenueDesc => "revenue.desc",
            SortOption::RevenueAsc => "revenue.asc",
            SortOption::PrimaryReleaseDateDesc => "primary_release_date.desc",
            SortOption::PrimaryReleaseDateAsc => "primary_release_date.asc",
            SortOption::OriginalTitleAsc => "original_title.asc",
            SortOption::OriginalTitleDesc => "original_title.desc",
            SortOption::VoteAverageDesc => "vote_average.desc",
            SortOption::VoteAverageAsc => "vote_average.asc",
            SortOption::VoteCountDesc => "vote_count.desc",
            SortOption::VoteCountAsc => "vote_count.asc",
            SortOption::FirstAirDateDesc => "first_air_date.desc",
            SortOption::FirstAirDateAsc => "first_air_date.asc",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trending time window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeWindow {
    #[default]
    Day,
    Week,
}

impl TimeWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

/// Filters for `/discover/movie`. Unset fields are not sent.
#[derive(Debug, Clone, Default)]
pub struct DiscoverMovieOptions {
    pub page: Option<u32>,
    pub language: Option<String>,
    pub sort_by: SortOption,
    pub include_adult: bool,
    pub primary_release_date_gte: Option<String>,
    pub primary_release_date_lte: Option<String>,
    pub with_runtime_gte: Option<String>,
    pub with_runtime_lte: Option<String>,
    pub vote_average_gte: Option<String>,
    pub vote_average_lte: Option<String>,
    pub vote_count_gte: Option<String>,
    pub vote_count_lte: Option<String>,
    /// ISO-639 code; `"all"` disables the configured default.
    pub original_language: Option<String>,
    pub genre: Option<String>,
    pub studio: Option<String>,
    pub keywords: Option<String>,
    pub watch_region: Option<String>,
    pub watch_providers: Option<String>,
    pub certification: Option<String>,
    pub certification_gte: Option<String>,
    pub certification_lte: Option<String>,
    pub certification_country: Option<String>,
}

/// Filters for `/discover/tv`. Unset fields are not sent.
#[derive(Debug, Clone, Default)]
pub struct DiscoverTvOptions {
    pub page: Option<u32>,
    pub language: Option<String>,
    pub sort_by: SortOption,
    pub first_air_date_gte: Option<String>,
    pub first_air_date_lte: Option<String>,
    pub include_empty_release_date: bool,
    pub with_runtime_gte: Option<String>,
    pub with_runtime_lte: Option<String>,
    pub vote_average_gte: Option<String>,
    pub vote_average_lte: Option<String>,
    pub vote_count_gte: Option<String>,
    pub vote_count_lte: Option<String>,
    /// ISO-639 code; `"all"` disables the configured default.
    pub original_language: Option<String>,
    pub genre: Option<String>,
    pub network: Option<u64>,
    pub keywords: Option<String>,
    pub watch_region: Option<String>,
    pub watch_providers: Option<String>,
    /// Returning series 0, planned 1, in production 2, ended 3, cancelled 4, pilot 5.
    pub with_status: Option<String>,
    pub certification: Option<String>,
    pub certification_gte: Option<String>,
    pub certification_lte: Option<String>,
    pub certification_country: Option<String>,
}

// ---------------------------------------------------------------------------
// Parameter helpers
// ---------------------------------------------------------------------------

const DEFAULT_PAST_DATE: &str = "1900-01-01";

/// Open-ended upper bound used when only a lower date bound is given.
pub fn default_future_date(now: DateTime<Utc>) -> NaiveDate {
    // One and a half years, as 547.5 days.
    (now + Duration::days(547) + Duration::hours(12)).date_naive()
}

/// Complete a half-open date range. TMDB ignores a range with one bound, so
/// the missing side becomes a far-past or far-future date.
pub fn date_range(
    gte: Option<&str>,
    lte: Option<&str>,
    now: DateTime<Utc>,
) -> (Option<String>, Option<String>) {
    match (gte, lte) {
        (None, Some(lte)) => (Some(DEFAULT_PAST_DATE.to_string()), Some(lte.to_string())),
        (Some(gte), None) => (
            Some(gte.to_string()),
            Some(default_future_date(now).format("%Y-%m-%d").to_string()),
        ),
        (gte, lte) => (gte.map(str::to_string), lte.map(str::to_string)),
    }
}

/// `with_original_language` value: an explicit choice wins, `"all"` clears
/// the filter, otherwise the configured preference applies.
pub fn original_language<'a>(
    requested: Option<&'a str>,
    configured: Option<&'a str>,
) -> Option<&'a str> {
    match requested {
        Some("all") => None,
        Some(language) if !language.is_empty() => Some(language),
        _ => configured,
    }
}

impl TmdbClient {
    fn discover_movie_params(&self, options: &DiscoverMovieOptions, now: DateTime<Utc>) -> QueryParams {
        let (gte, lte) = date_range(
            options.primary_release_date_gte.as_deref(),
            options.primary_release_date_lte.as_deref(),
            now,
        );

        QueryParams::new()
            .set("sort_by", options.sort_by)
            .set("page", options.page.unwrap_or(1))
            .set("include_adult", options.include_adult)
            .set("language", self.language(options.language.as_deref()))
            .set_opt("region", self.discover_region.as_deref())
            .set_opt(
                "with_original_language",
                original_language(
                    options.original_language.as_deref(),
                    self.original_language.as_deref(),
                ),
            )
            .set_opt("primary_release_date.gte", gte)
            .set_opt("primary_release_date.lte", lte)
            .set_opt("with_genres", options.genre.as_deref())
            .set_opt("with_companies", options.studio.as_deref())
            .set_opt("with_keywords", options.keywords.as_deref())
            .set_opt("with_runtime.gte", options.with_runtime_gte.as_deref())
            .set_opt("with_runtime.lte", options.with_runtime_lte.as_deref())
            .set_opt("vote_average.gte", options.vote_average_gte.as_deref())
            .set_opt("vote_average.lte", options.vote_average_lte.as_deref())
            .set_opt("vote_count.gte", options.vote_count_gte.as_deref())
            .set_opt("vote_count.lte", options.vote_count_lte.as_deref())
            .set_opt("watch_region", options.watch_region.as_deref())
            .set_opt("with_watch_providers", options.watch_providers.as_deref())
            .set_opt("certification", options.certification.as_deref())
            .set_opt("certification.gte", options.certification_gte.as_deref())
            .set_opt("certification.lte", options.certification_lte.as_deref())
            .set_opt("certification_country", options.certification_country.as_deref())
    }

    fn discover_tv_params(&self, options: &DiscoverTvOptions, now: DateTime<Utc>) -> QueryParams {
        let (gte, lte) = date_range(
            options.first_air_date_gte.as_deref(),
            options.first_air_date_lte.as_deref(),
            now,
        );

        QueryParams::new()
            .set("sort_by", options.sort_by)
            .set("page", options.page.unwrap_or(1))
            .set("language", self.language(options.language.as_deref()))
            .set_opt("region", self.discover_region.as_deref())
            .set_opt("first_air_date.gte", gte)
            .set_opt("first_air_date.lte", lte)
            .set_opt(
                "with_original_language",
                original_language(
                    options.original_language.as_deref(),
                    self.original_language.as_deref(),
                ),
            )
            .set("include_null_first_air_dates", options.include_empty_release_date)
            .set_opt("with_genres", options.genre.as_deref())
            .set_opt("with_networks", options.network)
            .set_opt("with_keywords", options.keywords.as_deref())
            .set_opt("with_runtime.gte", options.with_runtime_gte.as_deref())
            .set_opt("with_runtime.lte", options.with_runtime_lte.as_deref())
            .set_opt("vote_average.gte", options.vote_average_gte.as_deref())
            .set_opt("vote_average.lte", options.vote_average_lte.as_deref())
            .set_opt("vote_count.gte", options.vote_count_gte.as_deref())
            .set_opt("vote_count.lte", options.vote_count_lte.as_deref())
            .set_opt("with_watch_providers", options.watch_providers.as_deref())
            .set_opt("watch_region", options.watch_region.as_deref())
            .set_opt("with_status", options.with_status.as_deref())
            .set_opt("certification", options.certification.as_deref())
            .set_opt("certification.gte", options.certification_gte.as_deref())
            .set_opt("certification.lte", options.certification_lte.as_deref())
            .set_opt("certification_country", options.certification_country.as_deref())
    }

    // -----------------------------------------------------------------------
    // Listings
    // -----------------------------------------------------------------------

    pub async fn discover_movies(&self, options: &DiscoverMovieOptions) -> Result<Paged<MovieResult>> {
        let params = self.discover_movie_params(options, Utc::now());
        let page = self.gateway.get("/discover/movie", params).await?;
        Ok(self.filter.apply_page(page))
    }

    pub async fn discover_tv(&self, options: &DiscoverTvOptions) -> Result<Paged<TvResult>> {
        let params = self.discover_tv_params(options, Utc::now());
        let page = self.gateway.get("/discover/tv", params).await?;
        Ok(self.filter.apply_page(page))
    }

    pub async fn upcoming_movies(&self, page: u32, language: Option<&str>) -> Result<UpcomingMovies> {
        let params = QueryParams::new()
            .set("page", page)
            .set("language", self.language(language))
            .set_opt("region", self.discover_region.as_deref())
            .set_opt("with_original_language", self.original_language.as_deref());

        let mut upcoming: UpcomingMovies = self.gateway.get("/movie/upcoming", params).await?;
        self.filter.apply(&mut upcoming.page.results);
        Ok(upcoming)
    }

    /// Trending movies, shows and people.
    pub async fn trending_all(
        &self,
        page: u32,
        window: TimeWindow,
        language: Option<&str>,
    ) -> Result<Paged<MultiResult>> {
        let params = QueryParams::new()
            .set("page", page)
            .set("language", self.language(language))
            .set_opt("region", self.discover_region.as_deref());

        let path = format!("/trending/all/{}", window.as_str());
        let listing = self.gateway.get(&path, params).await?;
        Ok(self.filter.apply_multi(listing))
    }

    pub async fn trending_movies(&self, page: u32, window: TimeWindow) -> Result<Paged<MovieResult>> {
        let path = format!("/trending/movie/{}", window.as_str());
        let listing = self.gateway.get(&path, QueryParams::new().set("page", page)).await?;
        Ok(self.filter.apply_page(listing))
    }

    pub async fn trending_tv(&self, page: u32, window: TimeWindow) -> Result<Paged<TvResult>> {
        let path = format!("/trending/tv/{}", window.as_str());
        let listing = self.gateway.get(&path, QueryParams::new().set("page", page)).await?;
        Ok(self.filter.apply_page(listing))
    }
}
