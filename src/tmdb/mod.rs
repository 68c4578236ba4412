//! TMDB (The Movie Database) catalog client.
//!
//! Wraps the TMDB v3 REST API on top of a [`GatewayClient`]:
//! - `api_key` attached to every request.
//! - Sliding-window plus max-rate admission (20 per second, 50 rps by default).
//! - Response caching for slow-moving data (details, genres, reference lists).
//! - Keyword blocklist flagging on every movie/show listing.
//!
//! Search endpoints degrade to an empty page on failure; every other call
//! propagates the gateway's error classification.

pub mod discover;
pub mod filter;
pub mod genres;
pub mod models;

use std::sync::Arc;
use std::time::Duration;

use mediagate_common::{GatewayError, Result};
use tracing::warn;

use crate::config::{MainSettings, SettingsSource, TmdbConfig};
use crate::gateway::{GatewayClient, GatewayOptions, QueryParams};

pub use discover::{DiscoverMovieOptions, DiscoverTvOptions, SortOption, TimeWindow};
pub use filter::{ContentFilter, KeywordBlocklist, Screenable};
pub use genres::GenreKind;
use models::*;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const PROVIDER: &str = "tmdb";

pub(crate) const TTL_HALF_DAY: Duration = Duration::from_secs(43_200);
pub(crate) const TTL_DAY: Duration = Duration::from_secs(86_400);
pub(crate) const TTL_WEEK: Duration = Duration::from_secs(604_800);

const MOVIE_APPENDS: &str = "credits,external_ids,videos,keywords,release_dates,watch/providers";
const TV_APPENDS: &str =
    "aggregate_credits,credits,external_ids,keywords,videos,content_ratings,watch/providers";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Locale and discovery preferences a [`TmdbClient`] is built with.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogOptions {
    /// Language used when a call does not name one.
    pub locale: String,
    /// Region applied to discover, upcoming and trending listings.
    pub discover_region: Option<String>,
    /// Original-language preference for discover and watch-provider calls.
    pub original_language: Option<String>,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self::from(&MainSettings::default())
    }
}

impl From<&MainSettings> for CatalogOptions {
    fn from(settings: &MainSettings) -> Self {
        let locale = if settings.locale.trim().is_empty() {
            "en".to_string()
        } else {
            settings.locale.clone()
        };
        Self {
            locale,
            discover_region: settings.discover_region.clone().filter(|r| !r.is_empty()),
            original_language: settings.original_language.clone().filter(|l| !l.is_empty()),
        }
    }
}

/// Parameters for the free-text search endpoints.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub query: String,
    pub page: Option<u32>,
    pub include_adult: bool,
    pub language: Option<String>,
    /// Release year (movies) or first-air year (shows). Ignored by multi search.
    pub year: Option<u16>,
}

impl SearchOptions {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

/// External id namespaces accepted by `/find`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalId {
    Imdb(String),
    Tvdb(u64),
}

impl ExternalId {
    fn source(&self) -> &'static str {
        match self {
            ExternalId::Imdb(_) => "imdb_id",
            ExternalId::Tvdb(_) => "tvdb_id",
        }
    }

    fn value(&self) -> String {
        match self {
            ExternalId::Imdb(id) => id.clone(),
            ExternalId::Tvdb(id) => id.to_string(),
        }
    }
}

/// Details of whichever media an IMDb id resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaDetails {
    Movie(Box<MovieDetails>),
    Tv(Box<TvDetails>),
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// TMDB catalog client.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use mediagate::config::{SettingsStore, TmdbConfig};
/// use mediagate::tmdb::{SearchOptions, TmdbClient};
///
/// # async fn run() -> mediagate_common::Result<()> {
/// let settings = Arc::new(SettingsStore::default());
/// let tmdb = TmdbClient::from_settings(&TmdbConfig::default(), settings)?;
/// let page = tmdb.search_movies(&SearchOptions::new("Dune")).await;
/// println!("{} results", page.total_results);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TmdbClient {
    gateway: GatewayClient,
    locale: String,
    discover_region: Option<String>,
    original_language: Option<String>,
    filter: ContentFilter,
}

impl TmdbClient {
    /// Build a client with explicit catalog options. `settings` supplies the
    /// live keyword blocklist.
    pub fn new(
        config: &TmdbConfig,
        options: CatalogOptions,
        settings: Arc<dyn SettingsSource>,
    ) -> Result<Self> {
        let mut gateway = GatewayOptions::new(PROVIDER, config.base_url.clone());
        gateway.default_query = QueryParams::new().set("api_key", &config.api_key);
        gateway.timeout = Duration::from_secs(config.timeout_secs);
        gateway.rate_limit = config.rate_limit.clone();
        gateway.default_ttl = Duration::from_secs(config.cache_default_ttl_secs);

        Ok(Self {
            gateway: GatewayClient::new(gateway)?,
            locale: options.locale,
            discover_region: options.discover_region,
            original_language: options.original_language,
            filter: ContentFilter::new(settings),
        })
    }

    /// Build a client whose catalog options come from the current settings.
    pub fn from_settings(config: &TmdbConfig, settings: Arc<dyn SettingsSource>) -> Result<Self> {
        let options = CatalogOptions::from(&settings.main_settings());
        Self::new(config, options, settings)
    }

    pub fn gateway(&self) -> &GatewayClient {
        &self.gateway
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn filter(&self) -> &ContentFilter {
        &self.filter
    }

    /// `language`, or the configured locale when absent.
    pub(crate) fn language(&self, language: Option<&str>) -> String {
        language
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.locale)
            .to_string()
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    /// Search movies, shows and people at once. Failures yield an empty page.
    pub async fn search_multi(&self, options: &SearchOptions) -> Paged<MultiResult> {
        let params = self.search_params(options);
        match self.gateway.get("/search/multi", params).await {
            Ok(page) => self.filter.apply_multi(page),
            Err(e) => degrade("/search/multi", &options.query, e),
        }
    }

    /// Search movies. Failures yield an empty page.
    pub async fn search_movies(&self, options: &SearchOptions) -> Paged<MovieResult> {
        let params = self
            .search_params(options)
            .set_opt("primary_release_year", options.year);
        match self.gateway.get("/search/movie", params).await {
            Ok(page) => self.filter.apply_page(page),
            Err(e) => degrade("/search/movie", &options.query, e),
        }
    }

    /// Search TV shows. Failures yield an empty page.
    pub async fn search_tv_shows(&self, options: &SearchOptions) -> Paged<TvResult> {
        let params = self
            .search_params(options)
            .set_opt("first_air_date_year", options.year);
        match self.gateway.get("/search/tv", params).await {
            Ok(page) => self.filter.apply_page(page),
            Err(e) => degrade("/search/tv", &options.query, e),
        }
    }

    fn search_params(&self, options: &SearchOptions) -> QueryParams {
        QueryParams::new()
            .set("query", &options.query)
            .set("page", options.page.unwrap_or(1))
            .set("include_adult", options.include_adult)
            .set("language", self.language(options.language.as_deref()))
    }

    // -----------------------------------------------------------------------
    // Details
    // -----------------------------------------------------------------------

    pub async fn person(&self, person_id: u64, language: Option<&str>) -> Result<PersonDetails> {
        let params = QueryParams::new().set("language", self.language(language));
        self.gateway.get(&format!("/person/{person_id}"), params).await
    }

    pub async fn person_combined_credits(
        &self,
        person_id: u64,
        language: Option<&str>,
    ) -> Result<PersonCombinedCredits> {
        let params = QueryParams::new().set("language", self.language(language));
        self.gateway
            .get(&format!("/person/{person_id}/combined_credits"), params)
            .await
    }

    /// Movie details with credits, videos, keywords, release dates and watch
    /// providers appended. Cached for 12 hours.
    pub async fn movie(&self, movie_id: u64, language: Option<&str>) -> Result<MovieDetails> {
        let language = self.language(language);
        let params = QueryParams::new()
            .set("append_to_response", MOVIE_APPENDS)
            .set("include_video_language", format!("{language}, en"))
            .set("language", language);
        self.gateway
            .get_cached(&format!("/movie/{movie_id}"), params, Some(TTL_HALF_DAY))
            .await
    }

    /// TV show details with credits, keywords, videos, content ratings and
    /// watch providers appended. Cached for 12 hours.
    pub async fn tv_show(&self, tv_id: u64, language: Option<&str>) -> Result<TvDetails> {
        let language = self.language(language);
        let params = QueryParams::new()
            .set("append_to_response", TV_APPENDS)
            .set("include_video_language", format!("{language}, en"))
            .set("language", language);
        self.gateway
            .get_cached(&format!("/tv/{tv_id}"), params, Some(TTL_HALF_DAY))
            .await
    }

    /// One season with its episodes and external ids. Without a language,
    /// TMDB answers in its own default.
    pub async fn tv_season(
        &self,
        tv_id: u64,
        season_number: u32,
        language: Option<&str>,
    ) -> Result<SeasonWithEpisodes> {
        let params = QueryParams::new()
            .set("append_to_response", "external_ids")
            .set_opt("language", language);
        self.gateway
            .get(&format!("/tv/{tv_id}/season/{season_number}"), params)
            .await
    }

    // -----------------------------------------------------------------------
    // Related listings
    // -----------------------------------------------------------------------

    pub async fn movie_recommendations(
        &self,
        movie_id: u64,
        page: u32,
        language: Option<&str>,
    ) -> Result<Paged<MovieResult>> {
        self.movie_listing(&format!("/movie/{movie_id}/recommendations"), page, language)
            .await
    }

    pub async fn movie_similar(
        &self,
        movie_id: u64,
        page: u32,
        language: Option<&str>,
    ) -> Result<Paged<MovieResult>> {
        self.movie_listing(&format!("/movie/{movie_id}/similar"), page, language)
            .await
    }

    pub async fn movies_by_keyword(
        &self,
        keyword_id: u64,
        page: u32,
        language: Option<&str>,
    ) -> Result<Paged<MovieResult>> {
        self.movie_listing(&format!("/keyword/{keyword_id}/movies"), page, language)
            .await
    }

    pub async fn tv_recommendations(
        &self,
        tv_id: u64,
        page: u32,
        language: Option<&str>,
    ) -> Result<Paged<TvResult>> {
        self.tv_listing(&format!("/tv/{tv_id}/recommendations"), page, language)
            .await
    }

    pub async fn tv_similar(&self, tv_id: u64, page: u32, language: Option<&str>) -> Result<Paged<TvResult>> {
        self.tv_listing(&format!("/tv/{tv_id}/similar"), page, language)
            .await
    }

    async fn movie_listing(&self, path: &str, page: u32, language: Option<&str>) -> Result<Paged<MovieResult>> {
        let params = QueryParams::new()
            .set("page", page)
            .set("language", self.language(language));
        let listing = self.gateway.get(path, params).await?;
        Ok(self.filter.apply_page(listing))
    }

    async fn tv_listing(&self, path: &str, page: u32, language: Option<&str>) -> Result<Paged<TvResult>> {
        let params = QueryParams::new()
            .set("page", page)
            .set("language", self.language(language));
        let listing = self.gateway.get(path, params).await?;
        Ok(self.filter.apply_page(listing))
    }

    // -----------------------------------------------------------------------
    // External ids
    // -----------------------------------------------------------------------

    pub async fn find_by_external_id(&self, id: &ExternalId, language: Option<&str>) -> Result<FindResults> {
        let params = QueryParams::new()
            .set("external_source", id.source())
            .set("language", self.language(language));
        self.gateway.get(&format!("/find/{}", id.value()), params).await
    }

    /// Resolve an IMDb id, preferring a movie match over a show match.
    pub async fn media_by_imdb_id(&self, imdb_id: &str, language: Option<&str>) -> Result<MediaDetails> {
        let found = self
            .find_by_external_id(&ExternalId::Imdb(imdb_id.to_string()), None)
            .await?;

        if let Some(movie) = found.movie_results.first() {
            let details = self.movie(movie.id, language).await?;
            return Ok(MediaDetails::Movie(Box::new(details)));
        }
        if let Some(show) = found.tv_results.first() {
            let details = self.tv_show(show.id, language).await?;
            return Ok(MediaDetails::Tv(Box::new(details)));
        }

        Err(GatewayError::unknown(
            None,
            format!("No movie or show returned from TMDB for IMDb id {imdb_id}"),
        ))
    }

    pub async fn show_by_tvdb_id(&self, tvdb_id: u64, language: Option<&str>) -> Result<TvDetails> {
        let found = self
            .find_by_external_id(&ExternalId::Tvdb(tvdb_id), None)
            .await?;

        match found.tv_results.first() {
            Some(show) => self.tv_show(show.id, language).await,
            None => Err(GatewayError::unknown(
                None,
                format!("No show returned from TMDB for TVDB id {tvdb_id}"),
            )),
        }
    }

    // -----------------------------------------------------------------------
    // Collections, companies, networks
    // -----------------------------------------------------------------------

    pub async fn collection(&self, collection_id: u64, language: Option<&str>) -> Result<Collection> {
        let params = QueryParams::new().set("language", self.language(language));
        self.gateway
            .get(&format!("/collection/{collection_id}"), params)
            .await
    }

    pub async fn company(&self, company_id: u64) -> Result<ProductionCompany> {
        self.gateway
            .get(&format!("/company/{company_id}"), QueryParams::new())
            .await
    }

    pub async fn network(&self, network_id: u64) -> Result<Network> {
        self.gateway
            .get(&format!("/network/{network_id}"), QueryParams::new())
            .await
    }

    // -----------------------------------------------------------------------
    // Reference data
    // -----------------------------------------------------------------------

    /// Countries known to TMDB, sorted by English name. Cached for a day.
    pub async fn regions(&self) -> Result<Vec<Region>> {
        let mut regions: Vec<Region> = self
            .gateway
            .get_cached("/configuration/countries", QueryParams::new(), Some(TTL_DAY))
            .await?;
        regions.sort_by(|a, b| a.english_name.cmp(&b.english_name));
        Ok(regions)
    }

    /// Languages known to TMDB, sorted by English name. Cached for a day.
    pub async fn languages(&self) -> Result<Vec<Language>> {
        let mut languages: Vec<Language> = self
            .gateway
            .get_cached("/configuration/languages", QueryParams::new(), Some(TTL_DAY))
            .await?;
        languages.sort_by(|a, b| a.english_name.cmp(&b.english_name));
        Ok(languages)
    }

    pub async fn movie_certifications(&self) -> Result<CertificationList> {
        self.gateway
            .get_cached("/certification/movie/list", QueryParams::new(), Some(TTL_WEEK))
            .await
    }

    pub async fn tv_certifications(&self) -> Result<CertificationList> {
        self.gateway
            .get_cached("/certification/tv/list", QueryParams::new(), Some(TTL_WEEK))
            .await
    }

    pub async fn keyword_details(&self, keyword_id: u64) -> Result<Keyword> {
        self.gateway
            .get_cached(&format!("/keyword/{keyword_id}"), QueryParams::new(), Some(TTL_WEEK))
            .await
    }

    pub async fn search_keyword(&self, query: &str, page: u32) -> Result<Paged<Keyword>> {
        let params = QueryParams::new().set("query", query).set("page", page);
        self.gateway
            .get_cached("/search/keyword", params, Some(TTL_DAY))
            .await
    }

    pub async fn search_company(&self, query: &str, page: u32) -> Result<Paged<CompanySearchResult>> {
        let params = QueryParams::new().set("query", query).set("page", page);
        self.gateway
            .get_cached("/search/company", params, Some(TTL_DAY))
            .await
    }

    // -----------------------------------------------------------------------
    // Watch providers
    // -----------------------------------------------------------------------

    /// Regions with watch-provider data. `language` defaults to the
    /// configured original language.
    pub async fn watch_provider_regions(&self, language: Option<&str>) -> Result<Vec<WatchProviderRegion>> {
        let params = self.watch_provider_params(language, None);
        let list: ResultList<WatchProviderRegion> = self
            .gateway
            .get_cached("/watch/providers/regions", params, Some(TTL_DAY))
            .await?;
        Ok(list.results)
    }

    pub async fn movie_watch_providers(
        &self,
        watch_region: &str,
        language: Option<&str>,
    ) -> Result<Vec<WatchProviderDetails>> {
        let params = self.watch_provider_params(language, Some(watch_region));
        let list: ResultList<WatchProviderDetails> = self
            .gateway
            .get_cached("/watch/providers/movie", params, Some(TTL_DAY))
            .await?;
        Ok(list.results)
    }

    pub async fn tv_watch_providers(
        &self,
        watch_region: &str,
        language: Option<&str>,
    ) -> Result<Vec<WatchProviderDetails>> {
        let params = self.watch_provider_params(language, Some(watch_region));
        let list: ResultList<WatchProviderDetails> = self
            .gateway
            .get_cached("/watch/providers/tv", params, Some(TTL_DAY))
            .await?;
        Ok(list.results)
    }

    fn watch_provider_params(&self, language: Option<&str>, watch_region: Option<&str>) -> QueryParams {
        QueryParams::new()
            .set_opt("language", language.or(self.original_language.as_deref()))
            .set_opt("watch_region", watch_region)
    }
}

/// Log a failed search and return the empty page it degrades to.
fn degrade<T>(path: &str, query: &str, err: GatewayError) -> Paged<T> {
    warn!(
        path = %path,
        query = %query,
        kind = %err.kind(),
        error = %err,
        "TMDB search failed, returning an empty page"
    );
    Paged::empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SettingsStore;

    #[test]
    fn catalog_options_from_settings() {
        let settings = MainSettings {
            locale: " ".to_string(),
            discover_region: Some(String::new()),
            original_language: Some("ja".to_string()),
            filtered_keywords: String::new(),
        };
        let options = CatalogOptions::from(&settings);
        assert_eq!(options.locale, "en");
        assert_eq!(options.discover_region, None);
        assert_eq!(options.original_language.as_deref(), Some("ja"));
    }

    #[test]
    fn language_falls_back_to_locale() {
        let options = CatalogOptions {
            locale: "de".to_string(),
            ..CatalogOptions::default()
        };
        let client =
            TmdbClient::new(&TmdbConfig::default(), options, Arc::new(SettingsStore::default())).unwrap();
        assert_eq!(client.language(None), "de");
        assert_eq!(client.language(Some("")), "de");
        assert_eq!(client.language(Some("pt-BR")), "pt-BR");
    }

    #[test]
    fn search_params_carry_defaults() {
        let client = TmdbClient::from_settings(&TmdbConfig::default(), Arc::new(SettingsStore::default())).unwrap();
        let params = client.search_params(&SearchOptions::new("the war"));
        assert_eq!(params.get("query"), Some("the war"));
        assert_eq!(params.get("page"), Some("1"));
        assert_eq!(params.get("include_adult"), Some("false"));
        assert_eq!(params.get("language"), Some("en"));
    }

    #[test]
    fn external_id_sources() {
        assert_eq!(ExternalId::Imdb("tt0111161".into()).source(), "imdb_id");
        assert_eq!(ExternalId::Tvdb(81189).source(), "tvdb_id");
        assert_eq!(ExternalId::Tvdb(81189).value(), "81189");
    }
}
