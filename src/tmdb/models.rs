//! TMDB v3 response payloads.
//!
//! Every struct is `#[serde(default)]`: TMDB omits or nulls fields depending
//! on locale and record age, and a missing field must never fail a decode.
//! Unknown fields are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// `null` decodes as the type's default instead of failing.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Paging
// ---------------------------------------------------------------------------

/// One page of a paginated TMDB listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paged<T> {
    pub page: u32,
    pub results: Vec<T>,
    pub total_pages: u32,
    pub total_results: u32,
}

impl<T> Paged<T> {
    /// The empty first page returned when a search degrades.
    pub fn empty() -> Self {
        Self {
            page: 1,
            results: Vec::new(),
            total_pages: 1,
            total_results: 0,
        }
    }
}

impl<T> Default for Paged<T> {
    fn default() -> Self {
        Self::empty()
    }
}

// ---------------------------------------------------------------------------
// Search results
// ---------------------------------------------------------------------------

/// Movie entry as returned by search, discover and listing endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieResult {
    pub id: u64,
    #[serde(deserialize_with = "null_default")]
    pub title: String,
    pub original_title: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub overview: String,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub genre_ids: Vec<u64>,
    pub original_language: Option<String>,
    pub popularity: f64,
    pub vote_average: f64,
    pub vote_count: u64,
    pub adult: bool,
    pub video: bool,
    /// Set by the keyword blocklist; never sent by TMDB.
    pub nsfw: bool,
}

/// TV show entry as returned by search, discover and listing endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TvResult {
    pub id: u64,
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    pub original_name: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub overview: String,
    pub first_air_date: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub genre_ids: Vec<u64>,
    pub origin_country: Vec<String>,
    pub original_language: Option<String>,
    pub popularity: f64,
    pub vote_average: f64,
    pub vote_count: u64,
    /// Set by the keyword blocklist; never sent by TMDB.
    pub nsfw: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonResult {
    pub id: u64,
    pub name: String,
    pub profile_path: Option<String>,
    pub known_for_department: Option<String>,
    pub popularity: f64,
    pub adult: bool,
    pub known_for: Vec<MultiResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionResult {
    pub id: u64,
    pub name: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

/// Entry of a mixed listing (multi search, all-trending), keyed by `media_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "media_type", rename_all = "lowercase")]
pub enum MultiResult {
    Movie(MovieResult),
    Tv(TvResult),
    Person(PersonResult),
    Collection(CollectionResult),
    #[serde(other)]
    Other,
}

/// Upcoming movies page, with the release window TMDB used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpcomingMovies {
    #[serde(flatten)]
    pub page: Paged<MovieResult>,
    #[serde(default)]
    pub dates: Option<DateRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRange {
    pub maximum: String,
    pub minimum: String,
}

// ---------------------------------------------------------------------------
// Shared building blocks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Genre {
    pub id: u64,
    #[serde(deserialize_with = "null_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenreList {
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionCompany {
    pub id: u64,
    pub name: String,
    pub logo_path: Option<String>,
    pub origin_country: Option<String>,
    pub description: Option<String>,
    pub headquarters: Option<String>,
    pub homepage: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Network {
    pub id: u64,
    pub name: String,
    pub logo_path: Option<String>,
    pub origin_country: Option<String>,
    pub headquarters: Option<String>,
    pub homepage: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpokenLanguage {
    pub iso_639_1: String,
    pub english_name: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionCountry {
    pub iso_3166_1: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalIds {
    pub imdb_id: Option<String>,
    pub tvdb_id: Option<u64>,
    pub facebook_id: Option<String>,
    pub instagram_id: Option<String>,
    pub twitter_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    pub character: Option<String>,
    pub credit_id: Option<String>,
    pub order: Option<u32>,
    pub profile_path: Option<String>,
    pub gender: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrewMember {
    pub id: u64,
    pub name: String,
    pub job: Option<String>,
    pub department: Option<String>,
    pub credit_id: Option<String>,
    pub profile_path: Option<String>,
    pub gender: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credits {
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Video {
    pub id: String,
    pub key: String,
    pub name: String,
    pub site: String,
    pub size: Option<u32>,
    #[serde(rename = "type")]
    pub video_type: String,
    pub iso_639_1: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoList {
    pub results: Vec<Video>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keyword {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchProvider {
    pub provider_id: u64,
    pub provider_name: String,
    pub logo_path: Option<String>,
    pub display_priority: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchProviderCountry {
    pub link: Option<String>,
    pub flatrate: Vec<WatchProvider>,
    pub rent: Vec<WatchProvider>,
    pub buy: Vec<WatchProvider>,
}

/// `watch/providers` appended to a details response, keyed by region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchProviders {
    pub results: BTreeMap<String, WatchProviderCountry>,
}

// ---------------------------------------------------------------------------
// Details
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseDate {
    pub certification: String,
    pub release_date: Option<String>,
    #[serde(rename = "type")]
    pub release_type: Option<u8>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseDateCountry {
    pub iso_3166_1: String,
    pub release_dates: Vec<ReleaseDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseDates {
    pub results: Vec<ReleaseDateCountry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieKeywords {
    pub keywords: Vec<Keyword>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionSummary {
    pub id: u64,
    pub name: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

/// `/movie/{id}` with credits, external ids, videos, keywords, release
/// dates and watch providers appended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieDetails {
    pub id: u64,
    pub imdb_id: Option<String>,
    pub title: String,
    pub original_title: Option<String>,
    pub original_language: Option<String>,
    pub overview: Option<String>,
    pub tagline: Option<String>,
    pub status: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
    pub budget: u64,
    pub revenue: u64,
    pub homepage: Option<String>,
    pub adult: bool,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub popularity: f64,
    pub vote_average: f64,
    pub vote_count: u64,
    pub genres: Vec<Genre>,
    pub production_companies: Vec<ProductionCompany>,
    pub production_countries: Vec<ProductionCountry>,
    pub spoken_languages: Vec<SpokenLanguage>,
    pub belongs_to_collection: Option<CollectionSummary>,
    pub credits: Credits,
    pub external_ids: ExternalIds,
    pub videos: VideoList,
    pub keywords: MovieKeywords,
    pub release_dates: ReleaseDates,
    #[serde(rename = "watch/providers")]
    pub watch_providers: WatchProviders,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonSummary {
    pub id: u64,
    pub name: String,
    pub overview: Option<String>,
    pub air_date: Option<String>,
    pub episode_count: u32,
    pub season_number: u32,
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Episode {
    pub id: u64,
    pub name: String,
    pub overview: Option<String>,
    pub air_date: Option<String>,
    pub episode_number: u32,
    pub season_number: u32,
    pub still_path: Option<String>,
    pub vote_average: f64,
    pub vote_count: u64,
    pub show_id: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Creator {
    pub id: u64,
    pub name: String,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentRating {
    pub iso_3166_1: String,
    pub rating: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentRatings {
    pub results: Vec<ContentRating>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TvKeywords {
    pub results: Vec<Keyword>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateRole {
    pub credit_id: String,
    pub character: String,
    pub episode_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateCastMember {
    pub id: u64,
    pub name: String,
    pub profile_path: Option<String>,
    pub roles: Vec<AggregateRole>,
    pub total_episode_count: u32,
    pub order: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateCredits {
    pub cast: Vec<AggregateCastMember>,
}

/// `/tv/{id}` with aggregate credits, credits, external ids, keywords,
/// videos, content ratings and watch providers appended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TvDetails {
    pub id: u64,
    pub name: String,
    pub original_name: Option<String>,
    pub original_language: Option<String>,
    pub overview: Option<String>,
    pub tagline: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub show_type: Option<String>,
    pub first_air_date: Option<String>,
    pub last_air_date: Option<String>,
    pub in_production: bool,
    pub number_of_episodes: u32,
    pub number_of_seasons: u32,
    pub episode_run_time: Vec<u32>,
    pub homepage: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub popularity: f64,
    pub vote_average: f64,
    pub vote_count: u64,
    pub languages: Vec<String>,
    pub origin_country: Vec<String>,
    pub genres: Vec<Genre>,
    pub created_by: Vec<Creator>,
    pub networks: Vec<Network>,
    pub production_companies: Vec<ProductionCompany>,
    pub spoken_languages: Vec<SpokenLanguage>,
    pub seasons: Vec<SeasonSummary>,
    pub last_episode_to_air: Option<Episode>,
    pub next_episode_to_air: Option<Episode>,
    pub aggregate_credits: AggregateCredits,
    pub credits: Credits,
    pub external_ids: ExternalIds,
    pub keywords: TvKeywords,
    pub videos: VideoList,
    pub content_ratings: ContentRatings,
    #[serde(rename = "watch/providers")]
    pub watch_providers: WatchProviders,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonWithEpisodes {
    pub id: u64,
    pub name: String,
    pub overview: Option<String>,
    pub air_date: Option<String>,
    pub season_number: u32,
    pub poster_path: Option<String>,
    pub episodes: Vec<Episode>,
    pub external_ids: ExternalIds,
}

// ---------------------------------------------------------------------------
// People
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonDetails {
    pub id: u64,
    pub name: String,
    pub imdb_id: Option<String>,
    pub biography: Option<String>,
    pub birthday: Option<String>,
    pub deathday: Option<String>,
    pub place_of_birth: Option<String>,
    pub known_for_department: Option<String>,
    pub also_known_as: Vec<String>,
    pub gender: Option<u8>,
    pub popularity: f64,
    pub profile_path: Option<String>,
    pub homepage: Option<String>,
    pub adult: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditMediaType {
    #[default]
    Movie,
    Tv,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonCredit {
    pub id: u64,
    pub media_type: CreditMediaType,
    pub credit_id: Option<String>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub character: Option<String>,
    pub job: Option<String>,
    pub department: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub popularity: f64,
    pub vote_average: f64,
    pub vote_count: u64,
    pub adult: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonCombinedCredits {
    pub id: u64,
    pub cast: Vec<PersonCredit>,
    pub crew: Vec<PersonCredit>,
}

// ---------------------------------------------------------------------------
// Lookups and reference data
// ---------------------------------------------------------------------------

/// `/find/{external_id}` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindResults {
    pub movie_results: Vec<MovieResult>,
    pub tv_results: Vec<TvResult>,
    pub person_results: Vec<PersonResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Collection {
    pub id: u64,
    pub name: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub parts: Vec<MovieResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Region {
    pub iso_3166_1: String,
    pub english_name: String,
    pub native_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Language {
    pub iso_639_1: String,
    pub english_name: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certification {
    pub certification: String,
    pub meaning: Option<String>,
    pub order: Option<u32>,
}

/// Certifications keyed by ISO-3166 country code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificationList {
    pub certifications: BTreeMap<String, Vec<Certification>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanySearchResult {
    pub id: u64,
    pub name: String,
    pub logo_path: Option<String>,
    pub origin_country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchProviderRegion {
    pub iso_3166_1: String,
    pub english_name: String,
    pub native_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchProviderDetails {
    pub provider_id: u64,
    pub provider_name: String,
    pub logo_path: Option<String>,
    pub display_priority: Option<u32>,
}

/// Wrapper for endpoints answering `{"results": [...]}` without paging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultList<T> {
    pub results: Vec<T>,
}
