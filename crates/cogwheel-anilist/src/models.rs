//! AniList response models.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Profile
// ============================================================================

/// A user profile with statistics and favourites.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    /// Display name.
    pub name: String,
    /// Avatar images.
    pub avatar: Option<Avatar>,
    /// Banner image URL.
    pub banner_image: Option<String>,
    /// Profile page URL.
    pub site_url: String,
    /// Free-form profile text in AniList markdown.
    pub about: Option<String>,
    /// Profile options.
    pub options: Option<ProfileOptions>,
    /// Favourite titles.
    pub favourites: Favourites,
    /// Consumption statistics.
    pub statistics: Statistics,
}

impl Profile {
    /// Medium avatar URL, if set.
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar.as_ref()?.medium.as_deref()
    }

    /// Configured profile colour, if set.
    pub fn profile_color(&self) -> Option<&str> {
        self.options.as_ref()?.profile_color.as_deref()
    }
}

/// Avatar image URLs.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Avatar {
    /// Medium sized avatar.
    pub medium: Option<String>,
}

/// Profile options.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileOptions {
    /// Named colour (`blue`, `pink`, ...) or `#rrggbb`.
    pub profile_color: Option<String>,
}

/// Favourite anime and manga.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Favourites {
    /// Favourite anime.
    pub anime: FavouriteConnection,
    /// Favourite manga.
    pub manga: FavouriteConnection,
}

/// GraphQL connection of favourite media.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct FavouriteConnection {
    /// Favourites in the user's order.
    pub nodes: Vec<FavouriteNode>,
}

impl FavouriteConnection {
    /// Titles of the first `limit` favourites.
    pub fn titles(&self, limit: usize) -> Vec<&str> {
        self.nodes
            .iter()
            .take(limit)
            .map(|node| node.title.romaji_or_english())
            .collect()
    }
}

/// One favourite entry.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct FavouriteNode {
    /// Media title.
    pub title: MediaTitle,
}

/// Media titles in the languages the bot displays.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct MediaTitle {
    /// Romanized title.
    pub romaji: Option<String>,
    /// English title.
    pub english: Option<String>,
}

impl MediaTitle {
    /// English title, falling back to romaji.
    pub fn english_or_romaji(&self) -> &str {
        self.english
            .as_deref()
            .or(self.romaji.as_deref())
            .unwrap_or("Unknown title")
    }

    /// Romaji title, falling back to English.
    pub fn romaji_or_english(&self) -> &str {
        self.romaji
            .as_deref()
            .or(self.english.as_deref())
            .unwrap_or("Unknown title")
    }
}

/// Anime and manga statistics.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Statistics {
    /// Anime statistics.
    pub anime: AnimeStatistics,
    /// Manga statistics.
    pub manga: MangaStatistics,
}

/// Anime consumption statistics.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimeStatistics {
    /// Titles on the list.
    pub count: u32,
    /// Episodes watched.
    pub episodes_watched: u32,
    /// Minutes watched.
    pub minutes_watched: u64,
    /// Mean score out of 100.
    pub mean_score: f64,
}

/// Manga consumption statistics.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MangaStatistics {
    /// Titles on the list.
    pub count: u32,
    /// Chapters read.
    pub chapters_read: u32,
    /// Volumes read.
    pub volumes_read: u32,
    /// Mean score out of 100.
    pub mean_score: f64,
}

// ============================================================================
// Lists
// ============================================================================

/// Which list to browse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListKind {
    /// Anime list.
    Anime,
    /// Manga list.
    Manga,
}

impl ListKind {
    /// Both kinds in menu order.
    pub const ALL: [Self; 2] = [Self::Anime, Self::Manga];

    /// GraphQL `MediaType` value.
    pub const fn media_type(self) -> &'static str {
        match self {
            Self::Anime => "ANIME",
            Self::Manga => "MANGA",
        }
    }

    /// Lowercase value used in component ids.
    pub const fn value(self) -> &'static str {
        match self {
            Self::Anime => "anime",
            Self::Manga => "manga",
        }
    }

    /// Unit progress is counted in.
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Anime => "episodes",
            Self::Manga => "chapters",
        }
    }

    /// Parses [`ListKind::value`].
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.value() == value)
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anime => f.write_str("Anime"),
            Self::Manga => f.write_str("Manga"),
        }
    }
}

/// List status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ListStatus {
    /// Watching or reading.
    #[default]
    Current,
    /// Finished.
    Completed,
    /// Planned.
    Planning,
    /// Dropped.
    Dropped,
    /// On hold.
    Paused,
}

impl ListStatus {
    /// All statuses in menu order.
    pub const ALL: [Self; 5] = [
        Self::Current,
        Self::Completed,
        Self::Planning,
        Self::Dropped,
        Self::Paused,
    ];

    /// GraphQL `MediaListStatus` value.
    pub const fn api_value(self) -> &'static str {
        match self {
            Self::Current => "CURRENT",
            Self::Completed => "COMPLETED",
            Self::Planning => "PLANNING",
            Self::Dropped => "DROPPED",
            Self::Paused => "PAUSED",
        }
    }

    /// Menu label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Current => "Current",
            Self::Completed => "Completed",
            Self::Planning => "Planning",
            Self::Dropped => "Dropped",
            Self::Paused => "Paused",
        }
    }

    /// Parses [`ListStatus::api_value`].
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.api_value() == value)
    }
}

impl fmt::Display for ListStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of a user's list.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListEntry {
    /// The listed media.
    pub media: Media,
    /// Entry status.
    pub status: Option<String>,
    /// Episodes watched or chapters read.
    pub progress: Option<u32>,
    /// Score on a 10 point scale.
    pub score: Option<f64>,
}

/// Media referenced by a list entry.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Media {
    /// Titles.
    pub title: MediaTitle,
    /// Total episodes, when known.
    pub episodes: Option<u32>,
    /// Total chapters, when known.
    pub chapters: Option<u32>,
    /// Release status.
    pub status: Option<String>,
}

// ============================================================================
// GraphQL envelopes
// ============================================================================

/// Standard GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ViewerData {
    #[serde(rename = "Viewer")]
    pub viewer: Option<Profile>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserData {
    #[serde(rename = "User")]
    pub user: Option<Profile>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ViewerIdData {
    #[serde(rename = "Viewer")]
    pub viewer: ViewerId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ViewerId {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListCollectionData {
    #[serde(rename = "MediaListCollection")]
    pub collection: Option<ListCollection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ListCollection {
    pub lists: Vec<MediaList>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct MediaList {
    pub entries: Vec<ListEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_deserializes_camel_case() {
        let json = r##"{
            "name": "Kaiji",
            "avatar": {"medium": "https://img/avatar.png"},
            "bannerImage": null,
            "siteUrl": "https://anilist.co/user/Kaiji",
            "about": null,
            "options": {"profileColor": "#ff0000"},
            "favourites": {"anime": {"nodes": [{"title": {"romaji": "Akagi"}}]}, "manga": {"nodes": []}},
            "statistics": {
                "anime": {"count": 10, "episodesWatched": 120, "minutesWatched": 2880, "meanScore": 81.5},
                "manga": {"count": 2, "chaptersRead": 50, "volumesRead": 5, "meanScore": 70.0}
            }
        }"##;

        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.avatar_url(), Some("https://img/avatar.png"));
        assert_eq!(profile.profile_color(), Some("#ff0000"));
        assert_eq!(profile.statistics.anime.minutes_watched, 2880);
        assert_eq!(profile.favourites.anime.titles(5), vec!["Akagi"]);
    }

    #[test]
    fn test_title_fallbacks() {
        let title = MediaTitle {
            romaji: Some("Shingeki no Kyojin".into()),
            english: None,
        };
        assert_eq!(title.english_or_romaji(), "Shingeki no Kyojin");
        assert_eq!(MediaTitle::default().romaji_or_english(), "Unknown title");
    }

    #[test]
    fn test_kind_and_status_values() {
        assert_eq!(ListKind::parse("manga"), Some(ListKind::Manga));
        assert_eq!(ListKind::Anime.unit(), "episodes");
        assert_eq!(ListStatus::parse("PAUSED"), Some(ListStatus::Paused));
        assert_eq!(ListStatus::default().label(), "Current");
    }
}
