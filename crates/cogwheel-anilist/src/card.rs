//! Renderer-agnostic cards for AniList data.
//!
//! Cards carry exactly what a Discord embed needs but do not depend on
//! serenity, so the layout rules are tested without a gateway.

use crate::models::{ListEntry, ListKind, ListStatus, Profile};
use cogwheel_common::utils::truncate_string;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// AniList brand colour, used when a profile has no colour of its own.
pub const DEFAULT_COLOR: u32 = 0x02A9FF;

/// Discord's limit on a single embed field value.
pub const FIELD_VALUE_LIMIT: usize = 1024;

const ZERO_WIDTH: &str = "\u{200b}";

/// Colours AniList users can pick by name.
const NAMED_COLORS: [(&str, u32); 7] = [
    ("blue", 0x3DB4F2),
    ("purple", 0xC063FF),
    ("pink", 0xFC9DD6),
    ("orange", 0xFC9344),
    ("red", 0xE13333),
    ("green", 0x4CCA51),
    ("gray", 0x677B94),
];

/// A titled block of fields, rendered as an embed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Card {
    /// Title line.
    pub title: String,
    /// Link behind the title.
    pub url: Option<String>,
    /// Accent colour.
    pub color: u32,
    /// Body text.
    pub description: Option<String>,
    /// Small image in the corner.
    pub thumbnail: Option<String>,
    /// Large image at the bottom.
    pub image: Option<String>,
    /// Footer line.
    pub footer: Option<String>,
    /// Fields in display order.
    pub fields: Vec<CardField>,
}

/// One name/value pair of a [`Card`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardField {
    /// Field heading.
    pub name: String,
    /// Field body.
    pub value: String,
    /// Whether the field may share a row with its neighbours.
    pub inline: bool,
}

impl Card {
    fn new(title: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            color,
            ..Self::default()
        }
    }

    fn field(&mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) {
        self.fields.push(CardField {
            name: name.into(),
            value: value.into(),
            inline,
        });
    }

    fn spacer(&mut self) {
        self.field(ZERO_WIDTH, ZERO_WIDTH, true);
    }

    /// Field with the given name, if present.
    pub fn find_field(&self, name: &str) -> Option<&CardField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

static CLEANUP_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"https?://\S+", ""),
        (r"(img|Img)(\d*%?)?\(+", ""),
        (r"\)+", ""),
        (r"\(+", ""),
        (r"~!.*?!~", ""),
        (r"__(.*?)__", "$1"),
        (r"\*\*(.*?)\*\*", "$1"),
        (r"_(.*?)_", "$1"),
        (r"[~\[\]{}]", ""),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| {
        Regex::new(pattern).ok().map(|regex| (regex, replacement))
    })
    .collect()
});

/// Strips AniList markdown, links, image embeds and spoilers from profile text.
pub fn clean_anilist_text(text: &str) -> String {
    let cleaned = CLEANUP_RULES
        .iter()
        .fold(text.to_string(), |acc, (regex, replacement)| {
            regex.replace_all(&acc, *replacement).into_owned()
        });
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolves an AniList profile colour, which is either a name or `#rrggbb`.
pub fn profile_color(color: Option<&str>) -> u32 {
    let Some(color) = color.filter(|c| !c.is_empty()) else {
        return DEFAULT_COLOR;
    };

    if let Some(hex) = color.strip_prefix('#') {
        return u32::from_str_radix(hex, 16).unwrap_or(DEFAULT_COLOR);
    }

    let lowered = color.to_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lowered)
        .map_or(DEFAULT_COLOR, |(_, value)| *value)
}

/// Ten-cell bar for a score out of 100.
pub fn score_bar(score: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = (score / 10.0).clamp(0.0, 10.0) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

fn score_value(score: f64) -> String {
    format!("**{score:.2} // 100**\n{}", score_bar(score))
}

fn bullet_list(titles: &[&str]) -> String {
    titles
        .iter()
        .map(|title| format!("• {title}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Card summarising one profile.
pub fn profile_card(profile: &Profile) -> Card {
    let mut card = Card::new(
        format!("AniList Profile for {}", profile.name),
        profile_color(profile.profile_color()),
    );
    card.url = Some(profile.site_url.clone());
    card.thumbnail = profile.avatar_url().map(str::to_string);
    card.image = profile.banner_image.clone();

    if let Some(about) = profile.about.as_deref() {
        let cleaned = clean_anilist_text(about);
        if !cleaned.is_empty() {
            let about: String = cleaned.chars().take(FIELD_VALUE_LIMIT).collect();
            card.field("About", about, false);
        }
    }

    let anime = &profile.statistics.anime;
    let manga = &profile.statistics.manga;

    card.field(
        "Anime Stats",
        format!(
            "Count: {}\nEpisodes: {}\nTime: {} days",
            anime.count,
            anime.episodes_watched,
            anime.minutes_watched / 1440
        ),
        true,
    );
    card.field("Anime Score", score_value(anime.mean_score), true);
    card.spacer();

    card.field(
        "Manga Stats",
        format!(
            "Count: {}\nChapters: {}\nVolumes: {}",
            manga.count, manga.chapters_read, manga.volumes_read
        ),
        true,
    );
    card.field("Manga Score", score_value(manga.mean_score), true);
    card.spacer();

    let favourite_anime = profile.favourites.anime.titles(5);
    if !favourite_anime.is_empty() {
        card.field("Favorite Anime", bullet_list(&favourite_anime), true);
    }
    let favourite_manga = profile.favourites.manga.titles(5);
    if !favourite_manga.is_empty() {
        card.field("Favorite Manga", bullet_list(&favourite_manga), true);
    }

    card
}

/// One page of a list, plus where it sits in the whole list.
#[derive(Debug, Clone, Copy)]
pub struct ListPage<'a> {
    /// Entries on this page.
    pub entries: &'a [ListEntry],
    /// One-based page number.
    pub number: usize,
    /// Total number of pages.
    pub count: usize,
    /// Entries per page.
    pub per_page: usize,
    /// Entries in the whole list.
    pub total: usize,
}

fn format_score(score: Option<f64>) -> String {
    let score = score.unwrap_or_default();
    if score.fract() == 0.0 {
        format!("{score:.0}")
    } else {
        format!("{score:.1}")
    }
}

/// Card for one page of a user's anime or manga list.
pub fn list_card(kind: ListKind, status: ListStatus, page: ListPage<'_>) -> Card {
    let mut card = Card::new(format!("{kind} List - {}", status.label()), DEFAULT_COLOR);

    if page.entries.is_empty() {
        card.description = Some("No entries found for this status.".to_string());
        return card;
    }

    for entry in page.entries {
        let total = match kind {
            ListKind::Anime => entry.media.episodes,
            ListKind::Manga => entry.media.chapters,
        }
        .map_or_else(|| "?".to_string(), |total| total.to_string());

        card.field(
            truncate_string(entry.media.title.english_or_romaji(), 256),
            format!(
                "Progress: {}/{total} {}\nScore: {}/10",
                entry.progress.unwrap_or_default(),
                kind.unit(),
                format_score(entry.score)
            ),
            false,
        );
    }

    let first = (page.number - 1) * page.per_page + 1;
    let last = (first + page.entries.len() - 1).min(page.total);
    card.footer = Some(format!(
        "Page {}/{} | Showing entries {first}-{last} out of {}",
        page.number, page.count, page.total
    ));

    card
}

fn compare_line(first: &Profile, second: &Profile, a: impl ToString, b: impl ToString) -> String {
    format!(
        "{}: {}\n{}: {}",
        first.name,
        a.to_string(),
        second.name,
        b.to_string()
    )
}

fn favourites_line(first: &Profile, second: &Profile, pick: fn(&Profile) -> Vec<&str>) -> String {
    format!(
        "**{}**: {}\n**{}**: {}",
        first.name,
        pick(first).join(", "),
        second.name,
        pick(second).join(", ")
    )
}

/// Side-by-side comparison of two profiles.
pub fn comparison_card(first: &Profile, second: &Profile) -> Card {
    let mut card = Card::new("AniList Profile Comparison", DEFAULT_COLOR);
    card.thumbnail = first.avatar_url().map(str::to_string);
    card.image = second.avatar_url().map(str::to_string);

    card.field(&first.name, format!("[Profile]({})", first.site_url), true);
    card.field(&second.name, format!("[Profile]({})", second.site_url), true);
    card.spacer();

    let (a1, a2) = (&first.statistics.anime, &second.statistics.anime);
    card.field("Anime Count", compare_line(first, second, a1.count, a2.count), true);
    card.field(
        "Anime Episodes",
        compare_line(first, second, a1.episodes_watched, a2.episodes_watched),
        true,
    );
    card.field(
        "Anime Hours",
        compare_line(first, second, a1.minutes_watched / 60, a2.minutes_watched / 60),
        true,
    );
    card.field(
        "Anime Score",
        compare_line(
            first,
            second,
            format!("{:.2}", a1.mean_score),
            format!("{:.2}", a2.mean_score),
        ),
        true,
    );

    let (m1, m2) = (&first.statistics.manga, &second.statistics.manga);
    card.field("Manga Count", compare_line(first, second, m1.count, m2.count), true);
    card.field(
        "Manga Chapters",
        compare_line(first, second, m1.chapters_read, m2.chapters_read),
        true,
    );
    card.field(
        "Manga Volumes",
        compare_line(first, second, m1.volumes_read, m2.volumes_read),
        true,
    );
    card.field(
        "Manga Score",
        compare_line(
            first,
            second,
            format!("{:.2}", m1.mean_score),
            format!("{:.2}", m2.mean_score),
        ),
        true,
    );

    card.field(
        "Top 3 Favorite Anime",
        favourites_line(first, second, |p| p.favourites.anime.titles(3)),
        false,
    );
    card.field(
        "Top 3 Favorite Manga",
        favourites_line(first, second, |p| p.favourites.manga.titles(3)),
        false,
    );

    card
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AnimeStatistics, Avatar, FavouriteConnection, FavouriteNode, Media, MediaTitle,
        ProfileOptions,
    };

    fn profile(name: &str) -> Profile {
        let mut profile = Profile {
            name: name.to_string(),
            site_url: format!("https://anilist.co/user/{name}"),
            avatar: Some(Avatar {
                medium: Some(format!("https://img/{name}.png")),
            }),
            ..Profile::default()
        };
        profile.statistics.anime = AnimeStatistics {
            count: 12,
            episodes_watched: 300,
            minutes_watched: 7200,
            mean_score: 75.5,
        };
        profile.favourites.anime = FavouriteConnection {
            nodes: ["Mushishi", "Aria", "Haibane Renmei", "Kino", "Planetes", "Monster"]
                .into_iter()
                .map(|title| FavouriteNode {
                    title: MediaTitle {
                        romaji: Some(title.to_string()),
                        english: None,
                    },
                })
                .collect(),
        };
        profile
    }

    fn entry(title: &str, progress: u32, episodes: Option<u32>, score: f64) -> ListEntry {
        ListEntry {
            media: Media {
                title: MediaTitle {
                    romaji: Some(format!("{title} (romaji)")),
                    english: Some(title.to_string()),
                },
                episodes,
                ..Media::default()
            },
            status: Some("CURRENT".into()),
            progress: Some(progress),
            score: Some(score),
        }
    }

    #[test]
    fn test_clean_anilist_text() {
        let about = "Hi __there__! img220(https://x.y/a.png) **bold** ~!spoiler!~ [link]  _it_";
        assert_eq!(clean_anilist_text(about), "Hi there! bold link it");
    }

    #[test]
    fn test_profile_color() {
        assert_eq!(profile_color(None), DEFAULT_COLOR);
        assert_eq!(profile_color(Some("Pink")), 0xFC9DD6);
        assert_eq!(profile_color(Some("#123abc")), 0x0012_3ABC);
        assert_eq!(profile_color(Some("#zzz")), DEFAULT_COLOR);
        assert_eq!(profile_color(Some("teal")), DEFAULT_COLOR);
    }

    #[test]
    fn test_score_bar() {
        assert_eq!(score_bar(75.5), "███████░░░");
        assert_eq!(score_bar(0.0), "░░░░░░░░░░");
        assert_eq!(score_bar(100.0), "██████████");
    }

    #[test]
    fn test_profile_card_layout() {
        let mut profile = profile("Mugen");
        profile.options = Some(ProfileOptions {
            profile_color: Some("green".into()),
        });
        profile.about = Some("~!hidden!~".into());

        let card = profile_card(&profile);
        assert_eq!(card.title, "AniList Profile for Mugen");
        assert_eq!(card.color, 0x4CCA51);
        assert!(card.find_field("About").is_none());
        assert_eq!(
            card.find_field("Anime Stats").unwrap().value,
            "Count: 12\nEpisodes: 300\nTime: 5 days"
        );
        assert!(card.find_field("Anime Score").unwrap().value.starts_with("**75.50 // 100**"));
        assert_eq!(
            card.find_field("Favorite Anime").unwrap().value.lines().count(),
            5
        );
        assert!(card.find_field("Favorite Manga").is_none());
    }

    #[test]
    fn test_about_is_limited() {
        let mut profile = profile("Jin");
        profile.about = Some("word ".repeat(500));
        let card = profile_card(&profile);
        assert_eq!(card.find_field("About").unwrap().value.chars().count(), FIELD_VALUE_LIMIT);
    }

    #[test]
    fn test_list_card_page() {
        let entries = vec![entry("Cowboy Bebop", 26, Some(26), 9.0), entry("Trigun", 3, None, 7.5)];
        let card = list_card(
            ListKind::Anime,
            ListStatus::Current,
            ListPage {
                entries: &entries,
                number: 2,
                count: 2,
                per_page: 6,
                total: 8,
            },
        );

        assert_eq!(card.title, "Anime List - Current");
        assert_eq!(card.fields[0].name, "Cowboy Bebop");
        assert_eq!(card.fields[0].value, "Progress: 26/26 episodes\nScore: 9/10");
        assert_eq!(card.fields[1].value, "Progress: 3/? episodes\nScore: 7.5/10");
        assert_eq!(
            card.footer.as_deref(),
            Some("Page 2/2 | Showing entries 7-8 out of 8")
        );
    }

    #[test]
    fn test_empty_list_card() {
        let card = list_card(
            ListKind::Manga,
            ListStatus::Dropped,
            ListPage {
                entries: &[],
                number: 1,
                count: 1,
                per_page: 6,
                total: 0,
            },
        );
        assert_eq!(card.title, "Manga List - Dropped");
        assert_eq!(card.description.as_deref(), Some("No entries found for this status."));
        assert!(card.footer.is_none());
    }

    #[test]
    fn test_comparison_card() {
        let first = profile("Spike");
        let mut second = profile("Faye");
        second.statistics.anime.mean_score = 60.0;

        let card = comparison_card(&first, &second);
        assert_eq!(card.fields[0].value, "[Profile](https://anilist.co/user/Spike)");
        assert_eq!(
            card.find_field("Anime Hours").unwrap().value,
            "Spike: 120\nFaye: 120"
        );
        assert_eq!(
            card.find_field("Anime Score").unwrap().value,
            "Spike: 75.50\nFaye: 60.00"
        );
        assert_eq!(
            card.find_field("Top 3 Favorite Anime").unwrap().value,
            "**Spike**: Mushishi, Aria, Haibane Renmei\n**Faye**: Mushishi, Aria, Haibane Renmei"
        );
        assert_eq!(card.image.as_deref(), Some("https://img/Faye.png"));
    }
}
