//! GraphQL documents sent to AniList.

const PROFILE_FIELDS: &str = r"
    name
    avatar { medium }
    bannerImage
    siteUrl
    about
    options { profileColor }
    favourites {
        anime { nodes { title { romaji } } }
        manga { nodes { title { romaji } } }
    }
    statistics {
        anime { count episodesWatched minutesWatched meanScore }
        manga { count chaptersRead volumesRead meanScore }
    }
";

pub fn viewer_profile() -> String {
    format!("query {{ Viewer {{ {PROFILE_FIELDS} }} }}")
}

pub fn user_profile() -> String {
    format!("query ($username: String) {{ User(name: $username) {{ {PROFILE_FIELDS} }} }}")
}

pub const VIEWER_ID: &str = "query { Viewer { id } }";

pub const LIST_COLLECTION: &str = r"
query ($userId: Int, $type: MediaType, $status: MediaListStatus) {
    MediaListCollection(userId: $userId, type: $type, status: $status) {
        lists {
            entries {
                media {
                    title { romaji english }
                    episodes
                    chapters
                    status
                }
                status
                progress
                score(format: POINT_10)
            }
        }
    }
}
";
