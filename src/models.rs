use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Review text stored for a movie that has not been reviewed yet.
pub const PLACEHOLDER_REVIEW: &str = "None";
/// Rating stored for a movie that has not been rated yet.
pub const UNRATED: f64 = 0.0;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 600;
pub const MAX_REVIEW_LEN: usize = 300;
pub const MAX_IMG_URL_LEN: usize = 250;

/// Query string of `/find`: the candidate the user picked from the search results.
#[derive(Debug, Default, Deserialize)]
pub struct Selection {
    pub title: Option<String>,
    pub year: Option<String>,
    pub description: Option<String>,
    pub img_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewMovie {
    pub title: String,
    pub year: i32,
    pub description: String,
    pub img_url: String,
}

impl NewMovie {
    pub fn from_selection(selection: Selection, image_base_url: &str) -> AppResult<Self> {
        let title = selection
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::bad_request("title is required"))?;
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(AppError::bad_request(format!(
                "title must be at most {MAX_TITLE_LEN} characters"
            )));
        }

        let release_date =
            selection.year.ok_or_else(|| AppError::bad_request("year is required"))?;
        let year = year_from_release_date(&release_date).ok_or_else(|| {
            AppError::bad_request(format!("year {release_date:?} does not start with a year"))
        })?;

        let description = selection
            .description
            .ok_or_else(|| AppError::bad_request("description is required"))?
            .chars()
            .take(MAX_DESCRIPTION_LEN)
            .collect();

        let poster_path =
            selection.img_url.ok_or_else(|| AppError::bad_request("img_url is required"))?;
        let img_url = image_url(image_base_url, &poster_path);
        if img_url.chars().count() > MAX_IMG_URL_LEN {
            return Err(AppError::bad_request(format!(
                "img_url must be at most {MAX_IMG_URL_LEN} characters"
            )));
        }

        Ok(Self { title, year, description, img_url })
    }
}

/// Year component of a `YYYY-MM-DD` release date: everything before the first `-`.
pub fn year_from_release_date(release_date: &str) -> Option<i32> {
    release_date.split('-').next()?.trim().parse().ok()
}

pub fn image_url(base_url: &str, poster_path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if poster_path.starts_with('/') {
        format!("{base}{poster_path}")
    } else {
        format!("{base}/{poster_path}")
    }
}

/// 1-based rank of the movie at `index` when `count` movies are sorted best first.
pub fn rank_for(index: usize, count: usize) -> i32 {
    i32::try_from(index % count + 1).unwrap_or(i32::MAX)
}

/// Query string accepted by `/edit`.
#[derive(Debug, Default, Deserialize)]
pub struct MovieLookup {
    pub id: Option<i32>,
    pub title: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LookupKey {
    Id(i32),
    Title(String),
}

impl MovieLookup {
    /// `id` wins over `title` when both are present.
    pub fn key(&self) -> AppResult<LookupKey> {
        if let Some(id) = self.id {
            return Ok(LookupKey::Id(id));
        }
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => Ok(LookupKey::Title(title.to_string())),
            _ => Err(AppError::bad_request("id or title is required")),
        }
    }
}

impl std::fmt::Display for LookupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupKey::Id(id) => write!(f, "id {id}"),
            LookupKey::Title(title) => write!(f, "title {title:?}"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    pub id: Option<i32>,
}
