use serde::Deserialize;

use crate::models::MAX_REVIEW_LEN;

pub const REQUIRED: &str = "This field is required.";

/// Per-field validation messages, in the order they were raised.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormErrors(Vec<(&'static str, String)>);

impl FormErrors {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push((field, message.into()));
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.iter().find(|(f, _)| *f == field).map(|(_, m)| m.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AddMovieForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub csrf_token: String,
}

impl AddMovieForm {
    /// Returns the trimmed title to search for.
    pub fn validate(&self) -> Result<String, FormErrors> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormErrors::single("title", REQUIRED));
        }
        Ok(title.to_string())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RateMovieForm {
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub review: String,
    #[serde(default)]
    pub csrf_token: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rating {
    pub rating: f64,
    pub review: String,
}

impl RateMovieForm {
    pub fn validate(&self) -> Result<Rating, FormErrors> {
        let mut errors = FormErrors::default();

        let rating = self.rating.trim();
        let parsed = if rating.is_empty() {
            errors.add("rating", REQUIRED);
            None
        } else {
            match rating.parse::<f64>() {
                Ok(value) if value.is_finite() && (0.0..=10.0).contains(&value) => Some(value),
                Ok(_) => {
                    errors.add("rating", "Rating must be between 0 and 10.");
                    None
                },
                Err(_) => {
                    errors.add("rating", "Rating must be a number, e.g. 7.5.");
                    None
                },
            }
        };

        let review = self.review.trim();
        if review.is_empty() {
            errors.add("review", REQUIRED);
        } else if review.chars().count() > MAX_REVIEW_LEN {
            errors.add("review", format!("Review must be at most {MAX_REVIEW_LEN} characters."));
        }

        let rating = Rating { rating: parsed.unwrap_or_default(), review: review.to_string() };
        errors.into_result(rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(rating: &str, review: &str) -> RateMovieForm {
        RateMovieForm {
            rating: rating.to_string(),
            review: review.to_string(),
            csrf_token: String::new(),
        }
    }

    #[test]
    fn add_form_requires_a_title() {
        let form = AddMovieForm { title: "   ".to_string(), csrf_token: String::new() };
        assert_eq!(form.validate().unwrap_err().get("title"), Some(REQUIRED));

        let form = AddMovieForm { title: " Heat ".to_string(), csrf_token: String::new() };
        assert_eq!(form.validate().unwrap(), "Heat");
    }

    #[test]
    fn rating_form_accepts_decimal_rating() {
        let rating = rate("8.5", "Great").validate().unwrap();
        assert_eq!(rating, Rating { rating: 8.5, review: "Great".to_string() });
    }

    #[test]
    fn rating_form_reports_every_missing_field() {
        let errors = rate("", "").validate().unwrap_err();
        assert_eq!(errors.get("rating"), Some(REQUIRED));
        assert_eq!(errors.get("review"), Some(REQUIRED));
    }

    #[test]
    fn rating_must_be_a_number_out_of_ten() {
        let errors = rate("great", "ok").validate().unwrap_err();
        assert!(errors.get("rating").unwrap().contains("number"));

        let errors = rate("11", "ok").validate().unwrap_err();
        assert!(errors.get("rating").unwrap().contains("between"));
        assert_eq!(errors.get("review"), None);

        assert!(rate("NaN", "ok").validate().is_err());
    }

    #[test]
    fn review_length_is_capped() {
        let errors = rate("7", &"a".repeat(MAX_REVIEW_LEN + 1)).validate().unwrap_err();
        assert!(errors.get("review").is_some());
        assert!(rate("7", &"a".repeat(MAX_REVIEW_LEN)).validate().is_ok());
    }
}
