use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, html};

use crate::{
    csrf,
    entities::movie,
    forms::FormErrors,
    models::{PLACEHOLDER_REVIEW, UNRATED, image_url},
    tmdb::Candidate,
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const INPUT_CLASS: &str = "mt-2 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";
const BUTTON_CLASS: &str =
    "w-full rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700";

pub fn list_page(movies: &[movie::Model]) -> String {
    page(
        "My Top Movies",
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-4xl mx-auto px-6 py-12" {
                    div class="flex items-start justify-between gap-6" {
                        div {
                            h1 class="text-3xl font-bold text-gray-900" { "My Top Movies" }
                            p class="mt-2 text-gray-600" { "These are my all-time favourite movies." }
                        }
                        a class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" href="/add" { "Add Movie" }
                    }

                    @if movies.is_empty() {
                        div class="mt-10 bg-white shadow rounded-lg p-8" {
                            p class="text-gray-600" { "No movies yet. Add one to start your list." }
                        }
                    } @else {
                        div class="mt-10 space-y-4" {
                            @for film in movies {
                                (movie_card(film))
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn add_page(token: &str, title: &str, errors: &FormErrors) -> String {
    page(
        "Add Movie",
        card(html! {
            h1 class="text-2xl font-bold text-gray-900" { "Add a Movie" }
            form class="mt-8 space-y-6" method="post" action="/add" {
                (csrf_field(token, errors))
                div {
                    label class="block text-sm font-medium text-gray-700" for="title" { "Movie Title" }
                    input class=(INPUT_CLASS) name="title" id="title" value=(title) required;
                    (field_error(errors, "title"))
                }
                button class=(BUTTON_CLASS) type="submit" { "Add Movie" }
            }
            a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
        }),
    )
}

pub fn select_page(query: &str, candidates: &[Candidate], image_base_url: &str) -> String {
    page(
        "Select Movie",
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-2xl mx-auto px-6 py-12" {
                    h1 class="text-3xl font-bold text-gray-900" { "Select Movie" }
                    p class="mt-2 text-gray-600" { "Results for \u{201c}" (query) "\u{201d}" }

                    @if candidates.is_empty() {
                        div class="mt-10 bg-white shadow rounded-lg p-8" {
                            p class="text-gray-600" { "No movies matched that title." }
                            a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/add" { "Try another title" }
                        }
                    } @else {
                        ul class="mt-10 space-y-3" {
                            @for candidate in candidates {
                                li class="bg-white shadow rounded-lg p-4 flex items-center gap-4" {
                                    @if let Some(poster) = &candidate.poster_path {
                                        img class="h-16 w-11 rounded object-cover" src=(image_url(image_base_url, poster)) alt=(candidate.title);
                                    }
                                    a class="text-lg font-medium text-blue-600 hover:text-blue-800" href=(find_href(candidate)) {
                                        (candidate.title)
                                        @if let Some(date) = candidate.release_date.as_deref().filter(|d| !d.is_empty()) {
                                            span class="ml-2 font-normal text-gray-500" { "(" (date) ")" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn edit_page(
    film: &movie::Model,
    token: &str,
    rating: &str,
    review: &str,
    errors: &FormErrors,
) -> String {
    page(
        "Edit Movie",
        card(html! {
            h1 class="text-2xl font-bold text-gray-900" { (film.title) }
            p class="mt-2 text-gray-600" { "Edit movie rating" }
            form class="mt-8 space-y-6" method="post" {
                (csrf_field(token, errors))
                div {
                    label class="block text-sm font-medium text-gray-700" for="rating" { "Your Rating Out of 10 e.g. 7.5" }
                    input class=(INPUT_CLASS) name="rating" id="rating" value=(rating) required;
                    (field_error(errors, "rating"))
                }
                div {
                    label class="block text-sm font-medium text-gray-700" for="review" { "Your Review" }
                    input class=(INPUT_CLASS) name="review" id="review" value=(review) maxlength="300" required;
                    (field_error(errors, "review"))
                }
                button class=(BUTTON_CLASS) type="submit" { "Done" }
            }
            a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
        }),
    )
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    page(
        "Error",
        card(html! {
            h1 class="text-2xl font-bold text-gray-900" {
                (status.canonical_reason().unwrap_or("Error"))
            }
            p class="mt-4 text-gray-700" { (message) }
            a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
        }),
    )
}

/// Link that confirms a search candidate through `/find`.
pub fn find_href(candidate: &Candidate) -> String {
    format!(
        "/find?title={}&year={}&description={}&img_url={}",
        urlencoding::encode(&candidate.title),
        urlencoding::encode(candidate.release_date.as_deref().unwrap_or_default()),
        urlencoding::encode(candidate.overview.as_deref().unwrap_or_default()),
        urlencoding::encode(candidate.poster_path.as_deref().unwrap_or_default()),
    )
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body { (body) }
        }
    }
    .into_string()
}

fn card(inner: Markup) -> Markup {
    html! {
        div class="min-h-screen bg-gray-50 flex items-center justify-center" {
            div class="max-w-xl w-full px-6" {
                div class="bg-white shadow rounded-lg p-8" { (inner) }
            }
        }
    }
}

fn csrf_field(token: &str, errors: &FormErrors) -> Markup {
    html! {
        input type="hidden" name=(csrf::FIELD_NAME) value=(token);
        (field_error(errors, csrf::FIELD_NAME))
    }
}

fn field_error(errors: &FormErrors, field: &str) -> Markup {
    html! {
        @if let Some(message) = errors.get(field) {
            p class="mt-2 text-sm text-red-600" { (message) }
        }
    }
}

fn movie_card(film: &movie::Model) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-6 flex gap-6" {
            img class="h-36 w-24 rounded object-cover" src=(film.img_url) alt=(film.title);
            div class="flex-1" {
                div class="flex items-start justify-between gap-4" {
                    h2 class="text-xl font-semibold text-gray-900" {
                        @if let Some(rank) = film.ranking {
                            span class="mr-2 text-gray-400" { "#" (rank) }
                        }
                        (film.title)
                        span class="ml-2 font-normal text-gray-500" { "(" (film.year) ")" }
                    }
                    span class="text-lg font-semibold text-amber-600" { (rating_label(film.rating)) }
                }
                p class="mt-2 text-sm italic text-gray-700" { (review_label(film.review.as_deref())) }
                p class="mt-2 text-sm text-gray-600" { (film.description) }
                div class="mt-4 flex gap-4 text-sm" {
                    a class="text-blue-600 hover:text-blue-800" href=(format!("/edit?id={}", film.id)) { "Update" }
                    a class="text-red-600 hover:text-red-800" href=(format!("/delete?id={}", film.id)) { "Delete" }
                }
            }
        }
    }
}

fn rating_label(rating: Option<f64>) -> String {
    match rating {
        Some(r) if r != UNRATED => format!("{r:.1}"),
        _ => "Not rated yet".to_string(),
    }
}

fn review_label(review: Option<&str>) -> &str {
    match review {
        Some(r) if r != PLACEHOLDER_REVIEW && !r.is_empty() => r,
        _ => "No review yet",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_href_carries_every_candidate_field() {
        let candidate = Candidate {
            title: "Heat & Dust".to_string(),
            release_date: Some("1983-02-03".to_string()),
            overview: None,
            poster_path: Some("/heat.jpg".to_string()),
        };

        assert_eq!(
            find_href(&candidate),
            "/find?title=Heat%20%26%20Dust&year=1983-02-03&description=&img_url=%2Fheat.jpg"
        );
    }

    #[test]
    fn unrated_movies_say_so() {
        assert_eq!(rating_label(Some(0.0)), "Not rated yet");
        assert_eq!(rating_label(None), "Not rated yet");
        assert_eq!(rating_label(Some(7.26)), "7.3");
        assert_eq!(review_label(Some("None")), "No review yet");
    }
}
