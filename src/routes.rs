use axum::{
    extract::{Form, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::SignedCookieJar;
use tracing::info;

use crate::{
    AppState, csrf,
    entities::movie,
    error::{AppError, AppResult},
    forms::{AddMovieForm, FormErrors, RateMovieForm},
    models::{DeleteQuery, MovieLookup, NewMovie, PLACEHOLDER_REVIEW, Selection, UNRATED},
    templates,
};

pub async fn home(State(state): State<AppState>) -> AppResult<Html<String>> {
    let movies = state.store.list_ranked().await?;
    Ok(Html(templates::list_page(&movies)))
}

pub async fn add_form(jar: SignedCookieJar) -> (SignedCookieJar, Html<String>) {
    let (jar, token) = csrf::issue(jar);
    (jar, Html(templates::add_page(&token, "", &FormErrors::default())))
}

pub async fn search(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<AddMovieForm>,
) -> AppResult<Response> {
    let checked = csrf::verify(state.config.csrf_enabled, &jar, &form.csrf_token)
        .and_then(|()| form.validate());

    let query = match checked {
        Ok(query) => query,
        Err(errors) => {
            let (jar, token) = csrf::issue(jar);
            let body = templates::add_page(&token, &form.title, &errors);
            return Ok((jar, Html(body)).into_response());
        },
    };

    let candidates = state.tmdb.search_movie(&query).await?;
    info!(query = %query, results = candidates.len(), "movie search");

    let body = templates::select_page(&query, &candidates, &state.config.tmdb_image_base_url);
    Ok(Html(body).into_response())
}

pub async fn find(
    State(state): State<AppState>,
    Query(selection): Query<Selection>,
) -> AppResult<Redirect> {
    let new_movie = NewMovie::from_selection(selection, &state.config.tmdb_image_base_url)?;
    let film = state.store.insert(new_movie).await?;
    info!(id = film.id, title = %film.title, year = film.year, "movie added");

    Ok(Redirect::to(&format!("/edit?title={}", urlencoding::encode(&film.title))))
}

pub async fn edit_form(
    State(state): State<AppState>,
    Query(lookup): Query<MovieLookup>,
    jar: SignedCookieJar,
) -> AppResult<(SignedCookieJar, Html<String>)> {
    let film = lookup_movie(&state, &lookup).await?;

    let rating = match film.rating {
        Some(r) if r != UNRATED => r.to_string(),
        _ => String::new(),
    };
    let review = film.review.as_deref().filter(|r| *r != PLACEHOLDER_REVIEW).unwrap_or_default();

    let (jar, token) = csrf::issue(jar);
    let body = templates::edit_page(&film, &token, &rating, review, &FormErrors::default());
    Ok((jar, Html(body)))
}

pub async fn update(
    State(state): State<AppState>,
    Query(lookup): Query<MovieLookup>,
    jar: SignedCookieJar,
    Form(form): Form<RateMovieForm>,
) -> AppResult<Response> {
    let film = lookup_movie(&state, &lookup).await?;

    let checked = csrf::verify(state.config.csrf_enabled, &jar, &form.csrf_token)
        .and_then(|()| form.validate());

    let rating = match checked {
        Ok(rating) => rating,
        Err(errors) => {
            let (jar, token) = csrf::issue(jar);
            let body = templates::edit_page(&film, &token, &form.rating, &form.review, &errors);
            return Ok((jar, Html(body)).into_response());
        },
    };

    let updated = state
        .store
        .rate(film.id, rating.rating, rating.review)
        .await?
        .ok_or_else(|| AppError::not_found(format!("no movie with id {}", film.id)))?;
    info!(id = updated.id, rating = ?updated.rating, "movie rated");

    Ok(Redirect::to("/").into_response())
}

pub async fn delete(
    State(state): State<AppState>,
    Query(query): Query<DeleteQuery>,
) -> AppResult<Redirect> {
    let id = query.id.ok_or_else(|| AppError::bad_request("id is required"))?;

    if !state.store.delete(id).await? {
        return Err(AppError::not_found(format!("no movie with id {id}")));
    }
    info!(id, "movie deleted");

    Ok(Redirect::to("/"))
}

async fn lookup_movie(state: &AppState, lookup: &MovieLookup) -> AppResult<movie::Model> {
    let key = lookup.key()?;
    state.store.find(&key).await?.ok_or_else(|| AppError::not_found(format!("no movie with {key}")))
}
