use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};
use tracing::debug;

use crate::{
    entities::movie,
    error::{AppError, AppResult},
    models::{LookupKey, NewMovie, PLACEHOLDER_REVIEW, UNRATED, rank_for},
};

#[derive(Clone)]
pub struct MovieStore {
    db: DatabaseConnection,
}

impl MovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All movies, best rated first, with `ranking` recomputed and saved.
    pub async fn list_ranked(&self) -> AppResult<Vec<movie::Model>> {
        let movies = movie::Entity::find()
            .order_by_desc(movie::Column::Rating)
            .order_by_asc(movie::Column::Id)
            .all(&self.db)
            .await?;

        let count = movies.len();
        let txn = self.db.begin().await?;
        let mut ranked = Vec::with_capacity(count);

        for (index, film) in movies.into_iter().enumerate() {
            let rank = rank_for(index, count);
            if film.ranking == Some(rank) {
                ranked.push(film);
                continue;
            }

            debug!(id = film.id, from = ?film.ranking, to = rank, "re-ranking movie");
            let mut active: movie::ActiveModel = film.into();
            active.ranking = Set(Some(rank));
            ranked.push(active.update(&txn).await?);
        }

        txn.commit().await?;
        Ok(ranked)
    }

    pub async fn find(&self, key: &LookupKey) -> AppResult<Option<movie::Model>> {
        let found = match key {
            LookupKey::Id(id) => movie::Entity::find_by_id(*id).one(&self.db).await?,
            LookupKey::Title(title) => {
                movie::Entity::find()
                    .filter(movie::Column::Title.eq(title.as_str()))
                    .order_by_asc(movie::Column::Id)
                    .one(&self.db)
                    .await?
            },
        };
        Ok(found)
    }

    pub async fn insert(&self, new: NewMovie) -> AppResult<movie::Model> {
        let title = new.title.clone();
        let model = movie::ActiveModel {
            id: NotSet,
            title: Set(new.title),
            year: Set(new.year),
            description: Set(new.description),
            rating: Set(Some(UNRATED)),
            ranking: Set(Some(0)),
            review: Set(Some(PLACEHOLDER_REVIEW.to_string())),
            img_url: Set(new.img_url),
        };

        model.insert(&self.db).await.map_err(|err| match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(title),
            _ => err.into(),
        })
    }

    /// Overwrites rating and review; `None` when no movie has this id.
    pub async fn rate(
        &self,
        id: i32,
        rating: f64,
        review: String,
    ) -> AppResult<Option<movie::Model>> {
        let Some(film) = movie::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: movie::ActiveModel = film.into();
        active.rating = Set(Some(rating));
        active.review = Set(Some(review));
        Ok(Some(active.update(&self.db).await?))
    }

    /// `false` when no movie has this id.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = movie::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> MovieStore {
        let db = crate::db::connect_and_migrate("sqlite::memory:").await.unwrap();
        MovieStore::new(db)
    }

    fn new_movie(title: &str) -> NewMovie {
        NewMovie {
            title: title.to_string(),
            year: 2000,
            description: format!("About {title}"),
            img_url: format!("https://image.tmdb.org/t/p/w500/{title}.jpg"),
        }
    }

    async fn add_rated(store: &MovieStore, title: &str, rating: f64) -> movie::Model {
        let film = store.insert(new_movie(title)).await.unwrap();
        store.rate(film.id, rating, "ok".to_string()).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn insert_uses_unrated_defaults() {
        let store = memory_store().await;
        let film = store.insert(new_movie("Heat")).await.unwrap();

        assert_eq!(film.rating, Some(0.0));
        assert_eq!(film.ranking, Some(0));
        assert_eq!(film.review.as_deref(), Some("None"));
    }

    #[tokio::test]
    async fn duplicate_title_is_a_conflict() {
        let store = memory_store().await;
        store.insert(new_movie("Heat")).await.unwrap();

        let err = store.insert(new_movie("Heat")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref t) if t == "Heat"));
    }

    #[tokio::test]
    async fn ranks_follow_rating_order() {
        let store = memory_store().await;
        add_rated(&store, "Middle", 6.0).await;
        add_rated(&store, "Worst", 2.5).await;
        add_rated(&store, "Best", 9.1).await;

        let ranked = store.list_ranked().await.unwrap();
        let order: Vec<(&str, Option<i32>)> =
            ranked.iter().map(|m| (m.title.as_str(), m.ranking)).collect();
        assert_eq!(order, vec![("Best", Some(1)), ("Middle", Some(2)), ("Worst", Some(3))]);

        let stored = store.find(&LookupKey::Title("Worst".to_string())).await.unwrap().unwrap();
        assert_eq!(stored.ranking, Some(3));
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let store = memory_store().await;
        assert!(store.list_ranked().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rate_touches_only_the_target() {
        let store = memory_store().await;
        let heat = store.insert(new_movie("Heat")).await.unwrap();
        let ronin = store.insert(new_movie("Ronin")).await.unwrap();

        let updated = store.rate(heat.id, 8.5, "Great".to_string()).await.unwrap().unwrap();
        assert_eq!(updated.rating, Some(8.5));
        assert_eq!(updated.review.as_deref(), Some("Great"));

        let untouched = store.find(&LookupKey::Id(ronin.id)).await.unwrap().unwrap();
        assert_eq!(untouched, ronin);
    }

    #[tokio::test]
    async fn missing_rows_are_reported() {
        let store = memory_store().await;
        assert!(store.rate(42, 5.0, "meh".to_string()).await.unwrap().is_none());
        assert!(!store.delete(42).await.unwrap());
        assert!(store.find(&LookupKey::Title("Nope".to_string())).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let store = memory_store().await;
        let film = store.insert(new_movie("Heat")).await.unwrap();

        assert!(store.delete(film.id).await.unwrap());
        assert!(store.find(&LookupKey::Id(film.id)).await.unwrap().is_none());
    }
}
