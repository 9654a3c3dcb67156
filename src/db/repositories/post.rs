//! Blog post repository

use crate::config::DatabaseDriver;
use crate::db::DbPool;
use crate::models::{BlogPost, PostFields};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

const POST_COLUMNS: &str = "id, title, subtitle, date, body, author, img_url";

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a post and return it with its assigned id
    async fn create(&self, fields: &PostFields, date: &str) -> Result<BlogPost>;
    async fn get_by_id(&self, id: i64) -> Result<Option<BlogPost>>;
    /// All posts ordered by id ascending
    async fn list(&self) -> Result<Vec<BlogPost>>;
    /// Overwrite every column of the row with `post.id`
    async fn update(&self, post: &BlogPost) -> Result<Option<BlogPost>>;
    /// Returns `false` when no row had that id
    async fn delete(&self, id: i64) -> Result<bool>;
    async fn exists_by_title(&self, title: &str) -> Result<bool>;
    async fn exists_by_title_excluding(&self, title: &str, exclude_id: i64) -> Result<bool>;
    async fn count(&self) -> Result<i64>;
}

pub struct SqlxPostRepository {
    pool: DbPool,
}

impl SqlxPostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, fields: &PostFields, date: &str) -> Result<BlogPost> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.sqlite()?, fields, date).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.mysql()?, fields, date).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<BlogPost>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.mysql()?, id).await,
        }
    }

    async fn list(&self) -> Result<Vec<BlogPost>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.pool.sqlite()?).await,
            DatabaseDriver::Mysql => list_mysql(self.pool.mysql()?).await,
        }
    }

    async fn update(&self, post: &BlogPost) -> Result<Option<BlogPost>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_sqlite(self.pool.sqlite()?, post).await,
            DatabaseDriver::Mysql => update_mysql(self.pool.mysql()?, post).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query("DELETE FROM blog_posts WHERE id = ?")
                .bind(id)
                .execute(self.pool.sqlite()?)
                .await
                .context("Failed to delete post")?
                .rows_affected(),
            DatabaseDriver::Mysql => sqlx::query("DELETE FROM blog_posts WHERE id = ?")
                .bind(id)
                .execute(self.pool.mysql()?)
                .await
                .context("Failed to delete post")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }

    async fn exists_by_title(&self, title: &str) -> Result<bool> {
        let sql = "SELECT COUNT(*) AS count FROM blog_posts WHERE title = ?";
        let count: i64 = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(sql)
                .bind(title)
                .fetch_one(self.pool.sqlite()?)
                .await?
                .get("count"),
            DatabaseDriver::Mysql => sqlx::query(sql)
                .bind(title)
                .fetch_one(self.pool.mysql()?)
                .await?
                .get("count"),
        };
        Ok(count > 0)
    }

    async fn exists_by_title_excluding(&self, title: &str, exclude_id: i64) -> Result<bool> {
        let sql = "SELECT COUNT(*) AS count FROM blog_posts WHERE title = ? AND id != ?";
        let count: i64 = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(sql)
                .bind(title)
                .bind(exclude_id)
                .fetch_one(self.pool.sqlite()?)
                .await?
                .get("count"),
            DatabaseDriver::Mysql => sqlx::query(sql)
                .bind(title)
                .bind(exclude_id)
                .fetch_one(self.pool.mysql()?)
                .await?
                .get("count"),
        };
        Ok(count > 0)
    }

    async fn count(&self) -> Result<i64> {
        let sql = "SELECT COUNT(*) AS count FROM blog_posts";
        let count = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(sql)
                .fetch_one(self.pool.sqlite()?)
                .await
                .context("Failed to count posts")?
                .get("count"),
            DatabaseDriver::Mysql => sqlx::query(sql)
                .fetch_one(self.pool.mysql()?)
                .await
                .context("Failed to count posts")?
                .get("count"),
        };
        Ok(count)
    }
}

// SQLite implementations
async fn create_sqlite(pool: &SqlitePool, fields: &PostFields, date: &str) -> Result<BlogPost> {
    let result = sqlx::query(
        "INSERT INTO blog_posts (title, subtitle, date, body, author, img_url) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&fields.title)
    .bind(&fields.subtitle)
    .bind(date)
    .bind(&fields.body)
    .bind(&fields.author)
    .bind(&fields.img_url)
    .execute(pool)
    .await
    .context("Failed to create post")?;

    Ok(new_post(result.last_insert_rowid(), fields, date))
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<BlogPost>> {
    let row = sqlx::query(&format!("SELECT {} FROM blog_posts WHERE id = ?", POST_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post")?;
    Ok(row.as_ref().map(row_to_post_sqlite))
}

async fn list_sqlite(pool: &SqlitePool) -> Result<Vec<BlogPost>> {
    let rows = sqlx::query(&format!("SELECT {} FROM blog_posts ORDER BY id ASC", POST_COLUMNS))
        .fetch_all(pool)
        .await
        .context("Failed to list posts")?;
    Ok(rows.iter().map(row_to_post_sqlite).collect())
}

async fn update_sqlite(pool: &SqlitePool, post: &BlogPost) -> Result<Option<BlogPost>> {
    let result = sqlx::query(
        "UPDATE blog_posts SET title = ?, subtitle = ?, date = ?, body = ?, author = ?, img_url = ? WHERE id = ?",
    )
    .bind(&post.title)
    .bind(&post.subtitle)
    .bind(&post.date)
    .bind(&post.body)
    .bind(&post.author)
    .bind(&post.img_url)
    .bind(post.id)
    .execute(pool)
    .await
    .context("Failed to update post")?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_by_id_sqlite(pool, post.id).await
}

fn row_to_post_sqlite(row: &sqlx::sqlite::SqliteRow) -> BlogPost {
    BlogPost {
        id: row.get("id"),
        title: row.get("title"),
        subtitle: row.get("subtitle"),
        date: row.get("date"),
        body: row.get("body"),
        author: row.get("author"),
        img_url: row.get("img_url"),
    }
}

// MySQL implementations
async fn create_mysql(pool: &MySqlPool, fields: &PostFields, date: &str) -> Result<BlogPost> {
    let result = sqlx::query(
        "INSERT INTO blog_posts (title, subtitle, date, body, author, img_url) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&fields.title)
    .bind(&fields.subtitle)
    .bind(date)
    .bind(&fields.body)
    .bind(&fields.author)
    .bind(&fields.img_url)
    .execute(pool)
    .await
    .context("Failed to create post")?;

    Ok(new_post(result.last_insert_id() as i64, fields, date))
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<BlogPost>> {
    let row = sqlx::query(&format!("SELECT {} FROM blog_posts WHERE id = ?", POST_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post")?;
    Ok(row.as_ref().map(row_to_post_mysql))
}

async fn list_mysql(pool: &MySqlPool) -> Result<Vec<BlogPost>> {
    let rows = sqlx::query(&format!("SELECT {} FROM blog_posts ORDER BY id ASC", POST_COLUMNS))
        .fetch_all(pool)
        .await
        .context("Failed to list posts")?;
    Ok(rows.iter().map(row_to_post_mysql).collect())
}

async fn update_mysql(pool: &MySqlPool, post: &BlogPost) -> Result<Option<BlogPost>> {
    sqlx::query(
        "UPDATE blog_posts SET title = ?, subtitle = ?, date = ?, body = ?, author = ?, img_url = ? WHERE id = ?",
    )
    .bind(&post.title)
    .bind(&post.subtitle)
    .bind(&post.date)
    .bind(&post.body)
    .bind(&post.author)
    .bind(&post.img_url)
    .bind(post.id)
    .execute(pool)
    .await
    .context("Failed to update post")?;

    // MySQL reports 0 affected rows when nothing changed, so re-read instead.
    get_by_id_mysql(pool, post.id).await
}

fn row_to_post_mysql(row: &sqlx::mysql::MySqlRow) -> BlogPost {
    BlogPost {
        id: row.get("id"),
        title: row.get("title"),
        subtitle: row.get("subtitle"),
        date: row.get("date"),
        body: row.get("body"),
        author: row.get("author"),
        img_url: row.get("img_url"),
    }
}

fn new_post(id: i64, fields: &PostFields, date: &str) -> BlogPost {
    BlogPost {
        id,
        title: fields.title.clone(),
        subtitle: fields.subtitle.clone(),
        date: date.to_string(),
        body: fields.body.clone(),
        author: fields.author.clone(),
        img_url: fields.img_url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{migrations, Database};

    async fn setup_repo() -> SqlxPostRepository {
        let pool = Database::in_memory().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxPostRepository::new(pool)
    }

    fn fields(title: &str) -> PostFields {
        PostFields {
            title: title.to_string(),
            subtitle: "A subtitle".to_string(),
            body: "<p>Body</p>".to_string(),
            author: "Jane Doe".to_string(),
            img_url: "https://example.com/bg.jpg".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = setup_repo().await;

        let created = repo.create(&fields("First"), "October 19, 2026").await.unwrap();
        assert!(created.id > 0);

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let repo = setup_repo().await;
        assert!(repo.get_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_ordered_by_id() {
        let repo = setup_repo().await;
        let a = repo.create(&fields("Zebra"), "d").await.unwrap();
        let b = repo.create(&fields("Aardvark"), "d").await.unwrap();

        let posts = repo.list().await.unwrap();
        let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let repo = setup_repo().await;
        let first = repo.create(&fields("One"), "d").await.unwrap();
        assert!(repo.delete(first.id).await.unwrap());

        let second = repo.create(&fields("Two"), "d").await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let repo = setup_repo().await;
        let mut post = repo.create(&fields("One"), "d").await.unwrap();
        post.id += 100;

        assert!(repo.update(&post).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let repo = setup_repo().await;
        let post = repo.create(&fields("One"), "d").await.unwrap();

        assert!(repo.delete(post.id).await.unwrap());
        assert!(!repo.delete(post.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_by_title() {
        let repo = setup_repo().await;
        let post = repo.create(&fields("Taken"), "d").await.unwrap();

        assert!(repo.exists_by_title("Taken").await.unwrap());
        assert!(!repo.exists_by_title("Free").await.unwrap());
        assert!(!repo.exists_by_title_excluding("Taken", post.id).await.unwrap());
        assert!(repo.exists_by_title_excluding("Taken", post.id + 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_title_insert_fails() {
        let repo = setup_repo().await;
        repo.create(&fields("Same"), "d").await.unwrap();

        assert!(repo.create(&fields("Same"), "d").await.is_err());
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
