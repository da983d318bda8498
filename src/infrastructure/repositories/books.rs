use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, SqliteConnection, query, query_as, query_scalar};

use crate::domain::RepositoryError;
use crate::domain::books::{AuthorUser, BookDetail, BookFilter, BookStatus, BookSummary, NewBook};
use crate::domain::chapters::NewChapter;
use crate::domain::ids::{BookId, UserId};
use crate::domain::listing::{Page, PageRequest};
use crate::domain::repositories::BookRepository;
use crate::infrastructure::database::DatabasePool;
use crate::infrastructure::repositories::chapters::insert_chapter;

const BOOK_SELECT: &str = r"SELECT b.id, b.title, b.author, b.cover, b.description,
              COALESCE(c.name, '') AS category, b.word_count, b.chapter_count, b.status,
              b.rating, b.read_count, b.like_count, b.collect_count, b.comment_count,
              b.published_at, b.author_user_id
       FROM books b
       LEFT JOIN categories c ON c.id = b.category_id";

#[derive(Clone)]
pub struct SqlBookRepository {
    pool: DatabasePool,
}

impl SqlBookRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn into_summary(record: BookRecord, tags: Vec<String>) -> BookSummary {
        let status = BookStatus::from_str(&record.status).unwrap_or_else(|()| {
            tracing::warn!(status = %record.status, book_id = record.id, "unknown book status, defaulting to ongoing");
            BookStatus::default()
        });

        BookSummary {
            id: BookId::new(record.id),
            title: record.title,
            author: record.author,
            cover: record.cover,
            description: record.description,
            category: record.category,
            tags,
            word_count: record.word_count,
            chapter_count: record.chapter_count,
            status,
            rating: record.rating,
            read_count: record.read_count,
            like_count: record.like_count,
            collect_count: record.collect_count,
            comment_count: record.comment_count,
            published_at: record.published_at,
        }
    }

    /// Attach tag names to a batch of book rows, preserving row order.
    async fn enrich(&self, records: Vec<BookRecord>) -> Result<Vec<BookSummary>, RepositoryError> {
        let book_ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        let mut tags = fetch_tags_for_books(&self.pool, &book_ids).await?;

        Ok(records
            .into_iter()
            .map(|record| {
                let book_tags = tags.remove(&record.id).unwrap_or_default();
                Self::into_summary(record, book_tags)
            })
            .collect())
    }

    async fn fetch_record(&self, id: BookId) -> Result<BookRecord, RepositoryError> {
        query_as::<_, BookRecord>(&format!("{BOOK_SELECT} WHERE b.id = ?"))
            .bind(i64::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?
            .ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl BookRepository for SqlBookRepository {
    async fn insert(&self, new_book: NewBook) -> Result<BookSummary, RepositoryError> {
        let new_book = new_book.normalize();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;
        let book_id = insert_book(&mut tx, &new_book).await?;
        tx.commit()
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        self.get(BookId::new(book_id)).await
    }

    async fn insert_with_chapters(
        &self,
        new_book: NewBook,
        chapters: Vec<NewChapter>,
    ) -> Result<BookSummary, RepositoryError> {
        let new_book = new_book.normalize();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;
        let book_id = insert_book(&mut tx, &new_book).await?;
        for chapter in &chapters {
            insert_chapter(&mut tx, BookId::new(book_id), chapter).await?;
        }
        tx.commit()
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        self.get(BookId::new(book_id)).await
    }

    async fn get(&self, id: BookId) -> Result<BookSummary, RepositoryError> {
        let record = self.fetch_record(id).await?;
        let mut items = self.enrich(vec![record]).await?;
        items.pop().ok_or(RepositoryError::NotFound)
    }

    async fn get_detail(&self, id: BookId) -> Result<BookDetail, RepositoryError> {
        let record = self.fetch_record(id).await?;
        let author_user_id = record.author_user_id;

        let author_user = match author_user_id {
            Some(user_id) => query_as::<_, AuthorUserRecord>(
                "SELECT id, nickname, avatar FROM users WHERE id = ?",
            )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?
            .map(|r| AuthorUser {
                id: UserId::new(r.id),
                nickname: r.nickname,
                avatar: r.avatar,
            }),
            None => None,
        };

        let book = self
            .enrich(vec![record])
            .await?
            .pop()
            .ok_or(RepositoryError::NotFound)?;

        Ok(BookDetail { book, author_user })
    }

    async fn exists(&self, id: BookId) -> Result<bool, RepositoryError> {
        let found: Option<i64> = query_scalar("SELECT id FROM books WHERE id = ?")
            .bind(i64::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;
        Ok(found.is_some())
    }

    async fn list(
        &self,
        filter: &BookFilter,
        request: PageRequest,
    ) -> Result<Page<BookSummary>, RepositoryError> {
        let mut count = QueryBuilder::new(
            "SELECT COUNT(*) FROM books b LEFT JOIN categories c ON c.id = b.category_id",
        );
        let mut select = QueryBuilder::new(BOOK_SELECT);
        if let Some(category) = &filter.category {
            count.push(" WHERE c.name = ").push_bind(category.clone());
            select.push(" WHERE c.name = ").push_bind(category.clone());
        }

        let (total,): (i64,) = count
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        select
            .push(" ORDER BY b.id DESC LIMIT ")
            .push_bind(i64::from(request.limit()))
            .push(" OFFSET ")
            .push_bind(request.offset());

        let records = select
            .build_query_as::<BookRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        let items = self.enrich(records).await?;
        Ok(Page::new(items, request, total as u64))
    }

    async fn search(&self, keyword: &str, limit: u32) -> Result<Vec<BookSummary>, RepositoryError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = format!("%{}%", escape_like(keyword));

        let records = query_as::<_, BookRecord>(&format!(
            r"{BOOK_SELECT}
              WHERE b.title LIKE ?1 ESCAPE '\'
                 OR b.author LIKE ?1 ESCAPE '\'
                 OR b.description LIKE ?1 ESCAPE '\'
              ORDER BY b.read_count DESC, b.id DESC
              LIMIT ?2"
        ))
        .bind(pattern)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        self.enrich(records).await
    }
}

/// Insert the book row with its category and tags, returning the new id.
async fn insert_book(
    conn: &mut SqliteConnection,
    new_book: &NewBook,
) -> Result<i64, RepositoryError> {
    let category_id = match &new_book.category {
        Some(name) => {
            query("INSERT OR IGNORE INTO categories (name, order_num) VALUES (?, (SELECT COALESCE(MAX(order_num), 0) + 1 FROM categories))")
                .bind(name)
                .execute(&mut *conn)
                .await
                .map_err(|err| RepositoryError::unexpected(err.to_string()))?;
            let id: i64 = query_scalar("SELECT id FROM categories WHERE name = ?")
                .bind(name)
                .fetch_one(&mut *conn)
                .await
                .map_err(|err| RepositoryError::unexpected(err.to_string()))?;
            Some(id)
        }
        None => None,
    };

    let book_id: i64 = query_scalar(
        r"INSERT INTO books (title, author, cover, description, category_id, word_count, status,
                             rating, author_user_id, published_at, created_at)
          VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
          RETURNING id",
    )
    .bind(&new_book.title)
    .bind(&new_book.author)
    .bind(new_book.cover.as_deref())
    .bind(&new_book.description)
    .bind(category_id)
    .bind(new_book.word_count.unwrap_or(0))
    .bind(new_book.status.as_str())
    .bind(new_book.rating)
    .bind(new_book.author_user_id.map(UserId::into_inner))
    .bind(new_book.published_at)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await
    .map_err(|err| {
        if let sqlx::Error::Database(db_err) = &err
            && db_err.is_foreign_key_violation()
        {
            return RepositoryError::NotFound;
        }
        RepositoryError::unexpected(err.to_string())
    })?;

    for tag in &new_book.tags {
        query("INSERT OR IGNORE INTO tags (name) VALUES (?)")
            .bind(tag)
            .execute(&mut *conn)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;
        query(
            "INSERT OR IGNORE INTO book_tags (book_id, tag_id) \
             SELECT ?, id FROM tags WHERE name = ?",
        )
        .bind(book_id)
        .bind(tag)
        .execute(&mut *conn)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;
    }

    Ok(book_id)
}

/// Escape `%`, `_` and the escape character itself for a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

async fn fetch_tags_for_books(
    pool: &DatabasePool,
    book_ids: &[i64],
) -> Result<HashMap<i64, Vec<String>>, RepositoryError> {
    if book_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut qb = QueryBuilder::new(
        r"SELECT bt.book_id, t.name
          FROM book_tags bt
          JOIN tags t ON t.id = bt.tag_id
          WHERE bt.book_id IN (",
    );
    let mut sep = qb.separated(", ");
    for id in book_ids {
        sep.push_bind(*id);
    }
    sep.push_unseparated(") ORDER BY t.id");

    let records = qb
        .build_query_as::<BookTagRecord>()
        .fetch_all(pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

    let mut tags: HashMap<i64, Vec<String>> = HashMap::new();
    for record in records {
        tags.entry(record.book_id).or_default().push(record.name);
    }
    Ok(tags)
}

#[derive(Debug, sqlx::FromRow)]
struct BookRecord {
    id: i64,
    title: String,
    author: String,
    cover: Option<String>,
    description: String,
    category: String,
    word_count: i64,
    chapter_count: i64,
    status: String,
    rating: f64,
    read_count: i64,
    like_count: i64,
    collect_count: i64,
    comment_count: i64,
    published_at: Option<DateTime<Utc>>,
    author_user_id: Option<i64>,
}

#[derive(Debug, sqlx::FromRow)]
struct BookTagRecord {
    book_id: i64,
    name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct AuthorUserRecord {
    id: i64,
    nickname: String,
    avatar: Option<String>,
}
