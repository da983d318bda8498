use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, query, query_as, query_scalar};

use crate::domain::RepositoryError;
use crate::domain::chapters::{
    BookRef, Chapter, ChapterDetail, ChapterListItem, ChapterRef, NewChapter,
};
use crate::domain::ids::{BookId, ChapterId};
use crate::domain::listing::{Page, PageRequest};
use crate::domain::repositories::ChapterRepository;
use crate::infrastructure::database::DatabasePool;

const CHAPTER_COLUMNS: &str =
    "id, book_id, title, content, order_num, word_count, is_vip, created_at";

#[derive(Clone)]
pub struct SqlChapterRepository {
    pool: DatabasePool,
}

impl SqlChapterRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn into_domain(record: ChapterRecord) -> Chapter {
        Chapter {
            id: ChapterId::new(record.id),
            book_id: BookId::new(record.book_id),
            title: record.title,
            content: record.content,
            order_num: record.order_num,
            word_count: record.word_count,
            is_vip: record.is_vip,
            created_at: record.created_at,
        }
    }

    async fn neighbour(
        &self,
        book_id: i64,
        order_num: i64,
        sql: &str,
    ) -> Result<Option<ChapterRef>, RepositoryError> {
        let record = query_as::<_, ChapterRefRecord>(sql)
            .bind(book_id)
            .bind(order_num)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(record.map(|r| ChapterRef {
            id: ChapterId::new(r.id),
            title: r.title,
        }))
    }
}

#[async_trait]
impl ChapterRepository for SqlChapterRepository {
    async fn insert(
        &self,
        book_id: BookId,
        chapter: NewChapter,
    ) -> Result<Chapter, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;
        let chapter = insert_chapter(&mut tx, book_id, &chapter).await?;
        tx.commit()
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;
        Ok(chapter)
    }

    async fn get(&self, id: ChapterId) -> Result<Chapter, RepositoryError> {
        let record = query_as::<_, ChapterRecord>(&format!(
            "SELECT {CHAPTER_COLUMNS} FROM chapters WHERE id = ?"
        ))
        .bind(i64::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        record.map(Self::into_domain).ok_or(RepositoryError::NotFound)
    }

    async fn get_detail(&self, id: ChapterId) -> Result<ChapterDetail, RepositoryError> {
        let chapter = self.get(id).await?;
        let book_id = i64::from(chapter.book_id);

        let book_title: String = query_scalar("SELECT title FROM books WHERE id = ?")
            .bind(book_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        let prev_chapter = self
            .neighbour(
                book_id,
                chapter.order_num,
                "SELECT id, title FROM chapters WHERE book_id = ? AND order_num < ? \
                 ORDER BY order_num DESC LIMIT 1",
            )
            .await?;
        let next_chapter = self
            .neighbour(
                book_id,
                chapter.order_num,
                "SELECT id, title FROM chapters WHERE book_id = ? AND order_num > ? \
                 ORDER BY order_num ASC LIMIT 1",
            )
            .await?;

        Ok(ChapterDetail {
            id: chapter.id,
            title: chapter.title,
            content: chapter.content,
            order_num: chapter.order_num,
            word_count: chapter.word_count,
            is_vip: chapter.is_vip,
            book: BookRef {
                id: chapter.book_id,
                title: book_title,
            },
            prev_chapter,
            next_chapter,
        })
    }

    async fn list_by_book(
        &self,
        book_id: BookId,
        request: PageRequest,
    ) -> Result<Page<ChapterListItem>, RepositoryError> {
        let total: i64 = query_scalar("SELECT COUNT(*) FROM chapters WHERE book_id = ?")
            .bind(i64::from(book_id))
            .fetch_one(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        let records = query_as::<_, ChapterListRecord>(
            r"SELECT id, title, order_num, word_count, is_vip, created_at
              FROM chapters
              WHERE book_id = ?
              ORDER BY order_num ASC
              LIMIT ? OFFSET ?",
        )
        .bind(i64::from(book_id))
        .bind(i64::from(request.limit()))
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        let items = records
            .into_iter()
            .map(|r| ChapterListItem {
                id: ChapterId::new(r.id),
                title: r.title,
                order_num: r.order_num,
                word_count: r.word_count,
                is_vip: r.is_vip,
                created_at: r.created_at,
            })
            .collect();

        Ok(Page::new(items, request, total as u64))
    }
}

/// Insert one chapter of `book_id` and bump the book's `chapter_count`.
/// Run it inside a transaction so the two writes land together.
pub(crate) async fn insert_chapter(
    conn: &mut SqliteConnection,
    book_id: BookId,
    chapter: &NewChapter,
) -> Result<Chapter, RepositoryError> {
    let word_count = chapter.effective_word_count();

    let record = query_as::<_, ChapterRecord>(&format!(
        "INSERT INTO chapters (book_id, title, content, order_num, word_count, is_vip, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {CHAPTER_COLUMNS}"
    ))
    .bind(i64::from(book_id))
    .bind(chapter.title.trim())
    .bind(&chapter.content)
    .bind(chapter.order_num)
    .bind(word_count)
    .bind(chapter.is_vip)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await
    .map_err(|err| {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return RepositoryError::conflict(format!(
                    "Chapter {} already exists for book {book_id}",
                    chapter.order_num
                ));
            }
            if db_err.is_foreign_key_violation() {
                return RepositoryError::NotFound;
            }
        }
        RepositoryError::unexpected(err.to_string())
    })?;

    query("UPDATE books SET chapter_count = chapter_count + 1 WHERE id = ?")
        .bind(i64::from(book_id))
        .execute(&mut *conn)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

    Ok(SqlChapterRepository::into_domain(record))
}

#[derive(Debug, sqlx::FromRow)]
struct ChapterRecord {
    id: i64,
    book_id: i64,
    title: String,
    content: String,
    order_num: i64,
    word_count: i64,
    is_vip: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ChapterListRecord {
    id: i64,
    title: String,
    order_num: i64,
    word_count: i64,
    is_vip: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ChapterRefRecord {
    id: i64,
    title: String,
}
