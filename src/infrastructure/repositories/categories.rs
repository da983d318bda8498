use async_trait::async_trait;
use sqlx::query_as;

use crate::domain::RepositoryError;
use crate::domain::categories::{Category, NewCategory};
use crate::domain::ids::CategoryId;
use crate::domain::repositories::CategoryRepository;
use crate::infrastructure::database::DatabasePool;

#[derive(Clone)]
pub struct SqlCategoryRepository {
    pool: DatabasePool,
}

impl SqlCategoryRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn into_domain(record: CategoryRecord) -> Category {
        Category {
            id: CategoryId::new(record.id),
            name: record.name,
            order_num: record.order_num,
        }
    }
}

#[async_trait]
impl CategoryRepository for SqlCategoryRepository {
    async fn insert(&self, category: NewCategory) -> Result<Category, RepositoryError> {
        let record = query_as::<_, CategoryRecord>(
            "INSERT INTO categories (name, order_num) VALUES (?, ?) \
             RETURNING id, name, order_num",
        )
        .bind(category.name.trim())
        .bind(category.order_num)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err
                && db_err.is_unique_violation()
            {
                return RepositoryError::conflict("A category with this name already exists");
            }
            RepositoryError::unexpected(err.to_string())
        })?;

        Ok(Self::into_domain(record))
    }

    async fn get_by_name(&self, name: &str) -> Result<Category, RepositoryError> {
        let record = query_as::<_, CategoryRecord>(
            "SELECT id, name, order_num FROM categories WHERE name = TRIM(?)",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        record.map(Self::into_domain).ok_or(RepositoryError::NotFound)
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepositoryError> {
        let records = query_as::<_, CategoryRecord>(
            "SELECT id, name, order_num FROM categories ORDER BY order_num ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(records.into_iter().map(Self::into_domain).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRecord {
    id: i64,
    name: String,
    order_num: i64,
}
