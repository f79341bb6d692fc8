use async_trait::async_trait;
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};

use crate::{
    errors::StoreError,
    repositories::document_store::{Direction, Document, DocumentData, DocumentStore, Query},
};

/// Server clock of the database, rendered in the same fixed-width form as
/// `format_timestamp`.
const SERVER_STAMP: &str =
    r#"to_jsonb(to_char(now() AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS.US"Z"'))"#;

/// [`DocumentStore`] over a single `documents` table with a `jsonb` payload.
#[derive(Clone)]
pub struct PgDocumentStore {
    pub pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        PgDocumentStore { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

type DocumentRow = (String, Json<DocumentData>);

fn into_document((id, data): DocumentRow) -> Document {
    Document::new(id, data.0)
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn add(&self, collection: &str, data: DocumentData) -> Result<String, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO documents (collection, data)
            VALUES ($1, $2::jsonb || jsonb_build_object('createdAt', {stamp}, 'updatedAt', {stamp}))
            RETURNING id
            "#,
            stamp = SERVER_STAMP
        );

        let id: String = sqlx::query_scalar(&sql)
            .bind(collection)
            .bind(Json(&data))
            .fetch_one(&self.pool)
            .await?;

        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let row: Option<DocumentRow> = sqlx::query_as(
            r#"
            SELECT id, data FROM documents
            WHERE collection = $1 AND id = $2
            "#
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(into_document))
    }

    async fn update(&self, collection: &str, id: &str, patch: DocumentData) -> Result<(), StoreError> {
        let sql = format!(
            r#"
            UPDATE documents
            SET data = data || $3::jsonb || jsonb_build_object('updatedAt', {stamp})
            WHERE collection = $1 AND id = $2
            "#,
            stamp = SERVER_STAMP
        );

        let result = sqlx::query(&sql)
            .bind(collection)
            .bind(id)
            .bind(Json(&patch))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM documents
            WHERE collection = $1 AND id = $2
            "#
        )
        .bind(collection)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT id, data FROM documents WHERE collection = ");
        builder.push_bind(collection.to_string());

        for (field, value) in &query.filters {
            builder.push(" AND data -> ").push_bind(field.clone());
            builder.push(" = ").push_bind(Json(value.clone()));
        }

        if let Some((field, direction)) = &query.order_by {
            // Missing keys yield NULL here and drop out with explicit nulls.
            builder.push(" AND jsonb_typeof(data -> ").push_bind(field.clone());
            builder.push(") <> 'null'");

            builder.push(" ORDER BY data -> ").push_bind(field.clone());
            builder.push(match direction {
                Direction::Ascending => " ASC",
                Direction::Descending => " DESC",
            });
            builder.push(", seq ASC");
        } else {
            builder.push(" ORDER BY seq ASC");
        }

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(limit as i64);
        }

        let rows: Vec<DocumentRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(into_document).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
