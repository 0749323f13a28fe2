use async_trait::async_trait;
use log::debug;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use super::{ClientError, DocumentClient};
use crate::params;
use crate::types::{Fields, Filter, RawDocument};

/// Postgres-backed [`DocumentClient`].
///
/// Documents are rows of `document_t`: one JSONB payload per document,
/// keyed by `(collection, doc_id)`. Equality conjunctions compile to
/// one exact-match predicate per constraint, so the store evaluates
/// the whole filter server-side with the same meaning as
/// [`Filter::matches`].
#[derive(Debug, Clone)]
pub struct PgClient {
    pool: PgPool,
}

impl PgClient {
    /// Connects using the provided configuration and creates the
    /// `document_t` table when it is missing.
    pub async fn connect(config: &params::StoreConfig) -> Result<Self, ClientError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;

        let client = Self { pool };
        if config.bootstrap_schema {
            client.ensure_schema().await?;
        }
        Ok(client)
    }

    /// Wraps an already-built pool; the caller keeps ownership of the
    /// connection lifecycle.
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_schema(&self) -> Result<(), ClientError> {
        debug!("bootstrapping document_t schema");
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS document_t (
                collection TEXT NOT NULL,
                doc_id TEXT NOT NULL,
                data JSONB NOT NULL,
                PRIMARY KEY (collection, doc_id)
            )"#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Builds the filtered read statement: one `data -> field = value`
/// comparison per constraint. Field values must equal the constraint
/// value exactly — containment (`@>`) would also accept stored arrays
/// and objects that merely include the filter value as a subset, and
/// would collapse repeated constraints on one field.
fn compile_find_sql(constraints: usize) -> String {
    let mut sql = String::from("SELECT doc_id, data FROM document_t WHERE collection = $1");
    for n in 0..constraints {
        let field = 2 * n + 2;
        sql.push_str(&format!(" AND data -> ${field} = ${}", field + 1));
    }
    sql.push_str(" ORDER BY doc_id");
    sql
}

fn cast_document(row: PgRow) -> Result<RawDocument, ClientError> {
    let doc_id: String = row.try_get("doc_id")?;
    let data: serde_json::Value = row.try_get("data")?;
    match data {
        serde_json::Value::Object(fields) => Ok(RawDocument { doc_id, fields }),
        other => Err(ClientError::MalformedDocument {
            doc_id,
            msg: format!("expected a JSON object, found {other}"),
        }),
    }
}

#[async_trait]
impl DocumentClient for PgClient {
    async fn scan(&self, collection: &str) -> Result<Vec<RawDocument>, ClientError> {
        let rows = sqlx::query(
            r#"SELECT doc_id, data FROM document_t
            WHERE collection = $1
            ORDER BY doc_id"#,
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(cast_document).collect()
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<RawDocument>, ClientError> {
        if filter.is_empty() {
            return self.scan(collection).await;
        }

        let sql = compile_find_sql(filter.constraints().len());
        let mut query = sqlx::query(&sql).bind(collection);
        for (field, value) in filter.constraints() {
            query = query.bind(field.as_str()).bind(value.clone());
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(cast_document).collect()
    }

    async fn get(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> Result<Option<RawDocument>, ClientError> {
        let row = sqlx::query(
            r#"SELECT doc_id, data FROM document_t
            WHERE collection = $1 AND doc_id = $2"#,
        )
        .bind(collection)
        .bind(doc_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(cast_document).transpose()
    }

    async fn set(
        &self,
        collection: &str,
        doc_id: &str,
        fields: &Fields,
    ) -> Result<(), ClientError> {
        sqlx::query(
            r#"INSERT INTO document_t (collection, doc_id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, doc_id)
            DO UPDATE SET data = EXCLUDED.data"#,
        )
        .bind(collection)
        .bind(doc_id)
        .bind(serde_json::Value::Object(fields.clone()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn merge(
        &self,
        collection: &str,
        doc_id: &str,
        patch: &Fields,
    ) -> Result<bool, ClientError> {
        // `||` is a shallow top-level merge, the same semantics the
        // memory client implements field by field.
        let result = sqlx::query(
            r#"UPDATE document_t
            SET data = data || $3
            WHERE collection = $1 AND doc_id = $2"#,
        )
        .bind(collection)
        .bind(doc_id)
        .bind(serde_json::Value::Object(patch.clone()))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: &str, doc_id: &str) -> Result<bool, ClientError> {
        let result = sqlx::query(
            r#"DELETE FROM document_t
            WHERE collection = $1 AND doc_id = $2"#,
        )
        .bind(collection)
        .bind(doc_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_sql_is_one_equality_per_constraint() {
        assert_eq!(
            compile_find_sql(2),
            "SELECT doc_id, data FROM document_t WHERE collection = $1 \
             AND data -> $2 = $3 AND data -> $4 = $5 ORDER BY doc_id"
        );
    }

    #[test]
    fn find_sql_never_uses_containment() {
        for constraints in 1..4 {
            assert!(!compile_find_sql(constraints).contains("@>"));
        }
    }
}
