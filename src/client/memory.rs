use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ClientError, DocumentClient};
use crate::types::{Fields, Filter, RawDocument};

/// In-process [`DocumentClient`] with the same visible semantics as the
/// Postgres client. Collections spring into existence on first write;
/// iteration order is the key order, which keeps tests deterministic.
///
/// This is the fake the facade test suite runs against, and it also
/// serves embedded usage where no remote store is available.
#[derive(Debug, Default)]
pub struct MemoryClient {
    collections: RwLock<HashMap<String, BTreeMap<String, Fields>>>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(collection).map_or(0, BTreeMap::len)
    }

    pub async fn is_empty(&self, collection: &str) -> bool {
        self.len(collection).await == 0
    }
}

#[async_trait]
impl DocumentClient for MemoryClient {
    async fn scan(&self, collection: &str) -> Result<Vec<RawDocument>, ClientError> {
        let collections = self.collections.read().await;
        let docs = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| RawDocument::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(docs)
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<RawDocument>, ClientError> {
        let docs = self.scan(collection).await?;
        Ok(docs
            .into_iter()
            .filter(|doc| filter.matches(&doc.fields))
            .collect())
    }

    async fn get(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> Result<Option<RawDocument>, ClientError> {
        let collections = self.collections.read().await;
        let doc = collections
            .get(collection)
            .and_then(|docs| docs.get(doc_id))
            .map(|fields| RawDocument::new(doc_id, fields.clone()));
        Ok(doc)
    }

    async fn set(
        &self,
        collection: &str,
        doc_id: &str,
        fields: &Fields,
    ) -> Result<(), ClientError> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_owned())
            .or_default()
            .insert(doc_id.to_owned(), fields.clone());
        Ok(())
    }

    async fn merge(
        &self,
        collection: &str,
        doc_id: &str,
        patch: &Fields,
    ) -> Result<bool, ClientError> {
        let mut collections = self.collections.write().await;
        let Some(fields) = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(doc_id))
        else {
            return Ok(false);
        };
        for (key, value) in patch {
            fields.insert(key.clone(), value.clone());
        }
        Ok(true)
    }

    async fn delete(&self, collection: &str, doc_id: &str) -> Result<bool, ClientError> {
        let mut collections = self.collections.write().await;
        let removed = collections
            .get_mut(collection)
            .is_some_and(|docs| docs.remove(doc_id).is_some());
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(pairs: &[(&str, serde_json::Value)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn set_get_roundtrip() {
        let client = MemoryClient::new();
        let doc = fields(&[("name", json!("Ann"))]);
        client.set("users", "u1", &doc).await.unwrap();

        let got = client.get("users", "u1").await.unwrap().unwrap();
        assert_eq!(got.doc_id, "u1");
        assert_eq!(got.fields, doc);
        assert!(client.get("users", "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn merge_missing_creates_nothing() {
        let client = MemoryClient::new();
        let merged = client
            .merge("users", "ghost", &fields(&[("a", json!(1))]))
            .await
            .unwrap();
        assert!(!merged);
        assert!(client.is_empty("users").await);
    }

    #[tokio::test]
    async fn merge_overwrites_and_keeps() {
        let client = MemoryClient::new();
        client
            .set("users", "u1", &fields(&[("a", json!(1)), ("b", json!(2))]))
            .await
            .unwrap();
        let merged = client
            .merge("users", "u1", &fields(&[("b", json!(20)), ("c", json!(3))]))
            .await
            .unwrap();
        assert!(merged);

        let got = client.get("users", "u1").await.unwrap().unwrap();
        assert_eq!(got.fields, fields(&[("a", json!(1)), ("b", json!(20)), ("c", json!(3))]));
    }

    #[tokio::test]
    async fn find_applies_conjunction() {
        let client = MemoryClient::new();
        client
            .set("t", "d1", &fields(&[("k", json!("a")), ("n", json!(1))]))
            .await
            .unwrap();
        client
            .set("t", "d2", &fields(&[("k", json!("a")), ("n", json!(2))]))
            .await
            .unwrap();

        let filter = Filter::empty().eq("k", json!("a")).eq("n", json!(2));
        let found = client.find("t", &filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].doc_id, "d2");
    }

    #[tokio::test]
    async fn scan_unknown_collection_is_empty() {
        let client = MemoryClient::new();
        assert!(client.scan("nothing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let client = MemoryClient::new();
        client.set("t", "d1", &fields(&[("k", json!(1))])).await.unwrap();
        assert!(client.delete("t", "d1").await.unwrap());
        assert!(!client.delete("t", "d1").await.unwrap());
    }
}
