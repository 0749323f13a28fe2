use chrono::Utc;
use log::{debug, trace, warn};
use serde_json::Value;

use super::{FacadeError, MutationOutcome};
use crate::client::DocumentClient;
use crate::types::{self, ADDED_AT, Fields, Filter, UID_FIELD};

/// Uniform, minimal-surface API for CRUD and simple-filter operations
/// against one document store. Hides client wiring and raw document
/// shapes: callers pass collection names and plain field mappings and
/// get plain field mappings back.
///
/// The facade is stateless between calls; it only holds the injected
/// [`DocumentClient`], whose lifecycle the caller owns.
pub struct DocStore<C> {
    client: C,
}

impl<C: DocumentClient> DocStore<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn into_client(self) -> C {
        self.client
    }

    /// Every document in the collection, normalized, with empty
    /// documents dropped. Order is the store's iteration order.
    pub async fn scan(&self, collection: &str) -> Result<Vec<Fields>, FacadeError> {
        let docs = self.client.scan(collection).await?;
        Ok(types::filter_empty(docs.into_iter().map(types::parse_doc)))
    }

    /// All documents whose reserved `uid` field equals `uid`.
    pub async fn get_docs(&self, collection: &str, uid: &str) -> Result<Vec<Fields>, FacadeError> {
        let filter = Filter::empty().eq(UID_FIELD, uid);
        let docs = self.client.find(collection, &filter).await?;
        Ok(types::filter_empty(docs.into_iter().map(types::parse_doc)))
    }

    /// Point lookup by storage key. A present but empty document
    /// normalizes to [`None`], the same shape scans produce.
    pub async fn get_doc(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> Result<Option<Fields>, FacadeError> {
        let doc = self.client.get(collection, doc_id).await?;
        Ok(doc.and_then(types::normalize))
    }

    /// All documents matching every (field, value) pair in `key_values`.
    /// An empty mapping applies no filter and is equivalent to [`scan`].
    ///
    /// [`scan`]: DocStore::scan
    pub async fn query(
        &self,
        collection: &str,
        key_values: Fields,
    ) -> Result<Vec<Fields>, FacadeError> {
        let filter = Filter::from(key_values);
        let docs = self.client.find(collection, &filter).await?;
        Ok(types::filter_empty(docs.into_iter().map(types::parse_doc)))
    }

    /// Inserts `data` as a new document and returns its identifier.
    ///
    /// The identifier is generated here (UUID v4) so the insert is a
    /// single write already carrying both the `added_at` stamp and
    /// `data[id_key_name] = <identifier>`; no intermediate id-less
    /// document ever exists in the store.
    ///
    /// `id_key_name` is the field that will hold the identifier, e.g.
    /// `"uid"`, `"channel_id"`. `data` is not expected to contain it;
    /// a present value is overwritten.
    pub async fn add(
        &self,
        collection: &str,
        mut data: Fields,
        id_key_name: &str,
    ) -> Result<String, FacadeError> {
        let doc_id = uuid::Uuid::new_v4().to_string();
        data.insert(ADDED_AT.to_owned(), Value::String(Utc::now().to_rfc3339()));
        data.insert(id_key_name.to_owned(), Value::String(doc_id.clone()));

        self.client.set(collection, &doc_id, &data).await?;
        trace!("added document `{doc_id}` to `{collection}`");
        Ok(doc_id)
    }

    /// Inserts `data` at the identifier it already carries in
    /// `id_key_name`, create-or-replace, stamping `added_at`.
    ///
    /// Fails fast with [`FacadeError::MissingIdField`] before any write
    /// when `id_key_name` is absent, or with
    /// [`FacadeError::InvalidIdValue`] when its value is not a string.
    pub async fn add_with_existing_id(
        &self,
        collection: &str,
        mut data: Fields,
        id_key_name: &str,
    ) -> Result<String, FacadeError> {
        let doc_id = match data.get(id_key_name) {
            None => return Err(FacadeError::MissingIdField(id_key_name.to_owned())),
            Some(Value::String(id)) => id.clone(),
            Some(other) => return Err(FacadeError::InvalidIdValue(other.to_string())),
        };
        data.insert(ADDED_AT.to_owned(), Value::String(Utc::now().to_rfc3339()));

        self.client.set(collection, &doc_id, &data).await?;
        trace!("added document `{doc_id}` to `{collection}` with caller id");
        Ok(doc_id)
    }

    /// Shallow-merges `update_dict` into the document at `doc_id`.
    ///
    /// With `uid` supplied the merge is guarded: the document is read
    /// first and patched only when it exists and its stored `uid` field
    /// equals the guard value. Without `uid` the merge is
    /// unconditional and a missing key reports
    /// [`MutationOutcome::NotFound`].
    pub async fn update(
        &self,
        collection: &str,
        doc_id: &str,
        update_dict: Fields,
        uid: Option<&str>,
    ) -> Result<MutationOutcome, FacadeError> {
        if let Some(outcome) = self.check_guard(collection, doc_id, uid).await? {
            return Ok(outcome);
        }

        let merged = self
            .client
            .merge(collection, doc_id, &update_dict)
            .await
            .inspect_err(|e| warn!("error updating document `{doc_id}`: {e}"))?;

        Ok(if merged {
            trace!("updated document `{doc_id}` in `{collection}`");
            MutationOutcome::Applied
        } else {
            MutationOutcome::NotFound
        })
    }

    /// Shallow-merges `update_dict` into every document matching
    /// `key_values`, returning how many were patched. Zero matches is
    /// success with `0`.
    ///
    /// Each match is an independent write with no cross-document
    /// atomicity: a failure partway through leaves the earlier writes
    /// in place and surfaces as [`FacadeError::PartialUpdate`], naming
    /// the failing document and how many writes landed before it.
    pub async fn update_where(
        &self,
        collection: &str,
        key_values: Fields,
        update_dict: Fields,
    ) -> Result<u64, FacadeError> {
        let filter = Filter::from(key_values);
        let matches = self
            .client
            .find(collection, &filter)
            .await
            .inspect_err(|e| warn!("error resolving update filter on `{collection}`: {e}"))?;
        let matched = matches.len() as u64;

        let mut applied = 0;
        for doc in matches {
            match self.client.merge(collection, &doc.doc_id, &update_dict).await {
                Ok(merged) => applied += u64::from(merged),
                Err(source) => {
                    warn!(
                        "error updating document `{}` ({applied}/{matched} applied): {source}",
                        doc.doc_id
                    );
                    return Err(FacadeError::PartialUpdate {
                        doc_id: doc.doc_id,
                        applied,
                        matched,
                        source,
                    });
                }
            }
        }

        debug!("patched {applied}/{matched} documents in `{collection}`");
        Ok(applied)
    }

    /// Removes the document at `doc_id`, under the same optional
    /// ownership guard as [`update`].
    ///
    /// [`update`]: DocStore::update
    pub async fn delete(
        &self,
        collection: &str,
        doc_id: &str,
        uid: Option<&str>,
    ) -> Result<MutationOutcome, FacadeError> {
        if let Some(outcome) = self.check_guard(collection, doc_id, uid).await? {
            return Ok(outcome);
        }

        let deleted = self
            .client
            .delete(collection, doc_id)
            .await
            .inspect_err(|e| warn!("error deleting document `{doc_id}`: {e}"))?;

        Ok(if deleted {
            trace!("deleted document `{doc_id}` from `{collection}`");
            MutationOutcome::Applied
        } else {
            MutationOutcome::NotFound
        })
    }

    /// Evaluates the ownership guard for a mutation. `None` means the
    /// mutation may proceed; `Some(outcome)` short-circuits it.
    async fn check_guard(
        &self,
        collection: &str,
        doc_id: &str,
        uid: Option<&str>,
    ) -> Result<Option<MutationOutcome>, FacadeError> {
        let Some(uid) = uid else {
            return Ok(None);
        };

        let doc = self
            .client
            .get(collection, doc_id)
            .await
            .inspect_err(|e| warn!("error reading document `{doc_id}` for guard: {e}"))?;

        match doc {
            None => Ok(Some(MutationOutcome::NotFound)),
            Some(doc) => {
                if doc.fields.get(UID_FIELD).and_then(Value::as_str) == Some(uid) {
                    Ok(None)
                } else {
                    trace!("ownership guard rejected mutation of `{doc_id}`");
                    Ok(Some(MutationOutcome::GuardFailed))
                }
            }
        }
    }
}
