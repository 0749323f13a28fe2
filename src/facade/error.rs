#[derive(thiserror::Error, Debug)]
pub enum FacadeError {
    #[error("client error :: {0}")]
    Client(#[from] crate::client::ClientError),
    #[error("id key `{0}` not found in the data")]
    MissingIdField(String),
    #[error("id value must be a string, found `{0}`")]
    InvalidIdValue(String),
    #[error("update stopped at document `{doc_id}` after {applied} of {matched} writes :: {source}")]
    PartialUpdate {
        doc_id: String,
        applied: u64,
        matched: u64,
        source: crate::client::ClientError,
    },
}
