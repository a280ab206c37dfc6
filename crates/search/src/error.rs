use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("empty query")]
    EmptyQuery,

    #[error("query too long: {len} characters (limit {max})")]
    QueryTooLong { len: usize, max: usize },
}
