use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexError>;

/// One or more required catalog columns are absent from the whole table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("catalog is missing required column(s): {}", .missing.join(", "))]
pub struct SchemaError {
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("cannot fit a vocabulary: the catalog has no indexable text")]
    EmptyCorpus,
    /// Every term appeared in more rows than `max_df` allows.
    #[error("no terms remain after pruning {pruned} term(s) by document frequency")]
    NoTermsRemain { pruned: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Build(#[from] BuildError),
}
