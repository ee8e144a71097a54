use crate::tree::NodeId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("the cluster tree has no nodes")]
    EmptyTree,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("node {node} has a single child; binary merges need two")]
    MalformedNode { node: NodeId },
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
