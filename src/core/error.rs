use thiserror::Error;

/// Fatal engine errors.
///
/// Per-coordinate trouble (unreachable cells, refused placements,
/// missing scaffold material) is not an error; it is accumulated in the
/// build report. Only malformed input, collaborator faults and
/// cancellation travel this path.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Blueprint failed to load: {0}")]
    LoadFailure(String),

    #[error("World access fault: {0}")]
    WorldFault(String),

    #[error("Navigation fault: {0}")]
    NavigationFault(String),

    #[error("Inventory fault: {0}")]
    InventoryFault(String),

    #[error("Invalid job state: {0}")]
    InvalidState(String),

    #[error("Build job was cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, EngineError>;
