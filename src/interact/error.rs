use thiserror::Error;

use crate::{config::FactorId, interact::RequestId};

/// Recoverable conditions surfaced by the controller.
///
/// A region missing from one side of the join is not an error: it renders in
/// the no-data color and is reported through [`JoinCoverage`](crate::data::JoinCoverage).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("no values for {factor} in {year}")]
    EmptyJoin { year: i32, factor: FactorId },

    #[error("failed to load map data: {0}")]
    FetchFailure(String),

    #[error("response to {0} was superseded by a newer request")]
    StaleResponse(RequestId),

    #[error("no region named {0:?}")]
    InvalidSelection(String),
}
