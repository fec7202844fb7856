mod controller;
mod error;
mod event;
mod popup;
mod request;
mod state;

pub use controller::ChoroplethController;
pub use error::MapError;
pub use event::{ControllerEvent, Dispatch, FetchOutcome, MapEvent};
pub use popup::Popup;
pub use request::{FetchRequest, Filter, RequestId, RequestSequencer};
pub use state::InteractionState;
