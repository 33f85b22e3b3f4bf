// ---------------------------------------------------------------------------
// Host summarizer client
// ---------------------------------------------------------------------------
//
// Loads host lists, tracks which hosts are selected, submits the selection to
// the analysis service and keeps the latest results.

pub mod acquire;
pub mod api;
pub mod controller;
pub mod error;
pub mod selection;
pub mod state;

pub use acquire::{SampleSource, Upload};
pub use api::{ApiClient, DEFAULT_API_URL};
pub use controller::Controller;
pub use error::{ClientError, ErrorKind};
pub use selection::{parse_indices, Selection};
pub use state::{Completion, Dispatch, Notice, Phase, Session, Ticket};
