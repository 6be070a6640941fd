// Domain models (business entities)
// Pure Rust, no transport dependencies

pub mod message;
pub mod session;
pub mod video;

pub use message::{DeliveryState, Message, Speaker};
pub use session::{IngestionState, Session, SessionPhase, SessionView};
pub use video::{Answer, IngestReport, VideoId};
