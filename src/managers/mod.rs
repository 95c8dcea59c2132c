// Managers Module
//
// Focused manager classes owned by TracingSession.
//
// Each manager handles one specific concern:
// - StrokeManager: Stroke lifecycle and the raw/render sample buffers
// - BroadcastChannelManager: Tokio broadcast channel management

pub mod broadcast_manager;
pub mod stroke_manager;

pub use broadcast_manager::BroadcastChannelManager;
pub use stroke_manager::StrokeManager;
