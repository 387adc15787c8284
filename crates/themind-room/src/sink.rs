//! Where a room's outbound frames go.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::SinkError;

/// One encoded outbound message. Shared so a broadcast encodes once and
/// every recipient gets the same allocation.
pub type Frame = Arc<[u8]>;

/// Channel sender for delivering frames to a player's writer task.
pub type PlayerSender = mpsc::UnboundedSender<Frame>;

/// A push-only handle to one player's connection.
///
/// `send` is called while a room lock is held, so implementations must
/// never block or await.
pub trait ConnectionSink: Send + Sync + 'static {
    /// Queues a frame for delivery.
    ///
    /// # Errors
    /// Returns `SinkError::Closed` if the connection is gone.
    fn send(&self, frame: Frame) -> Result<(), SinkError>;
}

impl ConnectionSink for PlayerSender {
    fn send(&self, frame: Frame) -> Result<(), SinkError> {
        mpsc::UnboundedSender::send(self, frame).map_err(|_| SinkError::Closed)
    }
}
