use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Location a serialized model artifact can be fetched from
#[async_trait]
pub trait ModelSource: Send + Sync {
    /// Human-readable location for logs
    fn describe(&self) -> String;

    /// Write the artifact to `dest`, returning the number of bytes written
    async fn download(&self, dest: &Path) -> Result<u64>;
}
