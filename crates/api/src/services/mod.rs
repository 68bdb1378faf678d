//! Business-logic services layered over the repositories and external
//! clients.

pub mod auth;
pub mod images;
pub mod orders;
pub mod storage;

pub use auth::{AuthError, AuthService};
pub use images::{ImageError, ImagePipeline};
pub use orders::{OrderError, OrderService};
pub use storage::{StorageClient, StorageError};
