//! Content-addressable asset storage for pitchkit.
//!
//! Generated assets live on the media provider's CDN only temporarily. This
//! crate copies them somewhere durable through the
//! [`AssetStorage`](pitchkit_interface::AssetStorage) contract.
//!
//! # Example
//!
//! ```rust
//! use pitchkit_core::MediaKind;
//! use pitchkit_interface::StoreRequest;
//! use pitchkit_storage::FileSystemStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = FileSystemStorage::new("/tmp/pitchkit-assets")?;
//! let request = StoreRequest {
//!     asset_url: "https://cdn.example/anvil.png".to_string(),
//!     file_name: "acme-image-1.png".to_string(),
//!     owner_key: "marketing".to_string(),
//!     session_key: "Acme".to_string(),
//!     kind: MediaKind::Image,
//! };
//!
//! let stored = storage.store_bytes(b"png bytes", &request).await?;
//! assert_eq!(storage.retrieve(&stored).await?, b"png bytes");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;

pub use filesystem::FileSystemStorage;
pub use pitchkit_error::{StorageError, StorageErrorKind};
