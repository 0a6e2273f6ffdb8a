//! Tests for filesystem asset storage.

use pitchkit_core::{MediaKind, StoredAsset};
use pitchkit_interface::{AssetStorage, StoreRequest};
use pitchkit_storage::FileSystemStorage;
use tempfile::TempDir;

fn request(kind: MediaKind, file_name: &str) -> StoreRequest {
    StoreRequest {
        asset_url: "https://cdn.example/asset".to_string(),
        file_name: file_name.to_string(),
        owner_key: "marketing".to_string(),
        session_key: "Acme".to_string(),
        kind,
    }
}

#[tokio::test]
async fn test_store_and_retrieve() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = FileSystemStorage::new(temp_dir.path())?;

    let data = b"Hello, world!";
    let stored = storage
        .store_bytes(data, &request(MediaKind::Image, "acme-image-1.png"))
        .await?;

    assert_eq!(stored.name, "acme-image-1.png");
    assert_eq!(stored.kind, MediaKind::Image);
    assert!(stored.url.starts_with("file://"));
    assert!(stored.url.ends_with(".png"));
    assert!(stored.url.contains("marketing/Acme/images"));

    let retrieved = storage.retrieve(&stored).await?;
    assert_eq!(retrieved, data);
    assert!(storage.exists(&stored).await?);
    Ok(())
}

#[tokio::test]
async fn test_deduplication() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = FileSystemStorage::new(temp_dir.path())?;

    let data = b"Duplicate content";
    let first = storage
        .store_bytes(data, &request(MediaKind::Animation, "clip.mp4"))
        .await?;
    let second = storage
        .store_bytes(data, &request(MediaKind::Animation, "clip.mp4"))
        .await?;

    assert_eq!(first.url, second.url);
    assert_ne!(first.id, second.id);

    let dir = temp_dir.path().join("marketing/Acme/animations");
    let files: Vec<_> = std::fs::read_dir(dir)?.collect();
    assert_eq!(files.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_kinds_are_separated() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = FileSystemStorage::new(temp_dir.path())?;

    let image = storage
        .store_bytes(b"same", &request(MediaKind::Image, "a.png"))
        .await?;
    let animation = storage
        .store_bytes(b"same", &request(MediaKind::Animation, "a.mp4"))
        .await?;

    assert_ne!(image.url, animation.url);
    Ok(())
}

#[tokio::test]
async fn test_tampered_file_fails_hash_check() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = FileSystemStorage::new(temp_dir.path())?;

    let stored = storage
        .store_bytes(b"original", &request(MediaKind::Image, "a.png"))
        .await?;
    let path = stored.url.trim_start_matches("file://");
    std::fs::write(path, b"tampered")?;

    assert!(storage.retrieve(&stored).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_foreign_reference_is_rejected() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = FileSystemStorage::new(temp_dir.path())?;

    let foreign = StoredAsset {
        id: "x".to_string(),
        url: "https://drive.example/file/123".to_string(),
        name: "a.png".to_string(),
        kind: MediaKind::Image,
    };

    assert!(storage.retrieve(&foreign).await.is_err());
    assert!(storage.exists(&foreign).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_unusable_session_key_is_rejected() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = FileSystemStorage::new(temp_dir.path())?;

    let mut bad = request(MediaKind::Image, "a.png");
    bad.session_key = "..".to_string();

    assert!(storage.store_bytes(b"data", &bad).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_unreachable_url_is_storage_error() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = FileSystemStorage::new(temp_dir.path())?;

    let mut unreachable = request(MediaKind::Image, "a.png");
    unreachable.asset_url = "http://127.0.0.1:9/asset.png".to_string();

    let err = storage.store(&unreachable).await.unwrap_err();
    assert!(err.to_string().contains("Storage Error"));
    assert_eq!(storage.backend_name(), "filesystem");
    Ok(())
}
