//! Object-store adapter. Book files live in the bucket under
//! `<volume_id><extension>`, so lookups list the bucket and match on the
//! key stem.

use aws_sdk_s3::primitives::ByteStream;

use crate::error::AppError;

pub async fn upload_bytes(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    data: Vec<u8>,
) -> Result<(), AppError> {
    client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(data))
        .send()
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    Ok(())
}

pub async fn download_bytes(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
) -> Result<Vec<u8>, AppError> {
    let object = client
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    let data = object
        .body
        .collect()
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    Ok(data.into_bytes().to_vec())
}

/// Find the stored object for a volume id. The upload extension is not
/// recorded in the catalog, so the bucket listing is matched on key stem.
/// Listings page at 1000 keys, so every page is walked until a match.
pub async fn find_object(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    volume_id: &str,
) -> Result<Option<String>, AppError> {
    let mut pages = client
        .list_objects_v2()
        .bucket(bucket)
        .into_paginator()
        .send();

    while let Some(page) = pages.next().await {
        let page = page.map_err(|e| AppError::Storage(e.to_string()))?;

        let keys = page.contents().iter().filter_map(|object| object.key());
        if let Some(key) = match_key(keys, volume_id) {
            return Ok(Some(key.to_string()));
        }
    }

    Ok(None)
}

/// First key whose stem matches the volume id.
fn match_key<'a>(keys: impl Iterator<Item = &'a str>, volume_id: &str) -> Option<&'a str> {
    keys.into_iter().find(|key| key_stem(key) == volume_id)
}

/// Storage key for an uploaded book file, e.g. `vol-42.epub`.
pub fn object_key(volume_id: &str, filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) => format!("{volume_id}.{ext}"),
        None => volume_id.to_string(),
    }
}

fn key_stem(key: &str) -> &str {
    key.split('.').next().unwrap_or(key)
}

/// Download filename presented to the user: `Title - Authors.ext`.
pub fn download_filename(title: &str, authors: &str, key: &str) -> Option<String> {
    let (_, ext) = key.rsplit_once('.')?;
    Some(format!("{title} - {authors}.{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_keeps_extension() {
        assert_eq!(object_key("vol-42", "mybook.epub"), "vol-42.epub");
        assert_eq!(object_key("vol-42", "weird.name.pdf"), "vol-42.pdf");
    }

    #[test]
    fn object_key_without_extension() {
        assert_eq!(object_key("vol-42", "rawfile"), "vol-42");
    }

    #[test]
    fn key_stem_strips_extension() {
        assert_eq!(key_stem("vol-42.epub"), "vol-42");
        assert_eq!(key_stem("vol-42"), "vol-42");
    }

    #[test]
    fn match_key_finds_stem_past_first_batch() {
        let first: Vec<&str> = vec!["vol-1.epub", "vol-2.pdf"];
        let second: Vec<&str> = vec!["vol-3.mobi", "vol-42.epub"];

        // Listings arrive a page at a time; the match may sit on any of them.
        assert_eq!(match_key(first.iter().copied(), "vol-42"), None);
        assert_eq!(
            match_key(second.iter().copied(), "vol-42"),
            Some("vol-42.epub")
        );
    }

    #[test]
    fn match_key_misses_cleanly() {
        let keys: Vec<&str> = vec!["vol-1.epub", "vol-2.pdf"];
        assert_eq!(match_key(keys.iter().copied(), "vol-99"), None);
    }

    #[test]
    fn download_filename_builds_disposition_name() {
        assert_eq!(
            download_filename("Dune", "Frank Herbert", "vol-42.epub").as_deref(),
            Some("Dune - Frank Herbert.epub")
        );
    }

    #[test]
    fn download_filename_requires_extension() {
        assert!(download_filename("Dune", "Frank Herbert", "vol-42").is_none());
    }
}
