use crate::error::{FilestoreError, Result};
use object_store::path::{Path as ObjectStorePath, PathPart};
use std::path::{Component, Path};

/// Parse a remote URL like `s3://bucket/prefix` into (bucket, prefix).
pub(crate) fn parse_remote_url(url: &str, schemes: &[&str]) -> Result<(String, String)> {
    let trimmed = url.trim();

    for scheme in schemes {
        if let Some(rest) = trimmed.strip_prefix(scheme) {
            let (bucket, prefix) = match rest.split_once('/') {
                Some((b, p)) => (b.to_string(), p.to_string()),
                None => (rest.to_string(), String::new()),
            };
            return Ok((bucket, prefix));
        }
    }

    Err(FilestoreError::Config(format!(
        "Expected URL with schemes {:?}, got: {}",
        schemes, url
    )))
}

/// Convert a relative filesystem-style path into an object key.
///
/// Root and `.` components are dropped; `..` is rejected.
pub(crate) fn object_key(relative: &Path) -> Result<ObjectStorePath> {
    let mut parts: Vec<PathPart<'static>> = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => {
                let segment = segment.to_string_lossy().into_owned();
                parts.push(PathPart::from(segment));
            }
            Component::ParentDir => {
                return Err(FilestoreError::PathTraversal(relative.display().to_string()))
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    Ok(ObjectStorePath::from_iter(parts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote_url_s3() {
        let (bucket, prefix) = parse_remote_url("s3://my-bucket/some/prefix", &["s3://"]).unwrap();
        assert_eq!(bucket, "my-bucket");
        assert_eq!(prefix, "some/prefix");
    }

    #[test]
    fn test_parse_remote_url_no_prefix() {
        let (bucket, prefix) = parse_remote_url("gs://my-bucket", &["gs://", "gcs://"]).unwrap();
        assert_eq!(bucket, "my-bucket");
        assert_eq!(prefix, "");
    }

    #[test]
    fn test_parse_remote_url_invalid_scheme() {
        let result = parse_remote_url("http://bucket/key", &["s3://", "gs://"]);
        assert!(result.is_err(), "Should error on invalid scheme");
    }

    #[test]
    fn test_object_key() {
        let key = object_key(Path::new("/pipelines/p1/./.variables/load/df/data.parquet")).unwrap();
        assert_eq!(key.as_ref(), "pipelines/p1/.variables/load/df/data.parquet");
    }

    #[test]
    fn test_object_key_rejects_parent() {
        assert!(matches!(
            object_key(Path::new("a/../../etc/passwd")),
            Err(FilestoreError::PathTraversal(_))
        ));
    }
}
