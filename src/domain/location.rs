use crate::error::FetchError;
use std::fmt;
use url::Url;

/// A bucket + key pair addressing one object in storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parse an endpoint-style URL (`https://<endpoint>/<bucket>/<key...>`).
    ///
    /// `s3://<bucket>/<key...>` is accepted as well, with the bucket taken from the host.
    pub fn from_url(raw: &str) -> Result<Self, FetchError> {
        let invalid = |reason: &str| FetchError::InvalidSource {
            url: raw.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
        let mut segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.collect())
            .unwrap_or_default();

        let bucket = if url.scheme() == "s3" {
            url.host_str().unwrap_or_default().to_string()
        } else {
            if segments.is_empty() {
                return Err(invalid("missing bucket"));
            }
            segments.remove(0).to_string()
        };

        if bucket.is_empty() {
            return Err(invalid("missing bucket"));
        }

        let key = segments.join("/");
        if key.is_empty() {
            return Err(invalid("missing object key"));
        }

        Ok(Self { bucket, key })
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_is_first_path_segment() {
        let location =
            ObjectLocation::from_url("https://s3.amazonaws.com/in-bucket/videos/abc123.mp4")
                .unwrap();
        assert_eq!(location.bucket, "in-bucket");
        assert_eq!(location.key, "videos/abc123.mp4");
    }

    #[test]
    fn test_s3_scheme_uses_host_as_bucket() {
        let location = ObjectLocation::from_url("s3://in-bucket/abc123.mp4").unwrap();
        assert_eq!(location, ObjectLocation::new("in-bucket", "abc123.mp4"));
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let result = ObjectLocation::from_url("https://s3.amazonaws.com/in-bucket/");
        assert!(matches!(result, Err(FetchError::InvalidSource { .. })));
    }

    #[test]
    fn test_not_a_url_is_rejected() {
        let result = ObjectLocation::from_url("in-bucket/abc123.mp4");
        assert!(matches!(result, Err(FetchError::InvalidSource { .. })));
    }

    #[test]
    fn test_display() {
        let location = ObjectLocation::new("out-bucket", "processed/a.mp4/master.m3u8");
        assert_eq!(location.to_string(), "out-bucket/processed/a.mp4/master.m3u8");
    }
}
