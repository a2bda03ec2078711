//! Submission identity derived from a magnet link.

use uuid::Uuid;

use super::AcquireError;

/// Identity minted for one submission: the target filename plus a token
/// correlating the record with its producing job.
#[derive(Debug, Clone)]
pub struct MagnetIdentity {
    /// Human-readable filename from the magnet's display-name field
    pub filename: String,
    /// Fresh 128-bit random token, unique per submission
    pub token: Uuid,
}

/// Derives the identity for a magnet-link submission.
///
/// The link must be a parseable magnet URI carrying a `dn=` parameter
/// terminated by `&`. The token is minted from process randomness and is
/// independent of every property of the link, so collision probability is
/// negligible by construction.
///
/// # Errors
/// - `AcquireError::MalformedMagnet` - Not a magnet URI, or no usable
///   display name
pub fn derive(magnet_link: &str) -> Result<MagnetIdentity, AcquireError> {
    magnet_url::Magnet::new(magnet_link).map_err(|e| AcquireError::MalformedMagnet {
        reason: format!("invalid magnet URI: {e}"),
    })?;

    let filename = extract_display_name(magnet_link)?;

    Ok(MagnetIdentity {
        filename,
        token: Uuid::new_v4(),
    })
}

/// Extracts the URI-decoded display name from the `dn=` parameter.
///
/// The parameter must be terminated by `&`; a trailing bare `dn=` segment
/// is rejected rather than yielding an empty or undefined filename.
fn extract_display_name(magnet_link: &str) -> Result<String, AcquireError> {
    let (_, after_marker) =
        magnet_link
            .split_once("dn=")
            .ok_or_else(|| AcquireError::MalformedMagnet {
                reason: "missing dn= display name".to_string(),
            })?;

    let (raw_name, _) =
        after_marker
            .split_once('&')
            .ok_or_else(|| AcquireError::MalformedMagnet {
                reason: "dn= display name not terminated by '&'".to_string(),
            })?;

    if raw_name.is_empty() {
        return Err(AcquireError::MalformedMagnet {
            reason: "empty dn= display name".to_string(),
        });
    }

    let decoded = urlencoding::decode(raw_name).map_err(|e| AcquireError::MalformedMagnet {
        reason: format!("display name is not valid percent-encoding: {e}"),
    })?;

    Ok(decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "xt=urn:btih:c12fe1c06bba254a9dc9f519b335aa7c1367a88a";

    #[test]
    fn test_display_name_extracted_and_decoded() {
        let magnet = format!("magnet:?{HASH}&dn=Big%20Buck%20Bunny.mp4&tr=udp://t.example:80");

        let identity = derive(&magnet).unwrap();
        assert_eq!(identity.filename, "Big Buck Bunny.mp4");
    }

    #[test]
    fn test_missing_display_name_rejected() {
        let magnet = format!("magnet:?{HASH}&tr=udp://t.example:80");

        let result = derive(&magnet);
        assert!(matches!(result, Err(AcquireError::MalformedMagnet { .. })));
    }

    #[test]
    fn test_unterminated_display_name_rejected() {
        let magnet = format!("magnet:?{HASH}&dn=trailing.mp4");

        let result = derive(&magnet);
        assert!(matches!(result, Err(AcquireError::MalformedMagnet { .. })));
    }

    #[test]
    fn test_non_magnet_uri_rejected() {
        let result = derive("https://example.com/?dn=nope.mp4&");
        assert!(matches!(result, Err(AcquireError::MalformedMagnet { .. })));
    }

    #[test]
    fn test_tokens_unique_across_calls() {
        let magnet = format!("magnet:?{HASH}&dn=clip.mp4&tr=udp://t.example:80");

        let first = derive(&magnet).unwrap();
        let second = derive(&magnet).unwrap();
        assert_ne!(first.token, second.token);
    }
}
