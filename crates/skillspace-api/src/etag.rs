//! ETags for enrollment resources.
//!
//! Every save bumps an enrollment's version, so the pair
//! `(enrollment_id, version)` identifies one state of the record.

use axum::http::{HeaderMap, header};
use sha2::{Digest, Sha256};
use skillspace_core::enrollment::Enrollment;

/// Compute the quoted strong ETag for an enrollment.
pub fn compute_etag(enrollment: &Enrollment) -> String {
  let mut hasher = Sha256::new();
  hasher.update(enrollment.enrollment_id.as_bytes());
  hasher.update(enrollment.version.to_le_bytes());
  format!("\"{}\"", hex::encode(hasher.finalize()))
}

/// Whether the request's `If-None-Match` already names `etag`.
pub fn matches_if_none_match(headers: &HeaderMap, etag: &str) -> bool {
  headers
    .get_all(header::IF_NONE_MATCH)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(','))
    .map(|tag| tag.trim().trim_start_matches("W/"))
    .any(|tag| tag == "*" || tag == etag)
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;
  use uuid::Uuid;

  use super::*;

  #[test]
  fn version_bump_changes_etag() {
    let mut e = Enrollment::new(Uuid::new_v4(), Uuid::new_v4());
    let before = compute_etag(&e);
    assert_eq!(before, compute_etag(&e.clone()));

    e.version += 1;
    assert_ne!(before, compute_etag(&e));
  }

  #[test]
  fn different_enrollments_differ() {
    let a = Enrollment::new(Uuid::new_v4(), Uuid::new_v4());
    let b = Enrollment::new(a.student_id, a.course_id);
    assert_ne!(compute_etag(&a), compute_etag(&b));
  }

  #[test]
  fn if_none_match_lists_and_wildcards() {
    let etag = "\"abc\"";
    let mut headers = HeaderMap::new();
    assert!(!matches_if_none_match(&headers, etag));

    headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("\"zzz\", W/\"abc\""));
    assert!(matches_if_none_match(&headers, etag));

    headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("*"));
    assert!(matches_if_none_match(&headers, etag));

    headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("\"zzz\""));
    assert!(!matches_if_none_match(&headers, etag));
  }
}
