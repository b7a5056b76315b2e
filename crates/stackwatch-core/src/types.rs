//! Canonical datetime type for stackwatch

use chrono::{DateTime, Utc};

/// UTC datetime used for TIMESTAMPTZ columns and API responses.
///
/// Serializes as ISO 8601 with a `Z` suffix (`2025-06-01T12:15:47.609192Z`).
pub type UtcDateTime = DateTime<Utc>;
