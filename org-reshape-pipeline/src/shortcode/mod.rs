//! Space shortcode allocation.
//!
//! Two allocators exist:
//!
//! - [`allocate_shortcode`] is used by the migration. It checks candidates
//!   against the in-memory set of shortcodes consumed by the running job and
//!   appends a bare numeric suffix (`acme2`).
//! - [`allocate_live_shortcode`] is used when a space is created interactively.
//!   It asks the store for shortcodes sharing the prefix and appends a dashed
//!   suffix (`sales-team-1`).
//!
//! Both give up after [`MAX_SHORTCODE_ATTEMPTS`] candidates and return the last
//! one tried even if it is still taken; callers must check for that.
use std::collections::HashSet;

use org_reshape_repository::{MigrationRepository, RepositoryError};
use org_reshape_shared::types::OrganizationId;
use tracing::debug;

/// Upper bound of suffixed candidates tried before giving up.
pub const MAX_SHORTCODE_ATTEMPTS: usize = 30;

/// Used when a base normalizes to nothing (e.g. `"!!!"`).
pub const EMPTY_SHORTCODE_FALLBACK: &str = "space";

/// Lowercases `base` and keeps only ASCII alphanumerics and `-`.
pub fn normalize_shortcode(base: &str) -> String {
    let normalized: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if normalized.is_empty() {
        EMPTY_SHORTCODE_FALLBACK.to_string()
    } else {
        normalized
    }
}

/// Returns a shortcode derived from `base` that is not in `consumed`.
///
/// The caller owns `consumed` and must insert the returned value before the
/// next allocation. When every candidate is taken the last candidate is
/// returned unchanged, so `consumed.contains(&result)` signals exhaustion.
pub fn allocate_shortcode(base: &str, consumed: &HashSet<String>) -> String {
    let normalized = normalize_shortcode(base);
    if !consumed.contains(&normalized) {
        return normalized;
    }

    let mut suffix = consumed
        .iter()
        .filter(|existing| existing.starts_with(&normalized))
        .count();
    let mut candidate = format!("{}{}", normalized, suffix);
    let mut attempts = 1;

    while consumed.contains(&candidate) && attempts < MAX_SHORTCODE_ATTEMPTS {
        suffix += 1;
        candidate = format!("{}{}", normalized, suffix);
        attempts += 1;
    }

    debug!(base, shortcode = %candidate, attempts, "Allocated suffixed shortcode");
    candidate
}

/// Case-folds `base`, turns whitespace and hyphen runs into a single `-`, drops
/// every other non-alphanumeric character, and trims dashes from both ends.
pub fn normalize_live_shortcode(base: &str) -> String {
    let mut normalized = String::with_capacity(base.len());
    let mut pending_dash = false;

    for c in base.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !normalized.is_empty() {
                normalized.push('-');
            }
            pending_dash = false;
            normalized.push(c);
        } else if c == '-' || c.is_whitespace() {
            pending_dash = true;
        }
    }

    if normalized.is_empty() {
        EMPTY_SHORTCODE_FALLBACK.to_string()
    } else {
        normalized
    }
}

/// Returns a shortcode for a space created outside the migration.
///
/// Collisions are looked up with a prefix query against the store, so this is
/// only as strong as the store's unique constraint under concurrent creation.
pub async fn allocate_live_shortcode(
    repository: &dyn MigrationRepository,
    organization_id: OrganizationId,
    base: &str,
) -> Result<String, RepositoryError> {
    let normalized = normalize_live_shortcode(base);
    let taken: HashSet<String> = repository
        .shortcodes_with_prefix(organization_id, &normalized)
        .await?
        .into_iter()
        .collect();

    if !taken.contains(&normalized) {
        return Ok(normalized);
    }

    let mut suffix = taken.len();
    let mut candidate = format!("{}-{}", normalized, suffix);
    let mut attempts = 1;

    while taken.contains(&candidate) && attempts < MAX_SHORTCODE_ATTEMPTS {
        suffix += 1;
        candidate = format!("{}-{}", normalized, suffix);
        attempts += 1;
    }

    Ok(candidate)
}
