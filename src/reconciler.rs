// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Challenge record reconciliation.
//!
//! The remote zone is the only source of truth: every call lists the records
//! at the challenge name and converges towards the goal state from there.
//! No bookkeeping is kept between calls, so both operations are safe to
//! repeat with identical arguments (cert-manager retries and self-checks rely
//! on this).
//!
//! # Reconciliation Flow
//!
//! 1. **List** - Fetch all records at `(domain, subdomain)`
//! 2. **Compare** - Look for TXT records whose value equals the challenge key
//! 3. **Mutate** - Create the record, or delete every match
//! 4. **Clean up** - Remove the subdomain when it held at most one record
//!
//! Concurrent calls for the same `(domain, subdomain, key)` are not
//! serialized; consistency is whatever the provider guarantees.

use tracing::{debug, info, warn};

use crate::errors::SolverError;
use crate::metrics::{record_subdomain_removed, record_txt_created, record_txt_deleted};
use crate::zone_store::{ZoneRecord, ZoneRecordStore};

/// Ensure a TXT record with value `key` exists at `subdomain` in `domain`.
///
/// If a matching TXT record is already present this is a no-op. Other TXT
/// records at the same name are left alone.
///
/// # Errors
///
/// Returns [`SolverError::RecordList`] if the records cannot be listed and
/// [`SolverError::RecordCreate`] if the record cannot be created.
pub async fn ensure_present(
    store: &dyn ZoneRecordStore,
    domain: &str,
    subdomain: &str,
    key: &str,
) -> Result<(), SolverError> {
    let records = list_records(store, domain, subdomain).await?;

    if records.iter().any(|record| record.is_txt_with_value(key)) {
        debug!(
            domain = %domain,
            subdomain = %subdomain,
            "Challenge TXT record already present, nothing to do"
        );
        return Ok(());
    }

    let record = ZoneRecord::txt(key);

    store
        .create_record(domain, subdomain, &record)
        .await
        .map_err(|source| SolverError::RecordCreate {
            domain: domain.to_string(),
            subdomain: subdomain.to_string(),
            source,
        })?;

    record_txt_created();
    info!(
        domain = %domain,
        subdomain = %subdomain,
        ttl = record.ttl,
        "Created challenge TXT record"
    );

    Ok(())
}

/// Ensure no TXT record with value `key` exists at `subdomain` in `domain`.
///
/// Every matching TXT record is deleted by id. Deletion is not
/// transactional: records removed before a failure stay removed.
///
/// When the listing taken *before* the deletions held at most one record the
/// subdomain is removed as well. The count is not re-checked after deleting,
/// which saves a round trip at the cost of racing with a concurrent writer.
///
/// # Errors
///
/// Returns [`SolverError::RecordList`] or [`SolverError::RecordDelete`] on
/// failure, and [`SolverError::SubdomainRemove`] if the final subdomain
/// removal fails. The latter is not fatal: the TXT record is already gone.
pub async fn ensure_absent(
    store: &dyn ZoneRecordStore,
    domain: &str,
    subdomain: &str,
    key: &str,
) -> Result<(), SolverError> {
    let records = list_records(store, domain, subdomain).await?;

    for record in records.iter().filter(|record| record.is_txt_with_value(key)) {
        let Some(record_id) = record.id else {
            warn!(
                domain = %domain,
                subdomain = %subdomain,
                "Matching TXT record has no id and cannot be deleted"
            );
            continue;
        };

        store
            .delete_record(domain, subdomain, record_id)
            .await
            .map_err(|source| SolverError::RecordDelete {
                domain: domain.to_string(),
                subdomain: subdomain.to_string(),
                record_id,
                source,
            })?;

        record_txt_deleted();
        info!(
            domain = %domain,
            subdomain = %subdomain,
            record_id = record_id,
            "Deleted challenge TXT record"
        );
    }

    if records.len() <= 1 {
        store
            .delete_subdomain(domain, subdomain)
            .await
            .map_err(|source| SolverError::SubdomainRemove {
                domain: domain.to_string(),
                subdomain: subdomain.to_string(),
                source,
            })?;

        record_subdomain_removed();
        info!(domain = %domain, subdomain = %subdomain, "Removed challenge subdomain");
    }

    Ok(())
}

async fn list_records(
    store: &dyn ZoneRecordStore,
    domain: &str,
    subdomain: &str,
) -> Result<Vec<ZoneRecord>, SolverError> {
    let records = store
        .list_records(domain, subdomain)
        .await
        .map_err(|source| SolverError::RecordList {
            domain: domain.to_string(),
            subdomain: subdomain.to_string(),
            source,
        })?;

    debug!(
        domain = %domain,
        subdomain = %subdomain,
        record_count = records.len(),
        "Listed zone records"
    );

    Ok(records)
}
