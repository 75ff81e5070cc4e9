// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Challenge name handling.

/// Split a challenge's resolved zone and FQDN into `(subdomain, domain)`.
///
/// Both inputs are expected to end with a trailing dot:
///
/// ```rust
/// use loopia_webhook::names::split_challenge_name;
///
/// let (subdomain, domain) =
///     split_challenge_name("example.com.", "_acme-challenge.example.com.");
/// assert_eq!(subdomain, "_acme-challenge");
/// assert_eq!(domain, "example.com");
/// ```
///
/// If the FQDN does not end with the zone, the zone is not stripped and the
/// subdomain is the whole FQDN without its trailing dot. cert-manager always
/// supplies consistent values, so no validation is done here.
#[must_use]
pub fn split_challenge_name(resolved_zone: &str, resolved_fqdn: &str) -> (String, String) {
    let subdomain = resolved_fqdn
        .strip_suffix(resolved_zone)
        .unwrap_or(resolved_fqdn);
    let subdomain = subdomain.strip_suffix('.').unwrap_or(subdomain);
    let domain = resolved_zone.strip_suffix('.').unwrap_or(resolved_zone);

    (subdomain.to_string(), domain.to_string())
}
