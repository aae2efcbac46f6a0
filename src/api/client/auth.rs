//! Bearer token injection for outbound requests.

use crate::api::types::RequestDescriptor;
use crate::session::SessionStore;

/// Attach the persisted access token to `descriptor`.
///
/// The store is read at call time, so a replay after a refresh picks up the
/// new token. Requests that already carry an `Authorization` header (refresh
/// and revocation calls) and requests made without a session pass through
/// unchanged.
pub(super) fn attach(mut descriptor: RequestDescriptor, store: &dyn SessionStore) -> RequestDescriptor {
    if descriptor.header("Authorization").is_some() {
        return descriptor;
    }
    let token = store
        .get()
        .and_then(|session| session.access_token().map(str::to_string));
    if let Some(token) = token {
        descriptor.set_header("Authorization", format!("Bearer {token}"));
    }
    descriptor
}
