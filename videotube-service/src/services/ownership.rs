//! Mutation guard: only the owner of a resource may modify or delete it.

use uuid::Uuid;

use crate::error::{ApiError, Result};

pub fn assert_owner(owner_id: Uuid, principal_id: Uuid, resource: &str) -> Result<()> {
    if owner_id != principal_id {
        return Err(ApiError::Forbidden(format!(
            "You do not own this {resource}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_passes() {
        let id = Uuid::new_v4();
        assert!(assert_owner(id, id, "video").is_ok());
    }

    #[test]
    fn non_owner_is_forbidden() {
        let err = assert_owner(Uuid::new_v4(), Uuid::new_v4(), "playlist").unwrap_err();
        match err {
            ApiError::Forbidden(msg) => assert!(msg.contains("playlist")),
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }
}
