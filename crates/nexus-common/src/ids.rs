//! Identifiers for objects minted locally (in-memory servers, tests).
//!
//! Remote servers hand out their own IDs; these only need to be unique and to
//! sort by creation time, which UUIDv7 gives for free.

use uuid::Uuid;

pub fn generate_id() -> Uuid {
    Uuid::now_v7()
}
