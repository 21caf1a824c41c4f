use uuid::Uuid;

/// GUID used for samples that were not collected through a snapshot
pub(crate) const NULL_GUID: &str = "00000000-0000-0000-0000-000000000000";

/// Create a UUID and return as a string
pub(crate) fn generate_uuid() -> String {
    Uuid::new_v4().hyphenated().to_string()
}
