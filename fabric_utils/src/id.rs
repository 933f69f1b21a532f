use uuid::Uuid;

const SHORT_ID_LEN: usize = 8;

/// Returns a short random hexadecimal id, usable as an identifier suffix.
pub fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(SHORT_ID_LEN);
    id
}

/// Appends a fresh short id to `name`, e.g. `color` -> `color_1a2b3c4d`.
pub fn suffixed(name: &str) -> String {
    format!("{name}_{}", short_id())
}
