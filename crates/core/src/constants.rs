//! Constants used throughout the ICU core crate.

/// Default directory for the store snapshot when `ICU_DATA_DIR` is unset.
pub const DEFAULT_DATA_DIR: &str = "icu_data";

/// Value of `ICU_DATA_DIR` that selects a memory-only store.
pub const MEMORY_STORE_MARKER: &str = ":memory:";

/// Filename of the JSON snapshot inside the data directory.
pub const SNAPSHOT_FILENAME: &str = "store.json";

/// Maximum length of person and equipment names.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of contact phone numbers.
pub const MAX_CONTACT_LEN: usize = 15;

/// Maximum length of room and bed numbers.
pub const MAX_ROOM_LEN: usize = 10;

/// Maximum length of insurance identifiers.
pub const MAX_INSURANCE_ID_LEN: usize = 100;

/// Maximum length of usernames.
pub const MAX_USERNAME_LEN: usize = 150;

/// Maximum length of staff employee ids.
pub const MAX_EMPLOYEE_ID_LEN: usize = 50;

/// Maximum length of doctor and nurse licence numbers.
pub const MAX_LICENSE_LEN: usize = 100;

/// Maximum length of short coded text such as dosage, frequency and departments.
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Temperatures must satisfy `|t| < MAX_TEMPERATURE`.
pub const MAX_TEMPERATURE: f64 = 1000.0;
