//! Input-size limits enforced at the engine boundary.

pub const MAX_NAME_LEN: usize = 256;
pub const MAX_TAGS: usize = 32;
pub const MAX_TAG_LEN: usize = 64;
pub const MAX_DESCRIPTION_LEN: usize = 4096;
pub const MAX_CONTACT_LEN: usize = 320;
