//! PII masking applied to every CV snapshot before it leaves the service.

use crate::models::cv::{Cv, PersonalInfo};

pub const NAME_PLACEHOLDER: &str = "[CANDIDATE NAME]";
pub const EMAIL_PLACEHOLDER: &str = "[EMAIL]";
pub const LINK_PLACEHOLDER: &str = "[LINK]";

/// Returns an independent copy of `cv` with name, email and links replaced by
/// fixed placeholders. Link count is preserved; location passes through.
pub fn mask_pii(cv: &Cv) -> Cv {
    let mut masked = cv.clone();
    masked.personal_info = PersonalInfo {
        full_name: NAME_PLACEHOLDER.to_string(),
        location: cv.personal_info.location.clone(),
        email: EMAIL_PLACEHOLDER.to_string(),
        links: vec![LINK_PLACEHOLDER.to_string(); cv.personal_info.links.len()],
    };
    masked
}
