use super::Role;

/// Where a page request may go, given the path and who (if anyone) is logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAccess {
    Allow,
    RedirectToLogin,
}

const SENSEI_PREFIX: &str = "/sensei";
const STUDENT_PREFIX: &str = "/student";

pub fn page_access(path: &str, role: Option<Role>) -> PageAccess {
    let allowed = if path.starts_with(SENSEI_PREFIX) {
        role == Some(Role::Sensei)
    } else if path.starts_with(STUDENT_PREFIX) {
        role.is_some()
    } else {
        true
    };

    if allowed {
        PageAccess::Allow
    } else {
        PageAccess::RedirectToLogin
    }
}
