use anyhow::Error;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ViewOwnProfile,
    ViewOwnAttendance,
    CheckInSelf,
    ViewSchedule,

    ViewAllStudents,
    ManageStudents,
    PromoteStudents,
    CheckInOthers,
    ViewAllAttendance,
    ManageBelts,
    ManageClasses,
    ManageEvents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Sensei,
}

static STUDENT_PERMISSIONS: Lazy<HashSet<Permission>> = Lazy::new(|| {
    let mut permissions = HashSet::new();

    permissions.insert(Permission::ViewOwnProfile);
    permissions.insert(Permission::ViewOwnAttendance);
    permissions.insert(Permission::CheckInSelf);
    permissions.insert(Permission::ViewSchedule);

    permissions
});

static SENSEI_PERMISSIONS: Lazy<HashSet<Permission>> = Lazy::new(|| {
    let mut permissions = HashSet::new();

    permissions.extend(STUDENT_PERMISSIONS.iter().copied());

    permissions.insert(Permission::ViewAllStudents);
    permissions.insert(Permission::ManageStudents);
    permissions.insert(Permission::PromoteStudents);
    permissions.insert(Permission::CheckInOthers);
    permissions.insert(Permission::ViewAllAttendance);
    permissions.insert(Permission::ManageBelts);
    permissions.insert(Permission::ManageClasses);
    permissions.insert(Permission::ManageEvents);

    permissions
});

impl Role {
    pub fn permissions(&self) -> &'static HashSet<Permission> {
        match self {
            Role::Student => &STUDENT_PERMISSIONS,
            Role::Sensei => &SENSEI_PERMISSIONS,
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Sensei => "sensei",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "student" => Ok(Role::Student),
            "sensei" | "instructor" => Ok(Role::Sensei),
            _ => Err(Error::msg(format!("Unknown role: {}", s))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
