use serde::{Deserialize, Serialize};

/// Kind of account an identity was registered as.
///
/// Serialised as `"Mentor"` / `"Mentee"`, which is also the `accountType` the API
/// exposes and the value embedded in session tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Mentor,
    Mentee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Mentor => "Mentor",
            Role::Mentee => "Mentee",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Mentor" => Ok(Role::Mentor),
            "Mentee" => Ok(Role::Mentee),
            other => Err(format!("unknown account type '{other}'")),
        }
    }
}
