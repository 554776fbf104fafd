use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque key of a supervised process; travels to the platform as a UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessHandle(Uuid);

impl ProcessHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProcessHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ProcessHandle {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// What `start` hands back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartedProcess {
    pub handle: ProcessHandle,
    pub pid: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_plain_uuid_string() {
        let h = ProcessHandle::new();
        let v = serde_json::to_value(h).unwrap();
        assert_eq!(v, serde_json::Value::String(h.to_string()));
        let back: ProcessHandle = serde_json::from_value(v).unwrap();
        assert_eq!(back, h);
        assert_eq!(h.to_string().parse::<ProcessHandle>().unwrap(), h);
    }

    #[test]
    fn rejects_garbage() {
        assert!("not-a-uuid".parse::<ProcessHandle>().is_err());
    }
}
