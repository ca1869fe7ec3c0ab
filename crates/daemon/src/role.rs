// SPDX-License-Identifier: MIT

//! Process roles (§2): `queue-only` accepts enqueue/admin calls and runs no
//! workers, `worker` runs a [`WorkerPool`] against an existing store and
//! registers the `"scan"` handler, `all` (default) does both in one process.

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum Role {
    QueueOnly,
    Worker,
    All,
}

impl Role {
    pub fn runs_workers(self) -> bool {
        matches!(self, Role::Worker | Role::All)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::All
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queue-only" => Ok(Role::QueueOnly),
            "worker" => Ok(Role::Worker),
            "all" => Ok(Role::All),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_only_does_not_run_workers() {
        assert!(!Role::QueueOnly.runs_workers());
    }

    #[test]
    fn worker_and_all_run_workers() {
        assert!(Role::Worker.runs_workers());
        assert!(Role::All.runs_workers());
    }

    #[test]
    fn default_role_is_all() {
        assert_eq!(Role::default(), Role::All);
    }

    #[test]
    fn parses_kebab_case_names() {
        assert_eq!("queue-only".parse::<Role>(), Ok(Role::QueueOnly));
        assert_eq!("worker".parse::<Role>(), Ok(Role::Worker));
        assert!("bogus".parse::<Role>().is_err());
    }
}
