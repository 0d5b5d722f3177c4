use serde::{Deserialize, Serialize};

/// Sync scheduler state machine
///
/// Pure type state machine: only state definitions and transition rules.
/// Timers and the actual upload live in the application layer (sv-app).
///
/// State transitions:
///
/// ```text
/// Disabled ──arm──→ Armed ──tick──→ Running{armed} ──finish──→ Armed
///    ↑                │                   │
///    └────disarm──────┘                   └─disarm→ Running{!armed} ──finish──→ Disabled
/// ```
///
/// `Running` remembers whether a timer is installed so that disarming
/// mid-attempt never clears the in-flight guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SyncState {
    /// No timer installed
    #[default]
    Disabled,

    /// Timer installed, waiting for the next tick
    Armed,

    /// A sync attempt is in flight
    Running { armed: bool },
}

impl SyncState {
    pub fn is_armed(self) -> bool {
        matches!(self, Self::Armed | Self::Running { armed: true })
    }

    pub fn is_running(self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// Install a timer.
    pub fn arm(self) -> Self {
        match self {
            Self::Running { .. } => Self::Running { armed: true },
            _ => Self::Armed,
        }
    }

    /// Remove the timer.
    pub fn disarm(self) -> Self {
        match self {
            Self::Running { .. } => Self::Running { armed: false },
            _ => Self::Disabled,
        }
    }

    /// Begin a sync attempt. Returns `None` when an attempt is already running.
    pub fn start_tick(self) -> Option<Self> {
        match self {
            Self::Running { .. } => None,
            Self::Armed => Some(Self::Running { armed: true }),
            Self::Disabled => Some(Self::Running { armed: false }),
        }
    }

    /// Transition after an attempt completes.
    pub fn finish(self) -> Self {
        match self {
            Self::Running { armed: true } => Self::Armed,
            Self::Running { armed: false } => Self::Disabled,
            other => other,
        }
    }
}
