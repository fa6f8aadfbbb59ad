use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::usage::UsagePayload;

/// Dashboard views in navigation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewId {
    /// Claude Pro plan quota windows
    #[default]
    Claude,
    /// Cursor premium requests and spend
    Cursor,
}

impl ViewId {
    /// Every view, in the order the arrow keys cycle through them
    pub const ALL: [ViewId; 2] = [ViewId::Claude, ViewId::Cursor];

    /// Position of this view in [`ViewId::ALL`]
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    /// The view to the right, wrapping around
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// The view to the left, wrapping around
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Name used for the box title and the navigation hint
    pub fn display_name(&self) -> &'static str {
        match self {
            ViewId::Claude => "Claude Pro",
            ViewId::Cursor => "Cursor",
        }
    }

    /// Identifier accepted on the command line
    pub fn key(&self) -> &'static str {
        match self {
            ViewId::Claude => "claude",
            ViewId::Cursor => "cursor",
        }
    }

    /// Whether auth-shaped errors on this view trigger credential renewal
    pub fn renews_credentials(self) -> bool {
        matches!(self, ViewId::Claude)
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ViewId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|v| v.key() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|v| v.key()).collect();
                format!("unknown view '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// Cached state of a single view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabState {
    /// Last successfully fetched payload
    pub payload: Option<UsagePayload>,
    /// Local time of the last fetch attempt (HH:MM)
    pub last_update: String,
    /// Error from the last fetch attempt
    pub last_error: Option<String>,
}

impl TabState {
    /// True before the first fetch attempt has completed
    pub fn is_loading(&self) -> bool {
        self.payload.is_none() && self.last_error.is_none()
    }
}

/// Per-view cache of the most recent fetch result.
///
/// A payload and an error are never held at the same time: storing one
/// always clears the other.
#[derive(Debug, Clone, Default)]
pub struct TabStore {
    tabs: HashMap<ViewId, TabState>,
}

impl TabStore {
    /// Create a store with an empty entry for every view
    pub fn new() -> Self {
        Self {
            tabs: ViewId::ALL
                .into_iter()
                .map(|v| (v, TabState::default()))
                .collect(),
        }
    }

    /// Record the outcome of a fetch for `view`
    pub fn set(
        &mut self,
        view: ViewId,
        outcome: Result<UsagePayload, String>,
        timestamp: impl Into<String>,
    ) {
        let tab = self.tabs.entry(view).or_default();
        tab.last_update = timestamp.into();
        match outcome {
            Ok(payload) => {
                tab.payload = Some(payload);
                tab.last_error = None;
            }
            Err(error) => {
                tab.payload = None;
                tab.last_error = Some(error);
            }
        }
    }

    /// Current state of `view`
    pub fn get(&self, view: ViewId) -> &TabState {
        static EMPTY: TabState = TabState {
            payload: None,
            last_update: String::new(),
            last_error: None,
        };
        self.tabs.get(&view).unwrap_or(&EMPTY)
    }
}

/// Everything a render pass needs: the active view and every view's cache
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    /// Currently displayed view
    pub active: ViewId,
    /// Cached fetch results per view
    pub tabs: TabStore,
}

impl DashboardState {
    /// Create a state showing `active` with nothing loaded yet
    pub fn new(active: ViewId) -> Self {
        Self {
            active,
            tabs: TabStore::new(),
        }
    }

    /// Cached state of the active view
    pub fn active_tab(&self) -> &TabState {
        self.tabs.get(self.active)
    }

    /// Move to the view on the left
    pub fn navigate_left(&mut self) {
        self.active = self.active.prev();
    }

    /// Move to the view on the right
    pub fn navigate_right(&mut self) {
        self.active = self.active.next();
    }
}
