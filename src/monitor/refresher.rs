//! Refresh orchestration: fetch every view once per tick and renew
//! expired Claude credentials.

use std::collections::HashMap;

use chrono::Local;
use tracing::{debug, info, warn};

use usagedash_core::sources::{
    is_auth_error, ClaudeCredentials, ClaudeRenewal, ClaudeUsage, CursorCredentials,
    CursorUsage, Feed, RenewalTrigger,
};
use usagedash_core::state::{DashboardState, ViewId};

use crate::config::Settings;
use crate::input::signals;

/// Shown in place of the error while credentials are being renewed
pub const RENEWING_MESSAGE: &str = "Sesión expirada — renovando credenciales…";

/// Clock used for the last-update stamp
fn local_time() -> String {
    Local::now().format("%H:%M").to_string()
}

/// Fetches views sequentially and records each outcome in the dashboard state
pub struct Refresher {
    feeds: HashMap<ViewId, Feed>,
    renewal: Option<Box<dyn RenewalTrigger>>,
    clock: fn() -> String,
}

impl Refresher {
    pub fn new(renewal: Option<Box<dyn RenewalTrigger>>) -> Self {
        Self {
            feeds: HashMap::new(),
            renewal,
            clock: local_time,
        }
    }

    /// Wire the Claude and Cursor adapters from settings
    pub fn from_settings(settings: &Settings) -> Self {
        let timeout = settings.fetch_timeout();
        let renewal: Option<Box<dyn RenewalTrigger>> = if settings.renew_enabled {
            Some(Box::new(
                ClaudeRenewal::new(settings.renew_wait()).with_cancel(signals::interrupted),
            ))
        } else {
            None
        };

        Self::new(renewal)
            .with_feed(
                ViewId::Claude,
                Feed::new(
                    Box::new(ClaudeCredentials::detect()),
                    Box::new(ClaudeUsage::new(timeout)),
                ),
            )
            .with_feed(
                ViewId::Cursor,
                Feed::new(
                    Box::new(CursorCredentials::detect()),
                    Box::new(CursorUsage::new(timeout)),
                ),
            )
    }

    pub fn with_feed(mut self, view: ViewId, feed: Feed) -> Self {
        self.feeds.insert(view, feed);
        self
    }

    pub fn with_clock(mut self, clock: fn() -> String) -> Self {
        self.clock = clock;
        self
    }

    /// Refresh every view in order.
    ///
    /// `paint` is called whenever the active view's cached state changes.
    pub fn tick(&mut self, state: &mut DashboardState, paint: &mut dyn FnMut(&DashboardState)) {
        for view in ViewId::ALL {
            if signals::interrupted() {
                return;
            }
            self.refresh_view(view, state, paint);
        }
    }

    fn refresh_view(
        &mut self,
        view: ViewId,
        state: &mut DashboardState,
        paint: &mut dyn FnMut(&DashboardState),
    ) {
        let Some(feed) = self.feeds.get_mut(&view) else {
            return;
        };

        debug!(view = view.key(), "Fetching usage");
        let outcome = feed.fetch().map_err(|e| e.to_string());
        let stamp = (self.clock)();

        match &outcome {
            Err(msg) if self.should_renew(view, msg) => {
                warn!(view = view.key(), "Credential rejected: {}", msg);
                self.renew(view, stamp, state, paint);
                return;
            }
            Err(msg) => warn!(view = view.key(), "Fetch failed: {}", msg),
            Ok(payload) => debug!(
                view = view.key(),
                metrics = payload.metrics.len(),
                "Fetched usage"
            ),
        }

        state.tabs.set(view, outcome, stamp);
        if state.active == view {
            paint(state);
        }
    }

    fn should_renew(&self, view: ViewId, message: &str) -> bool {
        view.renews_credentials() && self.renewal.is_some() && is_auth_error(message)
    }

    /// Show the renewing message, run the renewal, then let the next tick
    /// fetch as usual whatever the renewal outcome
    fn renew(
        &mut self,
        view: ViewId,
        stamp: String,
        state: &mut DashboardState,
        paint: &mut dyn FnMut(&DashboardState),
    ) {
        state
            .tabs
            .set(view, Err(RENEWING_MESSAGE.to_string()), stamp.clone());
        if state.active == view {
            paint(state);
        }

        if let Some(renewal) = &self.renewal {
            info!(view = view.key(), "Renewing credentials");
            match renewal.renew() {
                Ok(()) => info!(view = view.key(), "Renewal finished"),
                Err(e) => {
                    warn!(view = view.key(), "Renewal failed: {}", e);
                    state.tabs.set(view, Err(e.to_string()), stamp);
                    if state.active == view {
                        paint(state);
                    }
                }
            }
        }
    }
}
