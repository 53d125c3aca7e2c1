//! Dashboard state and the sequenced profile + repository query.
//!
//! The window keeps exactly one [`DashboardState`]. Every mutation that can
//! change what the repository list or the charts show re-runs
//! [`transform::derive`] before returning, so `views` is always current.

use crate::client::{normalize_username, Gateway};
use crate::error::GatewayError;
use crate::models::{Repository, UserProfile};
use crate::transform::{self, DerivedViews, SortOption};

/// Tabs of the dashboard body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Overview,
    Repositories,
    Analytics,
}

impl Tab {
    pub fn from_index(index: i32) -> Self {
        match index {
            1 => Self::Repositories,
            2 => Self::Analytics,
            _ => Self::Overview,
        }
    }

    pub fn index(self) -> i32 {
        match self {
            Self::Overview => 0,
            Self::Repositories => 1,
            Self::Analytics => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }
}

/// Identifies one submitted query. Only the latest ticket may publish results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTicket(u64);

/// Placeholder shown instead of an empty repository list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    NoMatches,
    NoRepositories,
}

impl EmptyState {
    pub fn message(self) -> &'static str {
        match self {
            Self::NoMatches => "No repositories match your search.",
            Self::NoRepositories => "This user has no public repositories.",
        }
    }
}

/// Profile plus repositories, fetched together for one username.
pub type DashboardData = (UserProfile, Vec<Repository>);

#[derive(Debug, Default)]
pub struct DashboardState {
    pub profile: Option<UserProfile>,
    repositories: Vec<Repository>,
    filter_text: String,
    sort_option: SortOption,
    views: DerivedViews,
    pub tab: Tab,
    pub theme: Theme,
    pub loading: bool,
    pub error: Option<String>,
    generation: u64,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    pub fn views(&self) -> &DerivedViews {
        &self.views
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn sort_option(&self) -> SortOption {
        self.sort_option
    }

    /// Starts a new query, superseding any in flight, and clears the
    /// previous result so nothing stale is rendered while loading.
    pub fn begin_query(&mut self) -> QueryTicket {
        self.generation += 1;
        self.profile = None;
        self.repositories.clear();
        self.error = None;
        self.loading = true;
        self.recompute();
        QueryTicket(self.generation)
    }

    /// Publishes a query result. Returns `false` and changes nothing when a
    /// newer query has started since `ticket` was issued.
    pub fn finish_query(&mut self, ticket: QueryTicket, result: Result<DashboardData, GatewayError>) -> bool {
        if ticket.0 != self.generation {
            tracing::debug!(ticket = ticket.0, current = self.generation, "discarding stale query result");
            return false;
        }

        self.loading = false;
        match result {
            Ok((profile, repositories)) => {
                tracing::info!(login = %profile.login, repositories = repositories.len(), "dashboard loaded");
                self.profile = Some(profile);
                self.repositories = repositories;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "dashboard query failed");
                self.profile = None;
                self.repositories.clear();
                self.error = Some(e.user_message().to_string());
            }
        }
        self.recompute();
        true
    }

    pub fn set_filter(&mut self, text: &str) {
        if self.filter_text != text {
            self.filter_text = text.to_string();
            self.recompute();
        }
    }

    pub fn set_sort(&mut self, option: SortOption) {
        if self.sort_option != option {
            self.sort_option = option;
            self.recompute();
        }
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    /// What to show when the list view is empty, if anything.
    pub fn empty_state(&self) -> Option<EmptyState> {
        if self.profile.is_none() || !self.views.repositories.is_empty() {
            None
        } else if self.repositories.is_empty() {
            Some(EmptyState::NoRepositories)
        } else {
            Some(EmptyState::NoMatches)
        }
    }

    fn recompute(&mut self) {
        self.views = transform::derive(&self.repositories, &self.filter_text, self.sort_option);
    }
}

/// Fetches the profile, then the repositories. The first failure aborts the
/// whole load; a profile is never returned without its repositories.
pub async fn load_dashboard<G>(gateway: &G, username: &str) -> Result<DashboardData, GatewayError>
where
    G: Gateway + ?Sized,
{
    let username = normalize_username(username)?;
    tracing::info!(%username, "loading dashboard");

    let profile = gateway.fetch_profile(username).await?;
    let repositories = gateway.fetch_repositories(username).await?;
    Ok((profile, repositories))
}
