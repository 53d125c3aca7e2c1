#![windows_subsystem = "windows"]
mod client;
mod collate;
mod config;
mod dashboard;
mod error;
mod logging;
mod models;
mod transform;
mod ui;
slint::include_modules!();

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Context;
use slint::ComponentHandle;
use tokio::task::JoinHandle;

use crate::client::GitHubClient;
use crate::config::Config;
use crate::dashboard::{load_dashboard, DashboardState, Tab};
use crate::transform::SortOption;

/// Avatar edge length requested for the profile card.
const AVATAR_SIZE: u32 = 128;

type SharedState = Arc<Mutex<DashboardState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, DashboardState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn main() -> anyhow::Result<()> {
    // Load .env variables
    dotenvy::dotenv().ok();
    logging::init()?;
    let config = Config::from_env();
    tracing::info!(api_url = %config.api_url, authenticated = config.token.is_some(), "starting dashboard");

    // Shared HTTP Client
    let http_client = GitHubClient::new(&config)?;

    // Background tokio runtime for async HTTP
    let rt = Arc::new(tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?);

    let state: SharedState = Arc::new(Mutex::new(DashboardState::new()));
    let in_flight: Arc<Mutex<Option<JoinHandle<()>>>> = Arc::new(Mutex::new(None));

    let app = AppWindow::new()?;
    ui::render(&app, &lock(&state));

    // =============================================
    //  CALLBACK: search-requested
    // =============================================
    {
        let app_weak = app.as_weak();
        let http_client = http_client.clone();
        let state = state.clone();
        let rt = rt.clone();

        app.on_search_requested(move |query| {
            let Some(app) = app_weak.upgrade() else { return };

            let ticket = {
                let mut state = lock(&state);
                let ticket = state.begin_query();
                ui::render(&app, &state);
                ticket
            };
            ui::set_avatar(&app, None);

            let app_weak = app_weak.clone();
            let http_client = http_client.clone();
            let state = state.clone();
            let username = query.to_string();

            let handle = rt.spawn(async move {
                let result = load_dashboard(&http_client, &username).await;
                let avatar = match &result {
                    Ok((profile, _)) => http_client.fetch_avatar(&profile.avatar_url, AVATAR_SIZE).await,
                    Err(_) => None,
                };

                let _ = slint::invoke_from_event_loop(move || {
                    let Some(app) = app_weak.upgrade() else { return };
                    let mut state = lock(&state);
                    if state.finish_query(ticket, result) {
                        ui::render(&app, &state);
                        ui::set_avatar(&app, avatar);
                    }
                });
            });

            // A newer query supersedes the previous one outright.
            let previous = in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .replace(handle);
            if let Some(previous) = previous {
                previous.abort();
            }
        });
    }

    // =============================================
    //  CALLBACK: filter-edited / sort-selected
    // =============================================
    {
        let app_weak = app.as_weak();
        let state = state.clone();
        app.on_filter_edited(move |text| {
            let Some(app) = app_weak.upgrade() else { return };
            let mut state = lock(&state);
            state.set_filter(text.as_str());
            ui::render_repositories(&app, &state);
        });
    }
    {
        let app_weak = app.as_weak();
        let state = state.clone();
        app.on_sort_selected(move |index| {
            let Some(app) = app_weak.upgrade() else { return };
            let mut state = lock(&state);
            state.set_sort(SortOption::from_index(index));
            ui::render_repositories(&app, &state);
        });
    }

    // =============================================
    //  CALLBACK: tab-selected / theme-toggled
    // =============================================
    {
        let app_weak = app.as_weak();
        let state = state.clone();
        app.on_tab_selected(move |index| {
            let Some(app) = app_weak.upgrade() else { return };
            let mut state = lock(&state);
            state.select_tab(Tab::from_index(index));
            app.set_current_tab(state.tab.index());
        });
    }
    {
        let app_weak = app.as_weak();
        let state = state.clone();
        app.on_theme_toggled(move || {
            let Some(app) = app_weak.upgrade() else { return };
            let theme = lock(&state).toggle_theme();
            app.global::<Palette>().set_dark(theme.is_dark());
        });
    }

    // =============================================
    //  CALLBACK: profile-clicked / repo-clicked
    // =============================================
    app.on_profile_clicked(|url| open_in_browser(url.as_str()));
    app.on_repo_clicked(|url| open_in_browser(url.as_str()));

    app.run()?;

    Ok(())
}

fn open_in_browser(url: &str) {
    if url.is_empty() {
        return;
    }
    if let Err(e) = open::that(url) {
        tracing::warn!(%url, error = %e, "failed to open browser");
    }
}
