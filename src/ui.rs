//! Maps dashboard state onto the Slint window.

use std::rc::Rc;

use slint::{ComponentHandle, Image, ModelRc, Rgba8Pixel, SharedPixelBuffer, SharedString, VecModel};

use crate::client::AvatarPixels;
use crate::dashboard::DashboardState;
use crate::models::{Repository, UserProfile};
use crate::transform::{LanguageShare, TimelinePoint};
use crate::{AppWindow, LanguageItem, Palette, RepoItem, TimelineItem};

/// Pushes the whole state into the window.
pub fn render(app: &AppWindow, state: &DashboardState) {
    app.global::<Palette>().set_dark(state.theme.is_dark());
    app.set_current_tab(state.tab.index());
    app.set_is_loading(state.loading);
    app.set_error_message(state.error.clone().unwrap_or_default().into());

    render_profile(app, state.profile.as_ref());
    render_repositories(app, state);
    render_summaries(app, state);
}

fn render_profile(app: &AppWindow, profile: Option<&UserProfile>) {
    app.set_has_profile(profile.is_some());
    let Some(profile) = profile else {
        return;
    };

    app.set_login_name(profile.login.as_str().into());
    app.set_display_name(profile.display_name().into());
    app.set_bio(profile.bio.clone().unwrap_or_default().into());
    app.set_profile_url(profile.html_url.as_str().into());
    app.set_joined(profile.joined_label().unwrap_or_default().into());
    app.set_public_repos(profile.public_repos.to_string().into());
    app.set_followers(profile.followers.to_string().into());
    app.set_following(profile.following.to_string().into());
}

/// Refreshes the list view only; filter and sort changes never touch the
/// profile or the charts.
pub fn render_repositories(app: &AppWindow, state: &DashboardState) {
    let views = state.views();
    let items: Vec<RepoItem> = views.repositories.iter().map(repo_item).collect();

    app.set_filter_text(state.filter_text().into());
    app.set_sort_index(state.sort_option().index());
    app.set_repo_count(
        format!("{} of {} repositories", views.repositories.len(), state.repositories().len()).into(),
    );
    app.set_empty_message(state.empty_state().map(|e| e.message()).unwrap_or_default().into());
    app.set_repo_list(model(items));
}

/// Overview summary and both charts; all describe the whole collection.
fn render_summaries(app: &AppWindow, state: &DashboardState) {
    let views = state.views();
    app.set_top_repos(model(views.top_repositories.iter().map(repo_item).collect()));
    app.set_totals_label(
        format!(
            "{} stars and {} forks across {} repositories",
            views.totals.stars,
            views.totals.forks,
            state.repositories().len()
        )
        .into(),
    );
    app.set_languages(model(language_items(&views.languages)));
    app.set_timeline(model(timeline_items(&views.timeline)));
}

pub fn set_avatar(app: &AppWindow, pixels: Option<AvatarPixels>) {
    let image = match pixels {
        Some((px, w, h)) => {
            let buf = SharedPixelBuffer::<Rgba8Pixel>::clone_from_slice(&px, w, h);
            Image::from_rgba8(buf)
        }
        None => Image::default(),
    };
    app.set_avatar(image);
}

fn repo_item(repo: &Repository) -> RepoItem {
    RepoItem {
        name: repo.name.as_str().into(),
        description: repo.description.clone().unwrap_or_default().into(),
        language: repo.declared_language().unwrap_or_default().into(),
        stars: repo.stargazers_count.to_string().into(),
        forks: repo.forks_count.to_string().into(),
        issues: repo.open_issues_count.to_string().into(),
        updated: repo
            .updated_at
            .map(|at| format!("Updated {}", at.format("%b %-d, %Y")))
            .unwrap_or_default()
            .into(),
        url: repo.html_url.as_str().into(),
    }
}

fn language_items(shares: &[LanguageShare]) -> Vec<LanguageItem> {
    shares
        .iter()
        .map(|share| LanguageItem {
            name: share.language.as_str().into(),
            percentage: share.percentage_label().into(),
            fraction: (share.percentage / 100.0) as f32,
        })
        .collect()
}

/// Bar heights are relative to the most-starred point.
fn timeline_items(points: &[TimelinePoint]) -> Vec<TimelineItem> {
    let max = points.iter().map(|p| p.stars).max().unwrap_or(0).max(1);
    points
        .iter()
        .map(|point| TimelineItem {
            name: SharedString::from(point.name.as_str()),
            stars: point.stars.to_string().into(),
            label: point.label.as_str().into(),
            fraction: point.stars as f32 / max as f32,
        })
        .collect()
}

fn model<T: Clone + 'static>(items: Vec<T>) -> ModelRc<T> {
    ModelRc::from(Rc::new(VecModel::from(items)))
}
