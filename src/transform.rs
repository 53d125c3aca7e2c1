//! Derived views over a fetched repository list.
//!
//! Everything here is pure: the raw list is borrowed, never mutated, and each
//! view is rebuilt from scratch whenever the list, the filter text or the
//! sort option changes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::collate::compare_names;
use crate::models::Repository;

/// Number of languages shown in the distribution chart.
pub const TOP_LANGUAGES: usize = 5;

/// Number of repositories plotted in the stars timeline.
pub const TIMELINE_LIMIT: usize = 10;

/// Number of repositories highlighted on the overview tab.
pub const TOP_REPOSITORIES: usize = 3;

/// Ordering applied to the repository list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOption {
    #[default]
    Updated,
    Stars,
    Forks,
    Name,
}

impl SortOption {
    /// All options, in the order the sort picker lists them.
    pub const ALL: [SortOption; 4] = [Self::Updated, Self::Stars, Self::Forks, Self::Name];

    /// Option at `index` in [`SortOption::ALL`]; out of range falls back to the default.
    pub fn from_index(index: i32) -> Self {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or_default()
    }

    pub fn index(self) -> i32 {
        match self {
            Self::Updated => 0,
            Self::Stars => 1,
            Self::Forks => 2,
            Self::Name => 3,
        }
    }
}

/// One slice of the language distribution chart.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageShare {
    pub language: String,
    pub count: usize,
    /// Share of the whole collection, including repositories without a language.
    pub percentage: f64,
}

impl LanguageShare {
    /// Percentage rounded to one decimal place, e.g. `"42.9%"`.
    pub fn percentage_label(&self) -> String {
        format!("{:.1}%", self.percentage)
    }
}

/// One bar of the stars timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelinePoint {
    pub name: String,
    pub stars: u32,
    pub label: String,
}

/// Star and fork sums over the whole collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub stars: u64,
    pub forks: u64,
}

/// Everything the dashboard renders from the repository list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedViews {
    pub repositories: Vec<Repository>,
    pub languages: Vec<LanguageShare>,
    pub timeline: Vec<TimelinePoint>,
    pub top_repositories: Vec<Repository>,
    pub totals: Totals,
}

/// Recomputes all views. The list view honours the filter; the charts and
/// the overview always describe the whole collection.
pub fn derive(raw: &[Repository], filter_text: &str, sort_option: SortOption) -> DerivedViews {
    let mut repositories = filter(raw, filter_text);
    sort(&mut repositories, sort_option);

    DerivedViews {
        repositories,
        languages: language_distribution(raw),
        timeline: stars_timeline(raw),
        top_repositories: top_repositories(raw),
        totals: totals(raw),
    }
}

/// Repositories whose name or description contains `text`, ignoring case,
/// in their original order.
pub fn filter(repos: &[Repository], text: &str) -> Vec<Repository> {
    if text.is_empty() {
        return repos.to_vec();
    }

    let needle = text.to_lowercase();
    repos
        .iter()
        .filter(|repo| {
            repo.name.to_lowercase().contains(&needle)
                || repo
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Sorts in place. `sort_by` is stable, so equal keys keep their input order.
pub fn sort(repos: &mut [Repository], option: SortOption) {
    match option {
        SortOption::Updated => repos.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
        SortOption::Stars => repos.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count)),
        SortOption::Forks => repos.sort_by(|a, b| b.forks_count.cmp(&a.forks_count)),
        SortOption::Name => repos.sort_by(|a, b| compare_names(&a.name, &b.name)),
    }
}

/// Top languages by repository count, ties in first-seen order.
pub fn language_distribution(repos: &[Repository]) -> Vec<LanguageShare> {
    let total = repos.len();
    if total == 0 {
        return Vec::new();
    }

    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for language in repos.iter().filter_map(Repository::declared_language) {
        match positions.get(language) {
            Some(&pos) => counts[pos].1 += 1,
            None => {
                positions.insert(language, counts.len());
                counts.push((language, 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(TOP_LANGUAGES)
        .map(|(language, count)| LanguageShare {
            language: language.to_string(),
            count,
            percentage: 100.0 * count as f64 / total as f64,
        })
        .collect()
}

/// Starred repositories, oldest first, capped at [`TIMELINE_LIMIT`].
pub fn stars_timeline(repos: &[Repository]) -> Vec<TimelinePoint> {
    let mut starred: Vec<&Repository> = repos.iter().filter(|r| r.stargazers_count > 0).collect();
    starred.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    starred
        .into_iter()
        .take(TIMELINE_LIMIT)
        .map(|repo| TimelinePoint {
            name: repo.name.clone(),
            stars: repo.stargazers_count,
            label: month_year_label(repo.created_at),
        })
        .collect()
}

/// Most-starred repositories with at least one star, ties in input order.
pub fn top_repositories(repos: &[Repository]) -> Vec<Repository> {
    let mut starred: Vec<Repository> = repos.iter().filter(|r| r.stargazers_count > 0).cloned().collect();
    sort(&mut starred, SortOption::Stars);
    starred.truncate(TOP_REPOSITORIES);
    starred
}

pub fn totals(repos: &[Repository]) -> Totals {
    repos.iter().fold(Totals::default(), |acc, repo| Totals {
        stars: acc.stars + u64::from(repo.stargazers_count),
        forks: acc.forks + u64::from(repo.forks_count),
    })
}

/// "Jan 2024", or "Unknown" when the instant is missing.
pub fn month_year_label(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "Unknown".to_string(), |at| at.format("%b %Y").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(y: i32, m: u32, d: u32) -> Option<DateTime<Utc>> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).single()
    }

    fn repo(id: u64, name: &str) -> Repository {
        Repository {
            id,
            name: name.to_string(),
            html_url: format!("https://github.com/octocat/{name}"),
            ..Default::default()
        }
    }

    fn names(repos: &[Repository]) -> Vec<&str> {
        repos.iter().map(|r| r.name.as_str()).collect()
    }

    fn scenario() -> Vec<Repository> {
        vec![
            Repository {
                stargazers_count: 5,
                forks_count: 1,
                updated_at: at(2024, 1, 1),
                ..repo(1, "b")
            },
            Repository {
                stargazers_count: 10,
                forks_count: 0,
                updated_at: at(2024, 6, 1),
                ..repo(2, "a")
            },
        ]
    }

    fn mixed() -> Vec<Repository> {
        vec![
            Repository {
                description: Some("A CLI for Rust".into()),
                language: Some("Rust".into()),
                stargazers_count: 3,
                forks_count: 2,
                created_at: at(2021, 3, 1),
                updated_at: at(2024, 2, 1),
                ..repo(1, "tool")
            },
            Repository {
                language: Some("Go".into()),
                stargazers_count: 3,
                forks_count: 7,
                created_at: at(2020, 5, 1),
                updated_at: at(2024, 2, 1),
                ..repo(2, "Server")
            },
            Repository {
                description: Some("notes".into()),
                created_at: at(2019, 1, 1),
                ..repo(3, "dotfiles")
            },
            Repository {
                language: Some("Rust".into()),
                stargazers_count: 40,
                forks_count: 2,
                created_at: at(2022, 8, 1),
                updated_at: at(2023, 11, 5),
                ..repo(4, "rustacean")
            },
        ]
    }

    #[test]
    fn test_scenario_sort_by_stars() {
        let mut repos = scenario();
        sort(&mut repos, SortOption::Stars);
        assert_eq!(names(&repos), ["a", "b"]);
    }

    #[test]
    fn test_scenario_sort_by_name() {
        let mut repos = scenario();
        sort(&mut repos, SortOption::Name);
        assert_eq!(names(&repos), ["a", "b"]);
    }

    #[test]
    fn test_scenario_filter_without_match_is_empty() {
        let views = derive(&scenario(), "xyz", SortOption::Updated);
        assert!(views.repositories.is_empty());
    }

    #[test]
    fn test_filter_empty_text_is_identity() {
        let repos = mixed();
        assert_eq!(filter(&repos, ""), repos);
    }

    #[test]
    fn test_filter_matches_name_or_description_ignoring_case() {
        let repos = mixed();
        assert_eq!(names(&filter(&repos, "RUST")), ["tool", "rustacean"]);
        assert_eq!(names(&filter(&repos, "server")), ["Server"]);
        assert_eq!(names(&filter(&repos, "NOTES")), ["dotfiles"]);
    }

    #[test]
    fn test_filter_result_is_subsequence() {
        let repos = mixed();
        for text in ["", "o", "t", "rust", "zzz"] {
            let out = filter(&repos, text);
            let mut source = repos.iter();
            for item in &out {
                assert!(source.any(|r| r == item), "{text:?} broke ordering");
            }
        }
    }

    #[rstest]
    #[case(SortOption::Updated, ["tool", "Server", "rustacean", "dotfiles"])]
    #[case(SortOption::Stars, ["rustacean", "tool", "Server", "dotfiles"])]
    #[case(SortOption::Forks, ["Server", "tool", "rustacean", "dotfiles"])]
    #[case(SortOption::Name, ["dotfiles", "rustacean", "Server", "tool"])]
    fn test_sort_orders_are_stable(#[case] option: SortOption, #[case] expected: [&str; 4]) {
        let mut repos = mixed();
        sort(&mut repos, option);
        assert_eq!(names(&repos), expected);
    }

    #[rstest]
    fn test_sort_is_idempotent(
        #[values(SortOption::Updated, SortOption::Stars, SortOption::Forks, SortOption::Name)]
        option: SortOption,
    ) {
        let mut once = mixed();
        sort(&mut once, option);
        let mut twice = once.clone();
        sort(&mut twice, option);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_updated_at_sorts_last() {
        let mut repos = vec![repo(1, "undated"), Repository { updated_at: at(2020, 1, 1), ..repo(2, "dated") }];
        sort(&mut repos, SortOption::Updated);
        assert_eq!(names(&repos), ["dated", "undated"]);
    }

    #[test]
    fn test_language_distribution_uses_full_denominator() {
        let shares = language_distribution(&mixed());
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].language, "Rust");
        assert_eq!(shares[0].count, 2);
        assert_eq!(shares[0].percentage_label(), "50.0%");
        assert_eq!(shares[1].language, "Go");
        assert_eq!(shares[1].percentage_label(), "25.0%");
    }

    #[test]
    fn test_language_distribution_top_five_with_first_seen_ties() {
        let langs = ["C", "Go", "Zig", "Go", "Lua", "Nim", "Odin", "Rust", "Rust", "Rust"];
        let repos: Vec<Repository> = langs
            .iter()
            .enumerate()
            .map(|(i, lang)| Repository {
                language: Some(lang.to_string()),
                ..repo(i as u64, "r")
            })
            .collect();

        let shares = language_distribution(&repos);
        let order: Vec<&str> = shares.iter().map(|s| s.language.as_str()).collect();
        assert_eq!(order, ["Rust", "Go", "C", "Zig", "Lua"]);

        let sum: f64 = shares.iter().map(|s| s.percentage).sum();
        assert!(sum <= 100.0);
    }

    #[test]
    fn test_language_distribution_rounds_to_one_decimal() {
        let repos = vec![
            Repository { language: Some("Rust".into()), ..repo(1, "a") },
            repo(2, "b"),
            repo(3, "c"),
        ];
        let shares = language_distribution(&repos);
        assert_eq!(shares[0].percentage_label(), "33.3%");
    }

    #[test]
    fn test_language_distribution_empty_collection() {
        assert!(language_distribution(&[]).is_empty());
        assert!(language_distribution(&[repo(1, "plain")]).is_empty());
    }

    #[test]
    fn test_stars_timeline_orders_and_labels() {
        let points = stars_timeline(&mixed());
        let order: Vec<&str> = points.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(order, ["Server", "tool", "rustacean"]);
        assert_eq!(points[0].label, "May 2020");
        assert!(points.iter().all(|p| p.stars > 0));
    }

    #[test]
    fn test_stars_timeline_is_capped() {
        let repos: Vec<Repository> = (0..25)
            .map(|i| Repository {
                stargazers_count: i % 3,
                created_at: at(2000 + i as i32, 1, 1),
                ..repo(u64::from(i), &format!("r{i}"))
            })
            .collect();

        let points = stars_timeline(&repos);
        let starred = repos.iter().filter(|r| r.stargazers_count > 0).count();
        assert_eq!(points.len(), TIMELINE_LIMIT.min(starred));
        assert_eq!(points[0].name, "r1");
    }

    #[test]
    fn test_stars_timeline_undated_repository_comes_first() {
        let repos = vec![
            Repository { stargazers_count: 4, created_at: at(2020, 1, 1), ..repo(1, "dated") },
            Repository { stargazers_count: 2, ..repo(2, "undated") },
        ];

        let points = stars_timeline(&repos);
        assert_eq!(points[0].name, "undated");
        assert_eq!(points[0].label, "Unknown");
        assert_eq!(points[1].label, "Jan 2020");
    }

    #[test]
    fn test_stars_timeline_keeps_input_order_on_equal_instants() {
        let repos = vec![
            Repository { stargazers_count: 1, created_at: at(2022, 4, 1), ..repo(1, "later") },
            Repository { stargazers_count: 9, created_at: at(2021, 4, 1), ..repo(2, "second") },
            Repository { stargazers_count: 3, created_at: at(2021, 4, 1), ..repo(3, "first") },
        ];

        let order: Vec<String> = stars_timeline(&repos).into_iter().map(|p| p.name).collect();
        assert_eq!(order, ["second", "first", "later"]);
    }

    #[test]
    fn test_top_repositories_and_totals() {
        let repos = mixed();
        assert_eq!(names(&top_repositories(&repos)), ["rustacean", "tool", "Server"]);
        assert_eq!(totals(&repos), Totals { stars: 46, forks: 11 });

        assert!(top_repositories(&[repo(1, "unstarred")]).is_empty());
        assert_eq!(totals(&[]), Totals::default());
    }

    #[test]
    fn test_month_year_label_unknown() {
        assert_eq!(month_year_label(None), "Unknown");
        assert_eq!(month_year_label(at(2024, 1, 15)), "Jan 2024");
    }

    #[test]
    fn test_derive_charts_ignore_filter() {
        let views = derive(&mixed(), "dotfiles", SortOption::Name);
        assert_eq!(names(&views.repositories), ["dotfiles"]);
        assert_eq!(views.languages.len(), 2);
        assert_eq!(views.timeline.len(), 3);
    }

    #[test]
    fn test_sort_option_index_round_trip() {
        for option in SortOption::ALL {
            assert_eq!(SortOption::from_index(option.index()), option);
        }
        assert_eq!(SortOption::from_index(-1), SortOption::Updated);
        assert_eq!(SortOption::from_index(9), SortOption::Updated);
    }
}
