//! Route table for the app shell.
//!
//! Paths resolve to a closed set of pages. Anything unrecognized lands on
//! `NotFound`; a dashboard tab the user has hidden falls back to the
//! dashboard itself.

use serde::Serialize;

use crate::preferences::{DashboardTab, TabVisibility};
use crate::state::AppContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    Dashboard,
    Deals,
    Contacts,
    Onboarding,
    Settings,
    Auth,
    NotFound,
}

const ROUTES: &[(&str, Page)] = &[
    ("/", Page::Dashboard),
    ("/dashboard", Page::Dashboard),
    ("/deals", Page::Deals),
    ("/contacts", Page::Contacts),
    ("/onboarding", Page::Onboarding),
    ("/settings", Page::Settings),
    ("/auth", Page::Auth),
];

impl Page {
    /// Canonical path for links.
    pub fn path(&self) -> &'static str {
        match self {
            Page::Dashboard => "/dashboard",
            Page::Deals => "/deals",
            Page::Contacts => "/contacts",
            Page::Onboarding => "/onboarding",
            Page::Settings => "/settings",
            Page::Auth => "/auth",
            Page::NotFound => "/404",
        }
    }

    /// The dashboard tab gating this page, if any.
    pub fn tab(&self) -> Option<DashboardTab> {
        match self {
            Page::Deals => Some(DashboardTab::Deals),
            Page::Contacts => Some(DashboardTab::Contacts),
            _ => None,
        }
    }

    /// Translation key for the page heading and window title.
    pub fn title_key(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Deals => "tab.deals",
            Page::Contacts => "tab.contacts",
            Page::Onboarding => "Onboarding",
            Page::Settings => "Settings",
            Page::Auth => "Sign In",
            Page::NotFound => "Page not found",
        }
    }
}

/// Resolve a location path. Query strings, fragments, and one trailing slash
/// are ignored; matching is exact otherwise.
pub fn resolve_route(path: &str, tabs: &TabVisibility) -> Page {
    let path = path.split(['?', '#']).next().unwrap_or("");
    let path = if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    };

    let page = ROUTES
        .iter()
        .find(|(p, _)| *p == path)
        .map(|(_, page)| *page)
        .unwrap_or(Page::NotFound);

    match page.tab() {
        Some(tab) if !tabs.is_visible(tab) => {
            log::debug!("Route {} hidden by tab settings, showing dashboard", path);
            Page::Dashboard
        }
        _ => page,
    }
}

/// Where a navigation landed: the page to render and its localized title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub page: Page,
    pub title: String,
}

/// Resolve `path` against the user's tab settings and title the result in
/// the active locale.
pub fn navigate(ctx: &AppContext, path: &str) -> Location {
    let page = resolve_route(path, &ctx.prefs.tabs());
    Location {
        page,
        title: ctx.t(page.title_key()),
    }
}
