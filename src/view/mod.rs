use std::sync::Arc;

use crate::directory::User;

/// Width below which a viewport counts as narrow (the `md` breakpoint).
pub const DEFAULT_BREAKPOINT: u32 = 768;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Users,
    Companies,
}

impl Tab {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "users" | "user" => Some(Self::Users),
            "companies" | "company" => Some(Self::Companies),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Users => "User Directory",
            Self::Companies => "Company Directory",
        }
    }

    pub fn noun(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Companies => "companies",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Viewport {
    Narrow,
    Wide,
}

impl Viewport {
    pub fn classify(width: u32, breakpoint: u32) -> Self {
        if width < breakpoint {
            Self::Narrow
        } else {
            Self::Wide
        }
    }
}

#[derive(Clone, Debug)]
pub struct ViewState {
    selected_user: Option<Arc<User>>,
    active_tab: Tab,
    sidebar_open: bool,
    viewport: Viewport,
    breakpoint: u32,
}

impl ViewState {
    pub fn new(width: u32, breakpoint: u32) -> Self {
        let viewport = Viewport::classify(width, breakpoint);
        Self {
            selected_user: None,
            active_tab: Tab::Users,
            sidebar_open: viewport == Viewport::Wide,
            viewport,
            breakpoint,
        }
    }

    pub fn selected_user(&self) -> Option<&Arc<User>> {
        self.selected_user.as_ref()
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Replaces any previous selection.
    pub fn select_user(&mut self, user: Arc<User>) {
        self.selected_user = Some(user);
    }

    pub fn close_user(&mut self) {
        self.selected_user = None;
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    /// Re-classifies the viewport. A classification change overrides any
    /// manual sidebar toggle; a resize within the same class does not.
    pub fn resize(&mut self, width: u32) {
        let viewport = Viewport::classify(width, self.breakpoint);
        if viewport != self.viewport {
            self.viewport = viewport;
            self.sidebar_open = viewport == Viewport::Wide;
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_BREAKPOINT, DEFAULT_BREAKPOINT)
    }
}
