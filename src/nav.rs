// Screen navigation

use std::fmt;
use tracing::info;

/// Named navigation destinations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Records,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Login => write!(f, "Login"),
            Screen::Records => write!(f, "Records"),
        }
    }
}

/// Navigation surface; transitions replace the current screen and keep no history
pub trait Navigator {
    fn replace(&mut self, screen: Screen);

    fn current(&self) -> Screen;
}

/// Navigation stack that only ever holds one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenStack {
    current: Screen,
}

impl ScreenStack {
    pub fn new(initial: Screen) -> Self {
        Self { current: initial }
    }
}

impl Default for ScreenStack {
    fn default() -> Self {
        Self::new(Screen::Login)
    }
}

impl Navigator for ScreenStack {
    fn replace(&mut self, screen: Screen) {
        info!(from = %self.current, to = %screen, "Navigating");
        self.current = screen;
    }

    fn current(&self) -> Screen {
        self.current
    }
}

/// Leave the records screen for a fresh login
pub fn logout<N: Navigator>(navigator: &mut N) {
    navigator.replace(Screen::Login);
}
