#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Ai,
    External,
    Community,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Ai => "ai",
            Tab::External => "external",
            Tab::Community => "community",
        }
    }

    pub fn all() -> [Tab; 3] {
        [Tab::Ai, Tab::External, Tab::Community]
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Ai => 0,
            Tab::External => 1,
            Tab::Community => 2,
        }
    }

    pub fn next(&self) -> Self {
        Self::all()[(self.index() + 1) % 3]
    }

    pub fn prev(&self) -> Self {
        Self::all()[(self.index() + 2) % 3]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Tab::Ai => "AI Answers",
            Tab::External => "External Info",
            Tab::Community => "Community",
        }
    }

    /// Static body for the tabs that have no data behind them yet
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Tab::Ai => None,
            Tab::External => Some(
                "Reliable external sources that supplement the AI answers will appear here.",
            ),
            Tab::Community => Some(
                "Questions and answers between users and expert-reviewed notes will appear here.",
            ),
        }
    }
}
