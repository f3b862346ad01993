use clap::ValueEnum;

pub const DEFAULT_MAX_URLS: usize = 3;
pub const DEFAULT_ARTICLE_CHARS: usize = 3000;
pub const DEFAULT_SNIPPET_RESULTS: usize = 3;
pub const DEFAULT_SNIPPET_CHARS: usize = 500;
pub const DEFAULT_REGION: &str = "wt-wt";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SafeSearch {
    #[default]
    Off,
    Moderate,
    Strict,
}

impl SafeSearch {
    /// Value of DuckDuckGo's `kp` parameter.
    pub fn ddg_param(self) -> &'static str {
        match self {
            SafeSearch::Off => "-2",
            SafeSearch::Moderate => "-1",
            SafeSearch::Strict => "1",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeLimit {
    Day,
    Week,
    Month,
    Year,
}

impl TimeLimit {
    /// Value of DuckDuckGo's `df` parameter.
    pub fn ddg_param(self) -> &'static str {
        match self {
            TimeLimit::Day => "d",
            TimeLimit::Week => "w",
            TimeLimit::Month => "m",
            TimeLimit::Year => "y",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub region: String,
    pub safe_search: SafeSearch,
    pub time_limit: Option<TimeLimit>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            safe_search: SafeSearch::Off,
            time_limit: None,
        }
    }
}

/// Limits applied to every knowledge-source lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnippetOptions {
    pub max_results: usize,
    pub max_chars: usize,
}

impl Default for SnippetOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_SNIPPET_RESULTS,
            max_chars: DEFAULT_SNIPPET_CHARS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchSettings {
    pub max_urls: usize,
    pub article_chars: usize,
    pub snippets: SnippetOptions,
    pub search: SearchOptions,
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            max_urls: DEFAULT_MAX_URLS,
            article_chars: DEFAULT_ARTICLE_CHARS,
            snippets: SnippetOptions::default(),
            search: SearchOptions::default(),
        }
    }
}
