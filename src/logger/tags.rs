/// Log tags identifying the subsystem a message comes from

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Api,
    Subgraph,
    Ticks,
    Fees,
    Emissions,
    Report,
}

impl LogTag {
    /// Key used by `--debug-<key>` flags
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::System => "system".to_string(),
            LogTag::Config => "config".to_string(),
            LogTag::Api => "api".to_string(),
            LogTag::Subgraph => "subgraph".to_string(),
            LogTag::Ticks => "ticks".to_string(),
            LogTag::Fees => "fees".to_string(),
            LogTag::Emissions => "emissions".to_string(),
            LogTag::Report => "report".to_string(),
        }
    }

    /// Uppercase label without colors
    pub fn to_plain_string(&self) -> String {
        self.to_debug_key().to_uppercase()
    }

    /// All known tags (used to resolve `--debug-<key>` flags)
    pub fn all() -> Vec<LogTag> {
        vec![
            LogTag::System,
            LogTag::Config,
            LogTag::Api,
            LogTag::Subgraph,
            LogTag::Ticks,
            LogTag::Fees,
            LogTag::Emissions,
            LogTag::Report,
        ]
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}
