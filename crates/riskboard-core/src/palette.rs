//! Display color tokens shared by severity badges, distribution buckets and chart series.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorToken {
    Green,
    Amber,
    Red,
    Blue,
    Purple,
    DarkRed,
}

impl ColorToken {
    pub const ALL: [ColorToken; 6] = [
        ColorToken::Green,
        ColorToken::Amber,
        ColorToken::Red,
        ColorToken::Blue,
        ColorToken::Purple,
        ColorToken::DarkRed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Amber => "amber",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::DarkRed => "dark-red",
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            Self::Green => "#10B981",
            Self::Amber => "#F59E0B",
            Self::Red => "#EF4444",
            Self::Blue => "#3B82F6",
            Self::Purple => "#8B5CF6",
            Self::DarkRed => "#7C2D12",
        }
    }

    /// Resolves either a token name (`amber`) or its hex value (`#f59e0b`).
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ALL.into_iter().find(|token| {
            token.as_str().eq_ignore_ascii_case(trimmed)
                || token.hex().eq_ignore_ascii_case(trimmed)
        })
    }
}
