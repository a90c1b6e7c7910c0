//! Provider identification.

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Anthropic,
    Ollama,
    LocalAi,
    Mock,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "anthropic" | "claude" => Some(Self::Anthropic),
            "ollama" => Some(Self::Ollama),
            "localai" | "local-ai" => Some(Self::LocalAi),
            "mock" => Some(Self::Mock),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::Ollama => "ollama",
            Self::LocalAi => "localai",
            Self::Mock => "mock",
        }
    }

    /// Endpoint used when configuration names none.
    pub fn default_endpoint(&self) -> Option<&'static str> {
        match self {
            Self::Anthropic => Some("https://api.anthropic.com"),
            Self::Ollama => Some("http://localhost:11434"),
            Self::LocalAi => Some("http://localhost:8080"),
            Self::Mock => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_parsing() {
        assert_eq!(ProviderType::parse("anthropic"), Some(ProviderType::Anthropic));
        assert_eq!(ProviderType::parse("Claude"), Some(ProviderType::Anthropic));
        assert_eq!(ProviderType::parse("ollama"), Some(ProviderType::Ollama));
        assert_eq!(ProviderType::parse("localai"), Some(ProviderType::LocalAi));
        assert_eq!(ProviderType::parse("mock"), Some(ProviderType::Mock));
        assert_eq!(ProviderType::parse("gguf"), None);
    }

    #[test]
    fn test_canonical_names_round_trip() {
        for provider in [
            ProviderType::Anthropic,
            ProviderType::Ollama,
            ProviderType::LocalAi,
            ProviderType::Mock,
        ] {
            assert_eq!(ProviderType::parse(provider.as_str()), Some(provider));
        }
    }
}
