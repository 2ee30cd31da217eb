use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("reading policy rules {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing policy rules: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("trigger #{0} has an empty phrase")]
    EmptyTrigger(usize),
    #[error("guardrail hedge must not be empty")]
    EmptyHedge,
    #[error("guardrail phrase #{0} is empty")]
    EmptyBannedPhrase(usize),
}
