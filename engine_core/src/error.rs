use thiserror::Error;

use crate::type_registry::TypeKey;

pub type EngineResult<T> = Result<T, EngineError>;

/// A module that could not be instantiated, with the dependencies that never showed up.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StuckModule {
    pub key: TypeKey,
    pub name: &'static str,
    pub missing: Vec<TypeKey>,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("module {name} ({key}) is already registered")]
    DuplicateModule { key: TypeKey, name: &'static str },

    #[error("unsatisfiable module dependency: {}", describe_stuck(.stuck))]
    UnsatisfiedDependencies { stuck: Vec<StuckModule> },

    #[error("module error [{module}]: {source}")]
    Module {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("app error [{app}]: {source}")]
    App {
        app: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("platform error: {0}")]
    Platform(#[source] anyhow::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("signal error: {0}")]
    Signal(String),
}

fn describe_stuck(stuck: &[StuckModule]) -> String {
    stuck
        .iter()
        .map(|m| {
            let missing: Vec<String> = m.missing.iter().map(ToString::to_string).collect();
            format!("{} ({}) waits on [{}]", m.name, m.key, missing.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ctrlc::Error> for EngineError {
    fn from(e: ctrlc::Error) -> Self {
        Self::Signal(e.to_string())
    }
}
