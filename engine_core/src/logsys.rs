use env_logger::Env;
use log::Level;

/// Installs `env_logger`. `RUST_LOG` overrides `filter`. Returns false if a logger was already set.
pub fn init(filter: &str) -> bool {
    env_logger::Builder::from_env(Env::default().default_filter_or(filter))
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}

/// Tagged logger; the tag becomes the `log` target.
#[derive(Clone)]
pub struct Logger {
    tag: &'static str,
}

impl Logger {
    pub fn new(tag: &'static str) -> Self {
        Self { tag }
    }

    #[inline]
    pub fn info(&self, msg: impl AsRef<str>) {
        self.print(Level::Info, msg.as_ref());
    }

    #[inline]
    pub fn debug(&self, msg: impl AsRef<str>) {
        self.print(Level::Debug, msg.as_ref());
    }

    #[inline]
    pub fn warn(&self, msg: impl AsRef<str>) {
        self.print(Level::Warn, msg.as_ref());
    }

    #[inline]
    pub fn error(&self, msg: impl AsRef<str>) {
        self.print(Level::Error, msg.as_ref());
    }

    fn print(&self, lvl: Level, msg: &str) {
        log::log!(target: self.tag, lvl, "{}", msg);
    }
}
