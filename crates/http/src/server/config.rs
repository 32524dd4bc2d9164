use tracing::{Level, Span};

/// Settings of an [`Acceptor`](super::Acceptor).
///
/// `name` identifies the acceptor in log output and `log_level` is the level of the span every
/// acceptor event is recorded in, so a subscriber can silence or surface one acceptor on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptorConfig {
    name: String,
    log_level: Level,
}

impl AcceptorConfig {
    pub fn new() -> Self {
        Self { name: "acceptor".to_owned(), log_level: Level::INFO }
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_log_level(mut self, log_level: Level) -> Self {
        self.log_level = log_level;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn log_level(&self) -> Level {
        self.log_level
    }

    pub(crate) fn span(&self) -> Span {
        let name = self.name.as_str();
        if self.log_level == Level::TRACE {
            tracing::trace_span!("acceptor", acceptor = name)
        } else if self.log_level == Level::DEBUG {
            tracing::debug_span!("acceptor", acceptor = name)
        } else if self.log_level == Level::INFO {
            tracing::info_span!("acceptor", acceptor = name)
        } else if self.log_level == Level::WARN {
            tracing::warn_span!("acceptor", acceptor = name)
        } else {
            tracing::error_span!("acceptor", acceptor = name)
        }
    }
}

impl Default for AcceptorConfig {
    fn default() -> Self {
        Self::new()
    }
}
