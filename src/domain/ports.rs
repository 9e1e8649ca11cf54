use chrono::{DateTime, Utc};

/// Time source injected into a facility. Entry and exit times are read from it.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
