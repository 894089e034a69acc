pub use crate::builder::LruDictBuilder;
pub use crate::error::{CacheError, ConfigError, ListenerError};
pub use crate::lru_dict::LruDict;
pub use crate::notifier::{BoxedListener, EvictionListener, listener_fn};
pub use crate::stats::CacheStats;
