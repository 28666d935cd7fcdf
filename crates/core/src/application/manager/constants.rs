// Manager constants (no magic values)
use std::time::Duration;

/// Sleep duration when every queue is empty (100ms)
pub const IDLE_SLEEP_DURATION: Duration = Duration::from_millis(100);

/// Sleep duration after a store error before fetching again (1s)
pub const ERROR_RECOVERY_SLEEP_DURATION: Duration = Duration::from_secs(1);

/// Bytes of handler stderr kept in a failed job's error
pub const MAX_ERROR_OUTPUT_BYTES: usize = 512;
