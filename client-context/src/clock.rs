use std::time::{Instant, SystemTime, UNIX_EPOCH};

use once_cell::sync::Lazy;

/// Origin for [`NanoClock`]; only differences between readings are meaningful.
static PROCESS_START: Lazy<Instant> = Lazy::new(Instant::now);

/// Time source used by clients for deadlines and retries.
pub trait ApiClock: Send + Sync {
    fn nano_time(&self) -> u64;

    fn millis_time(&self) -> u64;
}

/// Monotonic clock relative to first use in this process.
#[derive(Clone, Copy, Debug, Default)]
pub struct NanoClock;

impl ApiClock for NanoClock {
    fn nano_time(&self) -> u64 {
        u64::try_from(PROCESS_START.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    fn millis_time(&self) -> u64 {
        self.nano_time() / 1_000_000
    }
}

/// Wall clock in milliseconds since the Unix epoch. Not monotonic.
#[derive(Clone, Copy, Debug, Default)]
pub struct CurrentMillisClock;

impl ApiClock for CurrentMillisClock {
    fn nano_time(&self) -> u64 {
        self.millis_time().saturating_mul(1_000_000)
    }

    fn millis_time(&self) -> u64 {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        u64::try_from(millis).unwrap_or(u64::MAX)
    }
}
