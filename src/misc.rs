use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[macro_export]
macro_rules! exit_error {
    ($($arg:tt)+) => {
        {
            log::error!($($arg)+);
            std::process::exit(1)
        }
    }
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// Human readable lifetime shown on the login page and info endpoints, e.g. "2 hours and 30 mins".
pub fn format_lifetime(lifetime: Duration) -> String {
    const UNITS: [(u64, &str); 4] = [(24 * 60 * 60, "day"), (60 * 60, "hour"), (60, "min"), (1, "sec")];

    let mut secs = lifetime.as_secs();
    if secs == 0 {
        return String::from("0 secs");
    }

    let parts = UNITS
        .iter()
        .filter_map(|&(unit, word)| {
            let n = secs / unit;
            secs %= unit;
            (n > 0).then(|| if n >= 2 { format!("{} {}s", n, word) } else { format!("{} {}", n, word) })
        })
        .take(2)
        .collect::<Vec<_>>();

    match parts.as_slice() {
        [single] => single.clone(),
        [first, second] => format!("{} and {}", first, second),
        _ => unreachable!(),
    }
}
