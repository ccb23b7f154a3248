#![no_main]

use libfuzzer_sys::fuzz_target;
use x86scope::interval::{Interval, IntervalSet};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(interval) = text.parse::<Interval<i64>>() {
        let rendered = interval.to_string();
        assert_eq!(rendered.parse::<Interval<i64>>().ok(), Some(interval));
    }

    if let Ok(mut set) = text.parse::<IntervalSet<i64>>() {
        let original = set.clone();
        set.complement();
        set.complement();
        assert_eq!(set, original);
    }
});
