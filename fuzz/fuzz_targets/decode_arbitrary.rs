#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must never panic the decoder: either a clean error or
    // a view whose accessors stay in bounds.
    if let Ok(view) = mebo::NumericDecoder::new(data) {
        for slot in 0..view.metric_count() {
            let Some(id) = view.metric_id_at(slot) else { continue };
            let n = view.point_count_at_slot(slot).unwrap_or(0);
            let _ = view.timestamp_at(id, 0);
            let _ = view.timestamp_at(id, n);
            let _ = view.value_at(id, n.saturating_sub(1));
            // Iteration is bounded by the declared point count.
            assert!(view.all_at_slot(slot).count() <= n);
        }
    }
    let _ = mebo::TextDecoder::new(data);
});
