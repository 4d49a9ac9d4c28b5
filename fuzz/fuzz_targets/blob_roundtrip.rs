#![no_main]
use libfuzzer_sys::fuzz_target;

use mebo::{Compression, EncoderConfig, NumericDecoder, NumericEncoder, TimestampEncoding};

fuzz_target!(|input: (u64, Vec<(i64, f64)>)| {
    let (seed, mut points) = input;
    if points.is_empty() || points.len() > 1024 {
        return;
    }
    // Keep timestamps far from the i64 edges so consecutive differences
    // cannot overflow, and sort them: delta mode requires monotonicity.
    for (ts, _) in &mut points {
        *ts >>= 16;
    }
    points.sort_by_key(|&(ts, _)| ts);

    let compression = match seed % 4 {
        0 => Compression::None,
        1 => Compression::Zstd,
        2 => Compression::S2,
        _ => Compression::Lz4,
    };
    let ts_encoding = if seed & 4 == 0 {
        TimestampEncoding::Raw
    } else {
        TimestampEncoding::Delta
    };

    let config = EncoderConfig::new()
        .timestamps(ts_encoding)
        .compression(compression);
    let mut enc = NumericEncoder::new(points[0].0, config).unwrap();
    enc.start_metric_id(seed | 1, points.len()).unwrap();
    for &(ts, v) in &points {
        enc.add_point(ts, v).unwrap();
    }
    enc.end_metric().unwrap();
    let blob = enc.finish().unwrap();

    let view = NumericDecoder::new(&blob).unwrap();
    let recovered: Vec<(i64, f64)> = view
        .all(seed | 1)
        .map(|(_, p)| (p.timestamp, p.value))
        .collect();
    assert_eq!(recovered.len(), points.len());
    for ((ts_in, v_in), (ts_out, v_out)) in points.iter().zip(&recovered) {
        assert_eq!(ts_in, ts_out);
        assert_eq!(v_in.to_bits(), v_out.to_bits());
    }
});
