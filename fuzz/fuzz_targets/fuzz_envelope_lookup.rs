#![no_main]
use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;
use pump_core::{Classification, EnvelopeTable, OperatingPoint, band_for_head, classify};

#[derive(Debug, Arbitrary)]
struct Input {
    rows: Vec<(u32, f64, f64)>,
    head: f64,
    flow: f64,
}

fuzz_target!(|input: Input| {
    let table = input
        .rows
        .iter()
        .fold(EnvelopeTable::builder(), |b, &(band, lo, hi)| b.band(band, lo, hi))
        .build();
    let Ok(table) = table else { return };

    let point = OperatingPoint::new(input.head, input.flow);
    let class = classify(&point, &table);
    match table.lookup(input.head) {
        Some(row) => {
            assert_eq!(Some(row.head_band), band_for_head(input.head));
            assert_eq!(class == Classification::InBand, row.contains(input.flow));
        }
        None => assert_eq!(class, Classification::OutOfBand),
    }
});
