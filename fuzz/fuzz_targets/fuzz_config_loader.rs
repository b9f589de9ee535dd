#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    if let Ok(cfg) = toml::from_str::<pump_config::Config>(data)
        && cfg.validate().is_ok()
    {
        // Whatever validates must also build a core table.
        assert!(pump_core::EnvelopeTable::try_from(&cfg.envelope).is_ok());
    }
});
