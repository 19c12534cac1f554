#![no_main]
use libfuzzer_sys::fuzz_target;
use std::path::{Component, Path};
use vaultmount::Config;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        if let Ok(config) = serde_json::from_str::<Config>(content) {
            for vault in &config.vaults {
                // mount names must stay a single normal path component
                let name = vault.mount_name();
                let mut components = Path::new(&name).components();
                assert!(matches!(components.next(), Some(Component::Normal(_))));
                assert!(components.next().is_none());

                if let Some(flags) = vault.custom_mount_flags() {
                    assert!(!flags.trim().is_empty());
                }
            }
        }
    }
});
