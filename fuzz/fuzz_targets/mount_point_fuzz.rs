#![no_main]
use libfuzzer_sys::fuzz_target;
use std::path::Path;
use vaultmount::modules::drive_letters::{drive_letter_path, is_drive_letter};
use vaultmount::modules::parent::hideaway_path;

fuzz_target!(|data: &[u8]| {
    if let Ok(path_str) = std::str::from_utf8(data) {
        let path = Path::new(path_str);

        if is_drive_letter(path) {
            let letter = path_str.chars().next().unwrap();
            assert_eq!(drive_letter_path(letter), path);
        }

        if let Some(hideaway) = hideaway_path(path) {
            assert_eq!(hideaway.parent(), path.parent());
            assert_ne!(hideaway.as_path(), path);
        }
    }
});
