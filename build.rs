fn main() {
    println!("cargo:rerun-if-env-changed=MAGIQUE_ID");
    println!("cargo:rerun-if-env-changed=MAGIQUE_MODE");

    // Malformed overrides fail the build instead of falling back to defaults.
    if let Ok(raw) = std::env::var("MAGIQUE_ID") {
        if raw.trim().parse::<u8>().is_err() {
            panic!("MAGIQUE_ID={raw:?}: expected a device id in 0..=255");
        }
    }
    if let Ok(raw) = std::env::var("MAGIQUE_MODE") {
        match raw.trim().parse::<u8>() {
            Ok(1..=4) => {}
            _ => panic!(
                "MAGIQUE_MODE={raw:?}: expected 1 (capture), 2 (capture-flag), 3 (source) or 4 (stone)"
            ),
        }
    }

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
