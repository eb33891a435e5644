use std::env;

fn main() {
    // Host builds (tests, the simulator) never link the firmware binary
    if env::var_os("CARGO_FEATURE_FIRMWARE").is_none() {
        return;
    }

    // memory.x comes from embassy-stm32's `memory-x` feature
    println!("cargo:rustc-link-arg-bins=--nmagic");

    // Main linker script, uses the memory layout from above
    println!("cargo:rustc-link-arg-bins=-Tlink.x");

    // defmt is always on for the firmware binary
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}
