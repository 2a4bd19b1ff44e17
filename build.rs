// build.rs

fn main() {
    // --- Pick the native readiness mechanism ---
    // poll(2) is the default. The `select` feature forces the select(2) path.
    println!("cargo:rustc-check-cfg=cfg(readypoll_select)");
    println!("cargo:rerun-if-changed=build.rs");

    if std::env::var_os("CARGO_FEATURE_SELECT").is_some() {
        println!("cargo:rustc-cfg=readypoll_select");
        eprintln!("readypoll: using select(2) wait strategy (feature `select` enabled)");
    }
}
