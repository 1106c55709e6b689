// Build script for minislotctl - embeds version at compile time

fn main() {
    // Release builds may override the Cargo.toml version
    let version = std::env::var("MINISLOT_VERSION")
        .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=MINISLOT_VERSION={}", version);

    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-env-changed=MINISLOT_VERSION");
}
