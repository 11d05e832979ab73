use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Nothing to do for the pure-Rust build.
    if env::var_os("CARGO_FEATURE_PYTHON").is_none() {
        return;
    }

    // Print Python version for build diagnostics
    if let Ok(output) = Command::new("python3").args(["--version"]).output() {
        if output.status.success() {
            let version = String::from_utf8_lossy(&output.stdout);
            println!("cargo:warning=Building Python binding with {}", version.trim());
        }
    }

    // An extension module is loaded by the interpreter and must not link
    // libpython itself.
    if env::var_os("CARGO_FEATURE_EXTENSION_MODULE").is_some() {
        return;
    }

    // Embedded builds (and `cargo test --features python`) link libpython;
    // help the linker find it.
    if let Ok(output) = Command::new("python3")
        .args([
            "-c",
            "import sysconfig; print(sysconfig.get_config_var('LIBDIR'))",
        ])
        .output()
    {
        if output.status.success() {
            let libdir = String::from_utf8_lossy(&output.stdout);
            let libdir = libdir.trim();
            if !libdir.is_empty() && libdir != "None" {
                println!("cargo:rustc-link-search=native={libdir}");
            }
        }
    }
}
