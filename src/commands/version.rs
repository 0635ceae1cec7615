//! Command: print version information.

/// Print the fa-release version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("fa-release {}", super::version());
}
