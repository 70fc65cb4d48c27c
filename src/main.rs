// This binary crate is intentionally minimal.
// All engine logic lives in the library (src/lib.rs and its modules).
// Run demos with:
//   cargo run --example synthetic
fn main() {
    println!("graphite-nn: a from-scratch handwritten-digit classifier in Rust.");
    println!("Run `cargo run --example synthetic` to train on generated digits,");
    println!("or `cargo run --bin studio` for the browser studio.");
}
