/// graphite-nn Studio
///
/// A browser-based front end for training and testing the digit classifier.
/// Served by a synchronous tiny_http server; no JavaScript frameworks.
///
/// Run with:
///   cargo run --bin studio --release
/// Then open http://127.0.0.1:7878
///
/// Tabs:
///   1. Dataset — generate synthetic digits or upload MNIST IDX files
///   2. Train   — pick hyperparameters, train with a live SSE accuracy chart
///   3. Test    — upload a digit image and see per-class confidence

mod state;
mod render;
mod routes;
mod handlers;
mod util;

use std::sync::{Arc, Mutex};
use tiny_http::Server;

use state::StudioState;

fn main() {
    let addr = "127.0.0.1:7878";
    let server = Server::http(addr).expect("Failed to bind HTTP server");

    let shared_state = Arc::new(Mutex::new(StudioState::new()));

    println!("graphite-nn studio");
    println!("  open http://{} in your browser", addr);
    println!("  tabs: Dataset > Train > Test");

    // Ensure trained_models/ directory exists.
    let _ = std::fs::create_dir_all("trained_models");

    // Each request is dispatched on its own thread so the SSE handler
    // (which blocks for the entire training duration) does not stall
    // regular page loads and form submissions.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }
}
