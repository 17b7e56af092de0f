//! # Buckland Blocks Entry Point
//!
//! Runs the headless driver. An optional first argument names the config file.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- config.json
//! ```

fn main() {
    buckland_blocks::run();
}
