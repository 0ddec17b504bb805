//! # House Demo
//!
//! Loads the diorama model and runs the day/night loop. Drag the sun angle
//! slider from -PI to PI to walk the scene through a full day; the bloom
//! section controls the glow around the sun disc.
//!
//! ## Usage
//! ```bash
//! cargo run --example house
//! ```

use anyhow::Result;

fn main() -> Result<()> {
    env_logger::init();

    let mut app = homestead::default();
    app.load_model("demos/house/house.obj");
    app.run();

    Ok(())
}
