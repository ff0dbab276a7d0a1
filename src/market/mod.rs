pub mod rng;
pub mod synth;
pub mod universe;
