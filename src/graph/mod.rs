//! Waardemodel en metadata aan de rand van de engine.

pub mod meta;
pub mod value;
