mod pointer;

pub use pointer::{map_to_buffer, GesturePhase, PointerGesture, PointerSample, TouchPoint};
