pub mod check;
pub mod preview;
pub mod send;
