pub mod game;
pub mod games;
pub mod protocol;
pub mod session;
