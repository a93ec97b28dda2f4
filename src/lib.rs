//! Terminal wedding invitation: the invitation page, a photo gallery with a
//! full-screen carousel, share and copy helpers, map deep links and a
//! background music toggle.

pub mod app;
pub mod assets;
pub mod audio;
pub mod calendar;
pub mod carousel;
pub mod config;
pub mod imaging;
pub mod invitation;
pub mod launcher;
pub mod logging;
pub mod maps;
pub mod share;
pub mod ui;
