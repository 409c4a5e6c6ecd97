// GUI module for PITERM-RS using Qt
// Provides the desktop terminal window

pub mod qt_gui;

pub use qt_gui::run_qt_app;
