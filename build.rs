// Build script for the Qt GUI
// Compiles the C++ snippets embedded in the gui module

fn main() {
    // Only build Qt components when GUI feature is enabled
    #[cfg(feature = "gui")]
    {
        let mut config = cpp_build::Config::new();

        // Distro Qt installs keep headers outside the default search path
        if let Ok(include) = std::env::var("QT_INCLUDE_PATH") {
            config.include(include);
        }

        config.build("src/gui/qt_gui.rs");
    }
}
