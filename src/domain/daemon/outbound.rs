/// A public port for showing the timer's title, e.g. next to a tray icon or
/// in a status bar. Calls are expected to return quickly and never fail.
#[cfg_attr(test, mockall::automock)]
pub trait DisplayPort: Send + Sync + 'static {
    /// Show `text` as the title.
    fn set_title(&self, text: &str);

    /// Remove the title.
    fn clear_title(&self);
}
