//! Contextual logging for flow sections
//!
//! A [`LogContext`] is an explicit value carrying a section color and an ordered
//! prefix list (e.g. `[GAE][150056400]`). Contexts are never ambient: callers derive
//! child contexts with [`LogContext::section`] / [`LogContext::recolor`] and pass them
//! down, so a section's tagging can never leak past the call that created it.

/// ANSI color used to tint all log lines of one logical section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionColor {
    Yellow,
    Green,
    Cyan,
    Blue,
}

impl SectionColor {
    fn ansi_code(self) -> &'static str {
        match self {
            SectionColor::Yellow => "33",
            SectionColor::Green => "32",
            SectionColor::Cyan => "36",
            SectionColor::Blue => "34",
        }
    }
}

/// Explicit logging context: optional section color plus ordered prefixes
#[derive(Debug, Clone, Default)]
pub struct LogContext {
    color: Option<SectionColor>,
    prefixes: Vec<String>,
    colors_enabled: bool,
}

impl LogContext {
    /// Create an empty, uncolored context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a colored root context for a named section (e.g. a flow name)
    pub fn root(color: SectionColor, name: impl Into<String>) -> Self {
        LogContext {
            color: Some(color),
            prefixes: vec![name.into()],
            colors_enabled: false,
        }
    }

    /// Enable ANSI color rendering (off by default; log files stay clean)
    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.colors_enabled = enabled;
        self
    }

    /// Derive a child context with one more prefix appended
    pub fn section(&self, prefix: impl Into<String>) -> Self {
        let mut child = self.clone();
        child.prefixes.push(prefix.into());
        child
    }

    /// Derive a child context with a different section color (e.g. yellow for
    /// failure reporting), keeping the prefix chain
    pub fn recolor(&self, color: SectionColor) -> Self {
        let mut child = self.clone();
        child.color = Some(color);
        child
    }

    /// The formatted prefix chain, `[A][B]` style
    pub fn tag(&self) -> String {
        self.prefixes.iter().map(|p| format!("[{p}]")).collect()
    }

    /// Render a message with prefixes and, if enabled, the section color
    pub fn render(&self, msg: &str) -> String {
        let tag = self.tag();
        let line = if tag.is_empty() { msg.to_string() } else { format!("{tag} {msg}") };
        match self.color {
            Some(color) if self.colors_enabled => {
                format!("\x1b[{}m{}\x1b[0m", color.ansi_code(), line)
            }
            _ => line,
        }
    }

    pub fn debug(&self, msg: impl AsRef<str>) {
        log::debug!("{}", self.render(msg.as_ref()));
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        log::info!("{}", self.render(msg.as_ref()));
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        log::warn!("{}", self.render(msg.as_ref()));
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        log::error!("{}", self.render(msg.as_ref()));
    }
}

/// Initialize env_logger with a timestamped format suitable for flow logs.
///
/// Respects `RUST_LOG`; defaults to `debug` for this crate and `warn` elsewhere.
/// Safe to call more than once (subsequent calls are no-ops).
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,pageflow=debug"),
    )
    .format_timestamp_millis()
    .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_composition() {
        let ctx = LogContext::root(SectionColor::Green, "GAE");
        let item_ctx = ctx.section("150056400");
        assert_eq!(item_ctx.tag(), "[GAE][150056400]");
        // parent untouched
        assert_eq!(ctx.tag(), "[GAE]");
    }

    #[test]
    fn test_render_without_colors() {
        let ctx = LogContext::root(SectionColor::Blue, "CRA");
        assert_eq!(ctx.render("login ok"), "[CRA] login ok");
    }

    #[test]
    fn test_render_with_colors() {
        let ctx = LogContext::root(SectionColor::Yellow, "GAE").with_colors(true);
        let line = ctx.render("failed");
        assert!(line.starts_with("\x1b[33m"));
        assert!(line.ends_with("\x1b[0m"));
        assert!(line.contains("[GAE] failed"));
    }

    #[test]
    fn test_recolor_keeps_prefixes() {
        let ctx = LogContext::root(SectionColor::Green, "GAE").section("item-1");
        let failure_ctx = ctx.recolor(SectionColor::Yellow);
        assert_eq!(failure_ctx.tag(), "[GAE][item-1]");
    }

    #[test]
    fn test_empty_context_renders_bare_message() {
        let ctx = LogContext::new();
        assert_eq!(ctx.render("hello"), "hello");
    }
}
