/// Decides whether a warning/error line fails the run.
#[derive(Debug, Clone, Default)]
pub struct SeverityFilter {
    allow_list: Vec<String>,
}

impl SeverityFilter {
    pub fn new(allow_list: Vec<String>) -> Self {
        Self { allow_list }
    }

    /// Lines from an allow-listed source never fail the run.
    pub fn is_failure(&self, line: &str) -> bool {
        !self
            .allow_list
            .iter()
            .any(|source| line.contains(source.as_str()))
    }
}
