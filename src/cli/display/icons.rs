//! Status icons for CLI output

/// Status icons for different states
pub struct StatusIcon;

impl StatusIcon {
    /// Success icon (cluster has running nodes)
    pub const SUCCESS: &'static str = "✓";

    /// Warning icon (cluster is partially up)
    pub const WARNING: &'static str = "⚠";

    /// Error icon (cluster has no nodes)
    pub const ERROR: &'static str = "✗";

    /// Unknown icon
    pub const UNKNOWN: &'static str = "?";

    /// Get status icon based on node count
    pub fn get_node_icon(nodes: usize) -> &'static str {
        if nodes == 0 {
            Self::ERROR
        } else {
            Self::SUCCESS
        }
    }

    /// Get status text based on node count
    pub fn get_status_text(nodes: usize) -> &'static str {
        if nodes == 0 {
            "Down"
        } else {
            "Running"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_node_icon() {
        assert_eq!(StatusIcon::get_node_icon(3), StatusIcon::SUCCESS);
        assert_eq!(StatusIcon::get_node_icon(0), StatusIcon::ERROR);
    }

    #[test]
    fn test_get_status_text() {
        assert_eq!(StatusIcon::get_status_text(3), "Running");
        assert_eq!(StatusIcon::get_status_text(0), "Down");
    }
}
