//! Table rendering for CLI output

use super::{ColorTheme, StatusIcon};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};

/// Cluster information for list display
#[derive(Debug, Clone)]
pub struct ClusterInfo {
    pub name: String,
    pub nodes: usize,
    pub kubeconfig: String,
}

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// Render the fleet as a formatted table
    pub fn render_clusters_list(&self, clusters: &[ClusterInfo]) -> String {
        if clusters.is_empty() {
            return "No kind clusters found".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("CLUSTER").set_alignment(CellAlignment::Left),
                Cell::new("NODES").set_alignment(CellAlignment::Center),
                Cell::new("STATUS").set_alignment(CellAlignment::Center),
                Cell::new("KUBECONFIG").set_alignment(CellAlignment::Left),
            ]);

        for cluster in clusters {
            let icon = StatusIcon::get_node_icon(cluster.nodes);
            let status = StatusIcon::get_status_text(cluster.nodes);
            let color = self.theme.get_node_color(cluster.nodes);

            table.add_row(vec![
                Cell::new(&cluster.name),
                Cell::new(cluster.nodes).fg(color),
                Cell::new(format!("{} {}", icon, status)).fg(color),
                Cell::new(&cluster.kubeconfig),
            ]);
        }

        let mut output = String::new();
        output.push_str(&format!(
            "╭─ Kind Clusters {} ─╮\n",
            format!("[{} clusters]", clusters.len()).bright_black()
        ));
        output.push_str(&table.to_string());
        output.push('\n');
        output.push_str(&format!(
            "Legend: {} Running  {} Down\n",
            StatusIcon::SUCCESS.green(),
            StatusIcon::ERROR.red()
        ));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty_clusters() {
        let renderer = TableRenderer::new();
        let output = renderer.render_clusters_list(&[]);
        assert!(output.contains("No kind clusters found"));
    }

    #[test]
    fn test_render_single_cluster() {
        let renderer = TableRenderer::new();
        let clusters = vec![ClusterInfo {
            name: "cluster1".to_string(),
            nodes: 3,
            kubeconfig: "/root/.kube/kind-config-cluster1".to_string(),
        }];

        let output = renderer.render_clusters_list(&clusters);
        assert!(output.contains("cluster1"));
        assert!(output.contains("Running"));
        assert!(output.contains("kind-config-cluster1"));
    }
}
