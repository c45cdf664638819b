//! Dependency graph and issue detection over `package.json` manifests.
//!
//! Each manifest becomes a main node linked to one node per declared
//! dependency. Combining several analyses merges dependencies that appear in
//! more than one package into a single shared node and reports version
//! conflicts and known-risky packages across the set.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Packages with a history of supply-chain or vulnerability incidents.
pub const SECURITY_RISKS: &[&str] = &[
    "lodash",
    "minimist",
    "ws",
    "node-ipc",
    "colors",
    "faker",
    "left-pad",
    "event-stream",
    "flatmap-stream",
];

/// Packages that commonly clash when versions drift between projects.
pub const CONFLICT_PRONE: &[&str] = &[
    "react",
    "react-dom",
    "@types/react",
    "typescript",
    "webpack",
    "babel",
    "@babel/core",
    "eslint",
];

const DEFAULT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Main,
    Dependency,
    DevDependency,
    PeerDependency,
    SharedDependency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Security,
    Conflict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyNode {
    pub id: String,
    pub display_name: String,
    pub kind: NodeKind,
    pub version: String,
    pub issues: Vec<IssueKind>,
    /// Packages declaring this node. One entry except for shared nodes.
    pub packages: Vec<String>,
    pub conflict_prone: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyLink {
    pub source: String,
    pub target: String,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyIssue {
    pub kind: IssueKind,
    pub message: String,
    pub packages: Vec<String>,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageAnalysis {
    pub package_name: String,
    pub nodes: Vec<DependencyNode>,
    pub links: Vec<DependencyLink>,
    pub issues: Vec<DependencyIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedAnalysis {
    pub nodes: Vec<DependencyNode>,
    pub links: Vec<DependencyLink>,
    pub issues: Vec<DependencyIssue>,
    pub packages: Vec<PackageAnalysis>,
}

/// A manifest submitted for analysis under a caller-chosen label.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestInput {
    pub name: String,
    pub manifest: Value,
}

fn version_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn security_issue(name: &str, packages: Vec<String>) -> DependencyIssue {
    DependencyIssue {
        kind: IssueKind::Security,
        message: format!("{name} has known security vulnerabilities"),
        packages,
        severity: Severity::High,
    }
}

/// Build the graph of one manifest. Missing sections count as empty.
pub fn analyze_manifest(manifest: &Value, package_name: &str) -> PackageAnalysis {
    let main_id = package_name.to_string();
    let mut nodes = vec![DependencyNode {
        id: main_id.clone(),
        display_name: manifest
            .get("displayName")
            .and_then(Value::as_str)
            .unwrap_or(package_name)
            .to_string(),
        kind: NodeKind::Main,
        version: manifest
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_VERSION)
            .to_string(),
        issues: Vec::new(),
        packages: vec![manifest
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(package_name)
            .to_string()],
        conflict_prone: false,
    }];
    let mut links = Vec::new();

    // Peer dependencies are declared by consumers, not installed, so they are
    // not checked against the risk list.
    let sections = [
        ("dependencies", NodeKind::Dependency, "", true),
        ("devDependencies", NodeKind::DevDependency, ":dev", true),
        ("peerDependencies", NodeKind::PeerDependency, ":peer", false),
    ];
    for (key, kind, suffix, check_security) in sections {
        let Some(entries) = manifest.get(key).and_then(Value::as_object) else {
            continue;
        };
        for (name, version) in entries {
            let mut issues = Vec::new();
            if check_security && SECURITY_RISKS.contains(&name.as_str()) {
                issues.push(IssueKind::Security);
            }
            let id = format!("{package_name}:{name}{suffix}");
            links.push(DependencyLink {
                source: main_id.clone(),
                target: id.clone(),
                kind,
            });
            nodes.push(DependencyNode {
                id,
                display_name: name.clone(),
                kind,
                version: version_text(version),
                issues,
                packages: vec![package_name.to_string()],
                conflict_prone: CONFLICT_PRONE.contains(&name.as_str()),
            });
        }
    }

    let issues = nodes
        .iter()
        .filter(|n| n.issues.contains(&IssueKind::Security))
        .map(|n| security_issue(&n.display_name, vec![package_name.to_string()]))
        .collect();

    PackageAnalysis {
        package_name: package_name.to_string(),
        nodes,
        links,
        issues,
    }
}

/// Merge per-package graphs. Dependencies named in several packages collapse
/// into one `shared:<name>` node; issues are reported once per dependency.
pub fn combine(packages: Vec<PackageAnalysis>) -> CombinedAnalysis {
    let (nodes, links, issues) = merge(&packages);
    CombinedAnalysis {
        nodes,
        links,
        issues,
        packages,
    }
}

fn merge(
    packages: &[PackageAnalysis],
) -> (Vec<DependencyNode>, Vec<DependencyLink>, Vec<DependencyIssue>) {
    let mut nodes = Vec::new();
    let mut links = Vec::new();
    let mut issues = Vec::new();

    let mut main_ids: HashMap<&str, &str> = HashMap::new();
    for analysis in packages {
        if let Some(main) = analysis.nodes.iter().find(|n| n.kind == NodeKind::Main) {
            main_ids.insert(analysis.package_name.as_str(), main.id.as_str());
            nodes.push(main.clone());
        }
    }

    // Group by dependency name, keeping first-seen order.
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<(&str, &DependencyNode)>> = HashMap::new();
    for analysis in packages {
        for node in analysis.nodes.iter().filter(|n| n.kind != NodeKind::Main) {
            let entry = groups.entry(node.display_name.as_str()).or_insert_with(|| {
                order.push(node.display_name.as_str());
                Vec::new()
            });
            entry.push((analysis.package_name.as_str(), node));
        }
    }

    for name in order {
        let group = &groups[name];
        let sources: Vec<String> = group.iter().map(|(p, _)| p.to_string()).collect();

        if let [(source, node)] = group.as_slice() {
            if node.issues.contains(&IssueKind::Security) {
                issues.push(security_issue(name, sources.clone()));
            }
            if let Some(main) = main_ids.get(source) {
                links.push(DependencyLink {
                    source: main.to_string(),
                    target: node.id.clone(),
                    kind: node.kind,
                });
            }
            nodes.push((*node).clone());
            continue;
        }

        let mut versions: Vec<&str> = Vec::new();
        for (_, node) in group {
            if !versions.contains(&node.version.as_str()) {
                versions.push(node.version.as_str());
            }
        }
        let conflict = versions.len() > 1;
        let security = group
            .iter()
            .any(|(_, n)| n.issues.contains(&IssueKind::Security));

        let mut shared_issues = Vec::new();
        if conflict {
            shared_issues.push(IssueKind::Conflict);
            issues.push(DependencyIssue {
                kind: IssueKind::Conflict,
                message: format!(
                    "Version conflict for {name} across packages: {}",
                    versions.join(", ")
                ),
                packages: sources.clone(),
                severity: Severity::Medium,
            });
        }
        if security {
            shared_issues.push(IssueKind::Security);
            issues.push(security_issue(name, sources.clone()));
        }

        let shared_id = format!("shared:{name}");
        for (source, node) in group {
            if let Some(main) = main_ids.get(source) {
                links.push(DependencyLink {
                    source: main.to_string(),
                    target: shared_id.clone(),
                    kind: node.kind,
                });
            }
        }
        nodes.push(DependencyNode {
            id: shared_id,
            display_name: name.to_string(),
            kind: NodeKind::SharedDependency,
            version: versions.join(" / "),
            issues: shared_issues,
            packages: sources,
            conflict_prone: group.iter().any(|(_, n)| n.conflict_prone),
        });
    }

    (nodes, links, issues)
}

/// Analyze each manifest under its label and combine the results.
pub fn analyze_all(inputs: &[ManifestInput]) -> CombinedAnalysis {
    combine(
        inputs
            .iter()
            .map(|input| analyze_manifest(&input.manifest, &input.name))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frontend() -> Value {
        json!({
            "name": "frontend-app",
            "displayName": "Frontend App",
            "version": "1.0.0",
            "dependencies": { "react": "^18.2.0", "lodash": "^4.17.21", "axios": "^1.6.0" },
            "devDependencies": { "typescript": "^5.2.0" }
        })
    }

    fn backend() -> Value {
        json!({
            "name": "backend-api",
            "dependencies": { "express": "^4.18.0", "lodash": "^4.17.21" },
            "devDependencies": { "typescript": "^5.3.0" }
        })
    }

    fn shared_lib() -> Value {
        json!({
            "name": "shared-utils",
            "dependencies": { "zod": "^3.22.0" },
            "peerDependencies": { "react": "^18.0.0", "ws": "^8.0.0" }
        })
    }

    #[test]
    fn single_manifest_builds_nodes_and_links() {
        let analysis = analyze_manifest(&frontend(), "web");

        assert_eq!(analysis.nodes.len(), 5);
        assert_eq!(analysis.links.len(), 4);
        let main = &analysis.nodes[0];
        assert_eq!(main.kind, NodeKind::Main);
        assert_eq!(main.display_name, "Frontend App");
        assert_eq!(main.packages, vec!["frontend-app".to_string()]);

        let ts = analysis.nodes.iter().find(|n| n.id == "web:typescript:dev").unwrap();
        assert_eq!(ts.kind, NodeKind::DevDependency);
        assert!(ts.conflict_prone);
        assert!(analysis.links.iter().all(|l| l.source == "web"));
    }

    #[test]
    fn risky_dependency_is_a_security_issue() {
        let analysis = analyze_manifest(&frontend(), "web");
        assert_eq!(analysis.issues.len(), 1);
        assert_eq!(analysis.issues[0].kind, IssueKind::Security);
        assert_eq!(analysis.issues[0].severity, Severity::High);
        assert!(analysis.issues[0].message.starts_with("lodash"));
    }

    #[test]
    fn peer_dependencies_are_not_risk_checked() {
        let analysis = analyze_manifest(&shared_lib(), "lib");
        let ws = analysis.nodes.iter().find(|n| n.id == "lib:ws:peer").unwrap();
        assert!(ws.issues.is_empty());
        assert!(analysis.issues.is_empty());
    }

    #[test]
    fn empty_manifest_defaults_main_node() {
        let analysis = analyze_manifest(&json!({}), "bare");
        assert_eq!(analysis.nodes.len(), 1);
        assert_eq!(analysis.nodes[0].version, "1.0.0");
        assert_eq!(analysis.nodes[0].display_name, "bare");
        assert!(analysis.links.is_empty());
    }

    #[test]
    fn shared_dependencies_collapse_and_report_conflicts() {
        let combined = combine(vec![
            analyze_manifest(&frontend(), "web"),
            analyze_manifest(&backend(), "api"),
        ]);

        let ts = combined.nodes.iter().find(|n| n.id == "shared:typescript").unwrap();
        assert_eq!(ts.kind, NodeKind::SharedDependency);
        assert_eq!(ts.version, "^5.2.0 / ^5.3.0");
        assert_eq!(ts.issues, vec![IssueKind::Conflict]);
        assert_eq!(ts.packages, vec!["web".to_string(), "api".to_string()]);

        let lodash = combined.nodes.iter().find(|n| n.id == "shared:lodash").unwrap();
        assert_eq!(lodash.issues, vec![IssueKind::Security]);

        let conflicts: Vec<_> = combined
            .issues
            .iter()
            .filter(|i| i.kind == IssueKind::Conflict)
            .collect();
        assert_eq!(conflicts.len(), 1);
        assert!(conflicts[0].message.contains("typescript"));
        assert_eq!(
            combined
                .issues
                .iter()
                .filter(|i| i.kind == IssueKind::Security)
                .count(),
            1
        );
        assert_eq!(
            combined.links.iter().filter(|l| l.target == "shared:lodash").count(),
            2
        );
    }

    #[test]
    fn single_use_dependencies_keep_their_own_node() {
        let combined = combine(vec![
            analyze_manifest(&frontend(), "web"),
            analyze_manifest(&backend(), "api"),
        ]);
        assert!(combined.nodes.iter().any(|n| n.id == "web:axios"));
        assert!(combined.nodes.iter().any(|n| n.id == "api:express"));
        assert!(combined
            .links
            .iter()
            .any(|l| l.source == "api" && l.target == "api:express"));
        assert_eq!(
            combined.nodes.iter().filter(|n| n.kind == NodeKind::Main).count(),
            2
        );
    }

    #[test]
    fn peer_and_regular_use_of_same_name_share_a_node() {
        let combined = analyze_all(&[
            ManifestInput { name: "web".to_string(), manifest: frontend() },
            ManifestInput { name: "lib".to_string(), manifest: shared_lib() },
        ]);
        let react = combined.nodes.iter().find(|n| n.id == "shared:react").unwrap();
        assert!(react.conflict_prone);
        assert_eq!(react.issues, vec![IssueKind::Conflict]);
        let kinds: Vec<_> = combined
            .links
            .iter()
            .filter(|l| l.target == "shared:react")
            .map(|l| l.kind)
            .collect();
        assert_eq!(kinds, vec![NodeKind::Dependency, NodeKind::PeerDependency]);
        assert_eq!(combined.packages.len(), 2);
    }

    #[test]
    fn serializes_kinds_in_kebab_case() {
        let analysis = analyze_manifest(&frontend(), "web");
        let value = serde_json::to_value(&analysis).unwrap();
        assert_eq!(value["nodes"][0]["kind"], "main");
        assert_eq!(value["links"][0]["kind"], "dependency");
        assert_eq!(value["issues"][0]["severity"], "high");
    }
}
