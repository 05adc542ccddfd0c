//! Inventory resolution via the `ansible-inventory` CLI
//!
//! Inventory source parsing, variable precedence and limit matching all stay
//! with the engine; this module only consumes its normalized `--list` JSON
//! export and derives per-host group memberships from the group topology.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::error::ResolverError;
use crate::runner::CommandRunner;
use crate::traits::InventoryResolver;
use crate::types::{ResolvedHost, ResolvedInventory};

/// Variable carrying the registry key for a host
pub const INVENTORY_HOSTNAME: &str = "inventory_hostname";

/// Variable carrying a host's group memberships
pub const GROUP_NAMES: &str = "group_names";

/// Inventory resolver backed by the `ansible-inventory` CLI
///
/// Runs the engine once per operation and parses its JSON export.
pub struct AnsibleCliResolver {
    /// Runner used to invoke the engine
    runner: Arc<dyn CommandRunner>,
    /// Inventory source files or directories
    sources: Vec<PathBuf>,
    /// Engine invocation timeout
    timeout: Duration,
}

impl AnsibleCliResolver {
    /// Create a new resolver over the given inventory sources
    pub fn new(runner: Arc<dyn CommandRunner>, sources: Vec<PathBuf>) -> Self {
        Self {
            runner,
            sources,
            timeout: Duration::from_secs(60),
        }
    }

    /// Set engine invocation timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check if the engine CLI is available
    #[instrument(skip(self))]
    pub async fn is_available(&self) -> bool {
        let result = self.runner.run("which ansible-inventory").await;
        result.map(|r| r.success()).unwrap_or(false)
    }

    /// Build the engine command line
    fn build_command(&self, limit: Option<&str>) -> String {
        use std::fmt::Write;

        let mut cmd = String::from("ansible-inventory");
        for source in &self.sources {
            let escaped = shell_escape(&source.display().to_string());
            let _ = write!(cmd, " -i '{escaped}'");
        }
        if let Some(limit) = limit {
            let escaped = shell_escape(limit);
            let _ = write!(cmd, " --limit '{escaped}'");
        }
        cmd.push_str(" --list");
        cmd
    }

    /// Run the engine and parse its JSON export
    ///
    /// # Errors
    /// Returns an error if the engine is missing, exits nonzero, or emits
    /// output that is not a JSON object.
    #[instrument(skip(self))]
    async fn export(&self, limit: Option<&str>) -> Result<Map<String, Value>, ResolverError> {
        if !self.is_available().await {
            return Err(ResolverError::EngineNotFound(
                "ansible-inventory not found on PATH".to_string(),
            ));
        }

        let cmd = self.build_command(limit);
        let result = self.runner.run_with_timeout(&cmd, self.timeout).await?;

        if !result.success() {
            return Err(ResolverError::ResolutionFailed(result.stderr));
        }

        let json: Value = serde_json::from_str(&result.stdout)
            .map_err(|e| ResolverError::ParseError(e.to_string()))?;

        match json {
            Value::Object(map) => Ok(map),
            _ => Err(ResolverError::ParseError(
                "expected a JSON object at the top level".to_string(),
            )),
        }
    }
}

#[async_trait]
impl InventoryResolver for AnsibleCliResolver {
    #[instrument(skip(self))]
    async fn resolve(&self) -> Result<ResolvedInventory, ResolverError> {
        debug!(sources = self.sources.len(), "resolving inventory");

        let export = self.export(None).await?;
        let hostvars = meta_hostvars(&export);
        let topology = GroupTopology::from_export(&export);
        let group_names = topology.group_names();

        // Hosts can appear in the group topology, under _meta.hostvars, or both.
        let mut names: BTreeSet<String> = group_names.keys().cloned().collect();
        names.extend(hostvars.keys().cloned());
        names.extend(topology.member_hosts("all"));

        let mut inventory = ResolvedInventory::new();
        for name in names {
            let groups = group_names.get(&name).cloned().unwrap_or_default();

            let mut vars = hostvars
                .get(&name)
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            vars.insert(
                INVENTORY_HOSTNAME.to_string(),
                Value::String(name.clone()),
            );
            vars.insert(
                GROUP_NAMES.to_string(),
                Value::Array(groups.iter().cloned().map(Value::String).collect()),
            );

            inventory.hosts.insert(name, ResolvedHost { groups, vars });
        }

        debug!(hosts = inventory.hosts.len(), "inventory resolved");

        Ok(inventory)
    }

    #[instrument(skip(self, hosts))]
    async fn apply_limit(
        &self,
        limit: &str,
        hosts: &HashSet<String>,
    ) -> Result<HashSet<String>, ResolverError> {
        debug!(limit = %limit, "expanding limit expression");

        let export = match self.export(Some(limit)).await {
            Ok(export) => export,
            // The engine reports a limit matching nothing as a failure; for
            // filtering purposes that is simply the empty set.
            Err(ResolverError::ResolutionFailed(stderr))
                if stderr.contains("does not match any hosts") =>
            {
                return Ok(HashSet::new());
            }
            Err(e) => return Err(e),
        };

        let topology = GroupTopology::from_export(&export);
        let mut selected: HashSet<String> = topology.group_names().into_keys().collect();
        selected.extend(topology.member_hosts("all"));
        selected.extend(meta_hostvars(&export).keys().cloned());

        let limited: HashSet<String> = hosts.intersection(&selected).cloned().collect();

        debug!(selected = limited.len(), "limit expanded");

        Ok(limited)
    }
}

/// The `_meta.hostvars` object from an export, empty when absent
fn meta_hostvars(export: &Map<String, Value>) -> Map<String, Value> {
    export
        .get("_meta")
        .and_then(|m| m.get("hostvars"))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// Escape single quotes for embedding in a single-quoted shell argument
fn shell_escape(s: &str) -> String {
    s.replace('\'', "'\"'\"'")
}

/// Direct group topology extracted from an engine export
///
/// Every top-level key except `_meta` is a group with optional `hosts` and
/// `children` arrays.
#[derive(Debug, Default)]
struct GroupTopology {
    /// group -> directly listed hosts
    hosts: HashMap<String, Vec<String>>,
    /// group -> child groups
    children: HashMap<String, Vec<String>>,
}

impl GroupTopology {
    fn from_export(export: &Map<String, Value>) -> Self {
        let mut topology = GroupTopology::default();

        for (group, body) in export {
            if group == "_meta" {
                continue;
            }
            let Some(body) = body.as_object() else {
                continue;
            };
            topology
                .hosts
                .insert(group.clone(), string_array(body.get("hosts")));
            topology
                .children
                .insert(group.clone(), string_array(body.get("children")));
        }

        topology
    }

    /// All hosts reachable from `group` through child groups, cycle-safe
    fn member_hosts(&self, group: &str) -> BTreeSet<String> {
        let mut members = BTreeSet::new();
        let mut visited = HashSet::new();
        let mut stack = vec![group.to_string()];

        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            if let Some(hosts) = self.hosts.get(&current) {
                members.extend(hosts.iter().cloned());
            }
            if let Some(children) = self.children.get(&current) {
                stack.extend(children.iter().cloned());
            }
        }

        members
    }

    /// Sorted group memberships per host, the implicit `all` excluded
    fn group_names(&self) -> BTreeMap<String, Vec<String>> {
        let mut by_host: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for group in self.hosts.keys() {
            if group == "all" {
                continue;
            }
            for host in self.member_hosts(group) {
                by_host.entry(host).or_default().insert(group.clone());
            }
        }

        by_host
            .into_iter()
            .map(|(host, groups)| (host, groups.into_iter().collect()))
            .collect()
    }
}

fn string_array(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::CommandOutput;

    const FULL_EXPORT: &str = r#"{
        "_meta": {
            "hostvars": {
                "web1": {"http_port": 80},
                "db1": {},
                "stray": {"lonely": true}
            }
        },
        "all": {"children": ["ungrouped", "webservers", "dbservers", "prod"]},
        "webservers": {"hosts": ["web1"]},
        "dbservers": {"hosts": ["db1"]},
        "prod": {"children": ["webservers"]}
    }"#;

    const LIMITED_EXPORT: &str = r#"{
        "_meta": {"hostvars": {"web1": {"http_port": 80}}},
        "all": {"children": ["ungrouped", "webservers"]},
        "webservers": {"hosts": ["web1"]}
    }"#;

    /// Runner that serves canned engine exports
    struct MockRunner {
        list_export: String,
        limit_export: String,
    }

    impl MockRunner {
        fn new(list_export: &str, limit_export: &str) -> Self {
            Self {
                list_export: list_export.to_string(),
                limit_export: limit_export.to_string(),
            }
        }

        fn ok(stdout: String) -> CommandOutput {
            CommandOutput {
                status: 0,
                stdout,
                stderr: String::new(),
                duration: Duration::from_millis(1),
            }
        }
    }

    #[async_trait]
    impl CommandRunner for MockRunner {
        async fn run(&self, cmd: &str) -> Result<CommandOutput, ResolverError> {
            if cmd.starts_with("which") {
                return Ok(Self::ok("/usr/bin/ansible-inventory".to_string()));
            }
            if cmd.contains("--limit") {
                return Ok(Self::ok(self.limit_export.clone()));
            }
            Ok(Self::ok(self.list_export.clone()))
        }

        async fn run_with_timeout(
            &self,
            cmd: &str,
            _timeout: Duration,
        ) -> Result<CommandOutput, ResolverError> {
            self.run(cmd).await
        }

        fn runner_type(&self) -> &'static str {
            "mock"
        }
    }

    /// Runner on a system without the engine installed
    struct MissingEngineRunner;

    #[async_trait]
    impl CommandRunner for MissingEngineRunner {
        async fn run(&self, _cmd: &str) -> Result<CommandOutput, ResolverError> {
            Ok(CommandOutput {
                status: 1,
                stdout: String::new(),
                stderr: String::new(),
                duration: Duration::from_millis(1),
            })
        }

        async fn run_with_timeout(
            &self,
            cmd: &str,
            _timeout: Duration,
        ) -> Result<CommandOutput, ResolverError> {
            self.run(cmd).await
        }

        fn runner_type(&self) -> &'static str {
            "mock"
        }
    }

    /// Runner where the engine itself fails
    struct FailingEngineRunner;

    #[async_trait]
    impl CommandRunner for FailingEngineRunner {
        async fn run(&self, cmd: &str) -> Result<CommandOutput, ResolverError> {
            if cmd.starts_with("which") {
                return Ok(CommandOutput {
                    status: 0,
                    stdout: "/usr/bin/ansible-inventory".to_string(),
                    stderr: String::new(),
                    duration: Duration::from_millis(1),
                });
            }
            Ok(CommandOutput {
                status: 1,
                stdout: String::new(),
                stderr: "Unable to parse /etc/missing/hosts".to_string(),
                duration: Duration::from_millis(1),
            })
        }

        async fn run_with_timeout(
            &self,
            cmd: &str,
            _timeout: Duration,
        ) -> Result<CommandOutput, ResolverError> {
            self.run(cmd).await
        }

        fn runner_type(&self) -> &'static str {
            "mock"
        }
    }

    fn resolver(runner: impl CommandRunner + 'static) -> AnsibleCliResolver {
        AnsibleCliResolver::new(Arc::new(runner), vec![PathBuf::from("hosts.ini")])
    }

    #[tokio::test]
    async fn test_resolve_groups_and_vars() {
        let resolver = resolver(MockRunner::new(FULL_EXPORT, LIMITED_EXPORT));
        let inventory = resolver.resolve().await.unwrap();

        let web1 = &inventory.hosts["web1"];
        assert_eq!(web1.groups, vec!["prod", "webservers"]);
        assert_eq!(web1.vars["http_port"], 80);
        assert_eq!(web1.vars[INVENTORY_HOSTNAME], "web1");
        assert_eq!(
            web1.vars[GROUP_NAMES],
            serde_json::json!(["prod", "webservers"])
        );

        let db1 = &inventory.hosts["db1"];
        assert_eq!(db1.groups, vec!["dbservers"]);
    }

    #[tokio::test]
    async fn test_resolve_includes_meta_only_hosts() {
        let resolver = resolver(MockRunner::new(FULL_EXPORT, LIMITED_EXPORT));
        let inventory = resolver.resolve().await.unwrap();

        let stray = &inventory.hosts["stray"];
        assert!(stray.groups.is_empty());
        assert_eq!(stray.vars[INVENTORY_HOSTNAME], "stray");
        assert_eq!(stray.vars["lonely"], true);
    }

    #[tokio::test]
    async fn test_apply_limit_intersects_known_hosts() {
        let resolver = resolver(MockRunner::new(FULL_EXPORT, LIMITED_EXPORT));

        let known: HashSet<String> = ["web1", "db1"].iter().map(|s| s.to_string()).collect();
        let limited = resolver.apply_limit("web*", &known).await.unwrap();

        assert_eq!(limited.len(), 1);
        assert!(limited.contains("web1"));
    }

    #[tokio::test]
    async fn test_missing_engine() {
        let resolver = resolver(MissingEngineRunner);
        let result = resolver.resolve().await;

        assert!(matches!(result, Err(ResolverError::EngineNotFound(_))));
    }

    #[tokio::test]
    async fn test_engine_failure() {
        let resolver = resolver(FailingEngineRunner);
        let result = resolver.resolve().await;

        match result {
            Err(ResolverError::ResolutionFailed(stderr)) => {
                assert!(stderr.contains("Unable to parse"));
            }
            other => panic!("expected ResolutionFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_build_command_escapes_quotes() {
        let resolver = AnsibleCliResolver::new(
            Arc::new(MissingEngineRunner),
            vec![PathBuf::from("inv'entory.ini")],
        );

        let cmd = resolver.build_command(Some("web's"));
        assert!(cmd.starts_with("ansible-inventory"));
        assert!(cmd.ends_with("--list"));
        // Single quotes must not break out of the quoted argument
        assert!(cmd.contains(r#"inv'"'"'entory.ini"#));
        assert!(cmd.contains(r#"web'"'"'s"#));
    }

    #[test]
    fn test_topology_survives_group_cycles() {
        let export: Map<String, Value> = serde_json::from_str(
            r#"{
                "a": {"hosts": ["h1"], "children": ["b"]},
                "b": {"children": ["a"]}
            }"#,
        )
        .unwrap();

        let topology = GroupTopology::from_export(&export);
        let names = topology.group_names();

        assert_eq!(names["h1"], vec!["a", "b"]);
    }
}
