// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! libvirt CLI integration: list running domains via `virsh list`.

use anyhow::{Context, Result};
use tracing::debug;

use super::types::Target;
use crate::runner::{shell_quote, CommandRunner};

/// Lines before the first domain row: column titles and the dashed rule
const HEADER_LINES: usize = 2;

/// Field holding the domain name in the default `Id Name State` layout
const DEFAULT_NAME_FIELD: usize = 1;

/// Build the discovery command line
pub fn list_command(virsh: &str, connect: Option<&str>) -> String {
    match connect {
        Some(uri) => format!("{} --connect {} list", virsh, shell_quote(uri)),
        None => format!("{} list", virsh),
    }
}

/// Run the discovery command and parse the running domains.
///
/// Only stdout carries the table; virsh warnings on stderr are logged.
pub async fn list_running(runner: &dyn CommandRunner, command: &str) -> Result<Vec<Target>> {
    let output = runner
        .run(command)
        .await
        .context("Failed to list running virtual machines")?;

    if !output.stderr.trim().is_empty() {
        debug!(stderr = output.stderr.trim(), "virsh wrote to stderr");
    }

    let targets = parse_list_output(&output.stdout);
    debug!(count = targets.len(), "discovered running virtual machines");
    Ok(targets)
}

/// Parse `virsh list` output.
///
/// The first two lines are the header. If the title line has a `Name`
/// column that column is used, otherwise the second field.
fn parse_list_output(output: &str) -> Vec<Target> {
    let name_field = output
        .lines()
        .next()
        .and_then(|title| {
            title
                .split_whitespace()
                .position(|column| column.eq_ignore_ascii_case("name"))
        })
        .unwrap_or(DEFAULT_NAME_FIELD);

    output
        .lines()
        .skip(HEADER_LINES)
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| l.split_whitespace().nth(name_field))
        .map(Target::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::fake::{FakeResponse, FakeRunner};
    use crate::runner::ShellRunner;

    const VIRSH_LIST: &str = " Id    Name                           State\n\
                              ----------------------------------------------------\n\
                              \x20 3     vm-1                           running\n\
                              \x20 4     vm-2                           running\n\
                              \n";

    #[test]
    fn test_list_command() {
        assert_eq!(list_command("virsh", None), "virsh list");
        assert_eq!(
            list_command("virsh", Some("qemu:///system")),
            "virsh --connect qemu:///system list"
        );
    }

    #[test]
    fn test_parse_virsh_layout() {
        let targets = parse_list_output(VIRSH_LIST);
        assert_eq!(targets, vec![Target::new("vm-1"), Target::new("vm-2")]);
    }

    #[test]
    fn test_parse_name_first_layout() {
        let targets = parse_list_output("Name State\n----\nweb1 running\nweb2 running\n");
        assert_eq!(targets, vec![Target::new("web1"), Target::new("web2")]);
    }

    #[test]
    fn test_parse_untitled_uses_second_field() {
        let targets = parse_list_output("\n\n7 db running\n");
        assert_eq!(targets, vec![Target::new("db")]);
    }

    #[test]
    fn test_parse_header_only() {
        assert!(parse_list_output(" Id    Name    State\n----------------\n\n").is_empty());
        assert!(parse_list_output("").is_empty());
    }

    #[test]
    fn test_parse_skips_short_lines() {
        let targets = parse_list_output(" Id Name State\n---\n 5\n 6 vm-6 running\n");
        assert_eq!(targets, vec![Target::new("vm-6")]);
    }

    #[tokio::test]
    async fn test_list_running_propagates_failure() {
        let runner = FakeRunner::new().on("list", FakeResponse::exit(1, "failed to connect to the hypervisor"));
        let err = list_running(&runner, "virsh list").await.unwrap_err();
        assert!(err.to_string().contains("Failed to list running virtual machines"));
    }

    #[tokio::test]
    async fn test_list_running_ignores_stderr() {
        let runner = FakeRunner::new().on(
            "list",
            FakeResponse::output_with_stderr(
                " Id Name State\n----\n 1 vm1 running\n\n",
                "warning: libvirt deprecated option\n",
            ),
        );
        let targets = list_running(&runner, "virsh list").await.unwrap();
        assert_eq!(targets, vec![Target::new("vm1")]);
    }

    #[tokio::test]
    async fn test_list_running_through_shell_ignores_stderr() {
        let command = "printf ' Id Name State\\n----\\n 1 vm1 running\\n\\n'; \
                       echo 'warning: libvirt deprecated option' >&2";
        let targets = list_running(&ShellRunner::new(), command).await.unwrap();
        assert_eq!(targets, vec![Target::new("vm1")]);
    }

    #[tokio::test]
    async fn test_list_running() {
        let runner = FakeRunner::new().on("list", FakeResponse::output(VIRSH_LIST));
        let targets = list_running(&runner, "virsh list").await.unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(runner.calls(), vec!["virsh list".to_string()]);
    }
}
