// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Remote sampling command for one target.

use crate::hypervisor::Target;
use crate::runner::shell_quote;

/// CPU snapshot on the guest: the second `top` iteration's `Cpu(s):` line,
/// reduced to its numbers separated by spaces.
pub const DEFAULT_PIPELINE: &str =
    "top -b -n 2 | grep 'Cpu(s):' | sed 's/[^0-9.,]*//g' | sed 's/,/ /g' | tail -n 1";

/// Non-interactive session: no host key prompt, no banner noise
const SSH_OPTIONS: [&str; 4] = ["-o", "LogLevel=quiet", "-o", "StrictHostKeyChecking=no"];

/// Build the ssh command line that runs `pipeline` on `target`
pub fn remote_command(ssh: &str, user: Option<&str>, target: &Target, pipeline: &str) -> String {
    let host = match user {
        Some(user) => format!("{}@{}", user, target.name),
        None => target.name.clone(),
    };

    format!(
        "{} {} {} {}",
        ssh,
        SSH_OPTIONS.join(" "),
        shell_quote(&host),
        shell_quote(pipeline)
    )
}
