// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! CPU sampling of running virtual machines.
//!
//! Architecture:
//! - Discovery: `virsh list` on the hypervisor yields the running guests
//! - Fan-out: one task per guest runs `top` over ssh and prints one line
//! - Fan-in: every task is awaited before the run returns

pub mod fanout;
pub mod load;
pub mod remote;

pub use fanout::{RunSummary, Sampler, SamplerConfig};
