// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Interpretation of a sampled `Cpu(s):` line.
//!
//! With the default pipeline a sample looks like `1.2 0.5 0.0 98.1 0.0 0.0 0.2 0.0`,
//! i.e. the `top` percentages in order: us, sy, ni, id, wa, hi, si, st.
//! Older `top` builds print fewer fields, so only the first two and the last
//! one are relied upon.

/// Numeric fields of one CPU sample
#[derive(Debug, Clone, PartialEq)]
pub struct CpuReadings {
    values: Vec<f64>,
}

impl CpuReadings {
    /// Parse a sample. Returns `None` unless every field is a number and
    /// there are at least three of them.
    pub fn parse(sample: &str) -> Option<Self> {
        let values = sample
            .split_whitespace()
            .map(|field| field.parse::<f64>().ok())
            .collect::<Option<Vec<_>>>()?;

        if values.len() < 3 {
            return None;
        }
        Some(Self { values })
    }

    pub fn user(&self) -> f64 {
        self.values[0]
    }

    pub fn system(&self) -> f64 {
        self.values[1]
    }

    /// Last field (steal time with a current `top`)
    pub fn last(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Load attributed to the guest: user + system + last field
    pub fn total_load(&self) -> f64 {
        self.user() + self.system() + self.last()
    }
}
