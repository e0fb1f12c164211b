//! Supported sentence types and the allow/exclude filter.

use std::fmt;

use crate::config::ConfigError;

/// A sentence the encoder knows how to build.
///
/// Wind has two variants because MWV is sent twice per tick, once with the
/// true-wind reference and once with the apparent reference. Both share the
/// name `MWV` for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentenceKind {
    Rmc,
    Gga,
    Vtg,
    Zda,
    Hdt,
    Hdm,
    Hdg,
    Vhw,
    Dbt,
    MwvTrue,
    MwvRelative,
    Mwd,
    Xte,
    Rmb,
    Rsa,
}

impl SentenceKind {
    /// Every kind, in the order they are emitted within a tick.
    pub const ALL: [SentenceKind; 15] = [
        SentenceKind::Rmc,
        SentenceKind::Gga,
        SentenceKind::Vtg,
        SentenceKind::Zda,
        SentenceKind::Hdt,
        SentenceKind::Hdm,
        SentenceKind::Hdg,
        SentenceKind::Vhw,
        SentenceKind::Dbt,
        SentenceKind::MwvTrue,
        SentenceKind::MwvRelative,
        SentenceKind::Mwd,
        SentenceKind::Xte,
        SentenceKind::Rmb,
        SentenceKind::Rsa,
    ];

    /// Three-letter sentence formatter.
    pub fn name(&self) -> &'static str {
        match self {
            SentenceKind::Rmc => "RMC",
            SentenceKind::Gga => "GGA",
            SentenceKind::Vtg => "VTG",
            SentenceKind::Zda => "ZDA",
            SentenceKind::Hdt => "HDT",
            SentenceKind::Hdm => "HDM",
            SentenceKind::Hdg => "HDG",
            SentenceKind::Vhw => "VHW",
            SentenceKind::Dbt => "DBT",
            SentenceKind::MwvTrue | SentenceKind::MwvRelative => "MWV",
            SentenceKind::Mwd => "MWD",
            SentenceKind::Xte => "XTE",
            SentenceKind::Rmb => "RMB",
            SentenceKind::Rsa => "RSA",
        }
    }

    /// True if `name` (case-insensitive) is a known formatter.
    pub fn is_known_name(name: &str) -> bool {
        Self::ALL
            .iter()
            .any(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for SentenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentenceKind::MwvTrue => write!(f, "MWV(T)"),
            SentenceKind::MwvRelative => write!(f, "MWV(R)"),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Which sentence kinds are emitted.
///
/// With no include list every kind is enabled; the exclude list is then
/// applied. Unknown names are rejected when the filter is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceFilter {
    enabled: Vec<SentenceKind>,
}

impl Default for SentenceFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl SentenceFilter {
    /// Every supported kind.
    pub fn all() -> Self {
        Self {
            enabled: SentenceKind::ALL.to_vec(),
        }
    }

    /// Build from include/exclude name lists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownSentence`] for any name that is not a
    /// supported formatter.
    pub fn new<S: AsRef<str>>(include: Option<&[S]>, exclude: &[S]) -> Result<Self, ConfigError> {
        let check = |names: &[S]| -> Result<Vec<String>, ConfigError> {
            names
                .iter()
                .map(|n| {
                    let name = n.as_ref().trim().to_ascii_uppercase();
                    if SentenceKind::is_known_name(&name) {
                        Ok(name)
                    } else {
                        Err(ConfigError::UnknownSentence(n.as_ref().to_string()))
                    }
                })
                .collect()
        };

        let include = include.map(check).transpose()?;
        let exclude = check(exclude)?;

        let enabled = SentenceKind::ALL
            .into_iter()
            .filter(|kind| {
                include
                    .as_ref()
                    .map_or(true, |names| names.iter().any(|n| n == kind.name()))
            })
            .filter(|kind| !exclude.iter().any(|n| n == kind.name()))
            .collect();

        Ok(Self { enabled })
    }

    /// Enabled kinds in emission order.
    pub fn enabled(&self) -> &[SentenceKind] {
        &self.enabled
    }

    pub fn allows(&self, kind: SentenceKind) -> bool {
        self.enabled.contains(&kind)
    }
}
