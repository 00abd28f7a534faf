use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Canonical provider identifiers used in routing, config and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderId {
    OecdSdmx,
    OecdCsv,
    Dbnomics,
    TcmbHtml,
}

impl ProviderId {
    /// Default priority order.
    pub const ALL: [Self; 4] = [Self::OecdSdmx, Self::OecdCsv, Self::Dbnomics, Self::TcmbHtml];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OecdSdmx => "oecd-sdmx",
            Self::OecdCsv => "oecd-csv",
            Self::Dbnomics => "dbnomics",
            Self::TcmbHtml => "tcmb-html",
        }
    }

    /// Parses a comma-separated priority list, dropping duplicates.
    pub fn parse_list(value: &str) -> Result<Vec<Self>, ValidationError> {
        let mut providers = Vec::new();
        for name in value.split(',').map(str::trim).filter(|name| !name.is_empty()) {
            let provider = name.parse::<Self>()?;
            if !providers.contains(&provider) {
                providers.push(provider);
            }
        }

        if providers.is_empty() {
            return Err(ValidationError::EmptySourceList);
        }
        Ok(providers)
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "oecd-sdmx" | "oecd" => Ok(Self::OecdSdmx),
            "oecd-csv" => Ok(Self::OecdCsv),
            "dbnomics" => Ok(Self::Dbnomics),
            "tcmb-html" | "tcmb" => Ok(Self::TcmbHtml),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for provider in ProviderId::ALL {
            assert_eq!(provider.as_str().parse::<ProviderId>(), Ok(provider));
        }
    }

    #[test]
    fn list_keeps_first_occurrence_order() {
        let providers = ProviderId::parse_list(" dbnomics, oecd_sdmx ,dbnomics,").expect("valid list");
        assert_eq!(providers, vec![ProviderId::Dbnomics, ProviderId::OecdSdmx]);
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(
            ProviderId::parse_list("oecd-sdmx,imf"),
            Err(ValidationError::InvalidSource {
                value: "imf".to_owned()
            })
        );
        assert_eq!(ProviderId::parse_list(" , "), Err(ValidationError::EmptySourceList));
    }
}
