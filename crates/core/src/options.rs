use crate::link::{HighestVersion, LatestDeclared, VersionPolicy};
use crate::parser::DEFAULT_MAX_ERRORS;
use serde::{Deserialize, Serialize};

/// How a version-less reference picks among several declared versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionPolicyKind {
    #[default]
    LatestDeclared,
    HighestVersion,
}

impl VersionPolicyKind {
    pub fn policy(self) -> &'static dyn VersionPolicy {
        match self {
            VersionPolicyKind::LatestDeclared => &LatestDeclared,
            VersionPolicyKind::HighestVersion => &HighestVersion,
        }
    }
}

/// Knobs for one compilation. Deserializes from the `[compile]` table of a
/// project file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct CompileOptions {
    pub version_policy: VersionPolicyKind,
    /// Syntax errors collected per document before the parser gives up on it.
    pub max_errors: usize,
    /// Source file extension, without the dot.
    pub extension: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            version_policy: VersionPolicyKind::default(),
            max_errors: DEFAULT_MAX_ERRORS,
            extension: "ec".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_options_fill_in_defaults() {
        let opts: CompileOptions =
            serde_json::from_str(r#"{"version-policy": "highest-version"}"#).unwrap();
        assert_eq!(opts.version_policy, VersionPolicyKind::HighestVersion);
        assert_eq!(opts.max_errors, DEFAULT_MAX_ERRORS);
        assert_eq!(opts.extension, "ec");
    }

    #[test]
    fn unknown_option_is_rejected() {
        let res: Result<CompileOptions, _> = serde_json::from_str(r#"{"strict": true}"#);
        assert!(res.is_err());
    }

    #[test]
    fn policy_names_match_config_spelling() {
        assert_eq!(VersionPolicyKind::LatestDeclared.policy().name(), "latest-declared");
        assert_eq!(VersionPolicyKind::HighestVersion.policy().name(), "highest-version");
    }
}
