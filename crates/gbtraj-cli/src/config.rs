use crate::cli::BoundaryArgs;
use crate::error::{CliError, Result};
use gbtraj::selection::{SelectionMethod, SelectionParams};
use gbtraj::workflows::boundary::BoundaryConfig;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// The boundary command's TOML configuration file.
///
/// Every field is optional; values given on the command line win over
/// values from the file.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileBoundaryConfig {
    pub species: Option<Vec<i32>>,
    pub method: Option<SelectionMethod>,
    pub attribute: Option<String>,
    pub cutoff: Option<f64>,
    #[serde(rename = "include-extras")]
    pub include_extras: Option<bool>,
}

impl FileBoundaryConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: FileBoundaryConfig =
            toml::from_str(&text).map_err(|e| CliError::FileParsing {
                path: path.to_path_buf(),
                source: e.into(),
            })?;
        debug!("Loaded boundary configuration from {:?}: {:?}", path, config);
        Ok(config)
    }

    pub fn merge_with_cli(self, args: &BoundaryArgs) -> Result<BoundaryConfig> {
        let mut builder = BoundaryConfig::builder();

        if let Some(species) = args.species.clone().or(self.species) {
            builder = builder.species(species);
        }
        let method = match &args.method {
            Some(name) => Some(name.parse::<SelectionMethod>()?),
            None => self.method,
        };
        if let Some(method) = method {
            builder = builder.method(method);
        }
        if let Some(attribute) = args.attribute.clone().or(self.attribute) {
            builder = builder.attribute(attribute);
        }
        if let Some(cutoff) = args.cutoff.or(self.cutoff) {
            builder = builder.params(SelectionParams { cutoff });
        }
        if let Some(include) = self.include_extras {
            builder = builder.include_extras(include);
        }

        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbtraj::workflows::boundary::BoundaryError;
    use std::path::PathBuf;

    fn args() -> BoundaryArgs {
        BoundaryArgs {
            input: PathBuf::from("in.dump"),
            species: None,
            step: None,
            method: None,
            attribute: None,
            cutoff: None,
            config: None,
            output: None,
        }
    }

    #[test]
    fn parses_a_full_configuration_file() {
        let config: FileBoundaryConfig = toml::from_str(
            r#"
            species = [28]
            method = "cna"
            attribute = "c_cna"
            cutoff = 3.0
            include-extras = false
            "#,
        )
        .unwrap();

        assert_eq!(config.species, Some(vec![28]));
        assert_eq!(config.method, Some(SelectionMethod::CnaMax));
        assert_eq!(config.attribute.as_deref(), Some("c_cna"));
        assert_eq!(config.cutoff, Some(3.0));
        assert_eq!(config.include_extras, Some(false));
    }

    #[test]
    fn rejects_unknown_configuration_keys() {
        let result: std::result::Result<FileBoundaryConfig, _> =
            toml::from_str("selection-method = \"median\"");
        assert!(result.is_err());
    }

    #[test]
    fn cli_arguments_override_file_values() {
        let file = FileBoundaryConfig {
            species: Some(vec![28]),
            method: Some(SelectionMethod::Median),
            attribute: Some("c_csd".to_string()),
            cutoff: Some(2.0),
            include_extras: None,
        };
        let mut args = args();
        args.species = Some(vec![13]);
        args.method = Some("cna-max".to_string());
        args.cutoff = Some(4.0);

        let config = file.merge_with_cli(&args).unwrap();
        assert_eq!(config.species, vec![13]);
        assert_eq!(config.method, SelectionMethod::CnaMax);
        assert_eq!(config.attribute, "c_csd");
        assert_eq!(config.params.cutoff, 4.0);
    }

    #[test]
    fn missing_species_everywhere_is_an_error() {
        let err = FileBoundaryConfig::default()
            .merge_with_cli(&args())
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::Boundary(BoundaryError::MissingParameter("species"))
        ));
    }

    #[test]
    fn unknown_method_name_from_the_cli_fails() {
        let file = FileBoundaryConfig {
            species: Some(vec![28]),
            ..FileBoundaryConfig::default()
        };
        let mut args = args();
        args.method = Some("centroid".to_string());

        assert!(matches!(
            file.merge_with_cli(&args),
            Err(CliError::Selection(_))
        ));
    }
}
