use anyhow::{Context, anyhow};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::{Catalog, IdentifierCode, IdentifierCodeId, PublicationType, TypeCode};

/// Whitelisted identifier code as it appears in application settings
#[derive(Debug, Clone, Deserialize)]
pub struct IdentifierCodeSettings {
    pub code: String,
    pub label: String,
}

#[derive(Debug)]
pub(crate) struct CatalogAdapter {
    types: BTreeMap<String, PublicationType>,
    identifier_codes: BTreeMap<String, IdentifierCode>,
}

impl Catalog for CatalogAdapter {
    fn publication_types(&self) -> Box<dyn Iterator<Item = &PublicationType> + '_> {
        Box::new(self.types.values())
    }

    fn publication_type(&self, code: &str) -> Option<&PublicationType> {
        self.types.get(code)
    }

    fn identifier_code(&self, code: &str) -> Option<&IdentifierCode> {
        self.identifier_codes.get(code)
    }
}

/// Loads publication types from a directory of JSON files (one type per file)
/// and combines them with the identifier code whitelist.
pub fn load(
    catalog_config_path: &str,
    identifier_codes: &[IdentifierCodeSettings],
) -> Result<&'static dyn Catalog, anyhow::Error> {
    let adapter = CatalogAdapter::load(catalog_config_path, identifier_codes)?;
    Ok(Box::leak(Box::new(adapter)))
}

impl CatalogAdapter {
    pub fn load(
        catalog_config_path: &str,
        identifier_codes: &[IdentifierCodeSettings],
    ) -> Result<Self, anyhow::Error> {
        use std::fs;

        let dir_path = Path::new(catalog_config_path);

        tracing::debug!("Loading publication types from {}", dir_path.to_string_lossy());

        let entries = fs::read_dir(dir_path).with_context(|| {
            format!(
                "failed to read catalog config directory: {}",
                dir_path.to_string_lossy()
            )
        })?;

        let mut types = BTreeMap::new();
        for entry_res in entries {
            let entry =
                entry_res.map_err(|e| anyhow!("failed to read a directory entry: {}", e))?;
            let path = entry.path();
            if path.is_file() && is_json(&path) {
                let publication_type = load_publication_type(&path)?;
                let code = publication_type.code.to_string();
                if types.insert(code.clone(), publication_type).is_some() {
                    anyhow::bail!("publication type '{}' is defined twice", code);
                }
            }
        }

        let identifier_codes = identifier_codes
            .iter()
            .map(|settings| {
                let code = IdentifierCodeId::try_new(settings.code.as_str())
                    .with_context(|| format!("invalid identifier code '{}'", settings.code))?;
                let identifier_code = IdentifierCode {
                    code,
                    label: settings.label.clone(),
                };
                Ok((identifier_code.code.to_string(), identifier_code))
            })
            .collect::<Result<BTreeMap<_, _>, anyhow::Error>>()?;

        tracing::info!(
            "Catalog loaded: {} publication types, {} identifier codes",
            types.len(),
            identifier_codes.len()
        );

        Ok(Self {
            types,
            identifier_codes,
        })
    }
}

fn load_publication_type(path: &Path) -> Result<PublicationType, anyhow::Error> {
    use std::fs;

    let path_str = path.to_string_lossy().into_owned();

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read publication type file '{}'", path_str))?;

    let record = serde_json::from_str::<PublicationTypeRecord>(&content)
        .with_context(|| format!("failed to parse JSON publication type '{}'", path_str))?;

    record.try_into()
}

fn is_json(path: &Path) -> bool {
    path.extension().map(|ext| ext == "json").unwrap_or(false)
}

// internal structs for Deserializing

#[derive(Clone, Debug, Deserialize)]
struct PublicationTypeRecord<'a> {
    code: &'a str,
    label_en: &'a str,
    label_sv: &'a str,
    #[serde(default)]
    required_fields: Vec<&'a str>,
}

impl<'a> TryFrom<PublicationTypeRecord<'a>> for PublicationType {
    type Error = anyhow::Error;

    fn try_from(value: PublicationTypeRecord<'a>) -> Result<Self, Self::Error> {
        let code = TypeCode::try_new(value.code)?;
        Ok(Self {
            code,
            label_en: value.label_en.to_owned(),
            label_sv: value.label_sv.to_owned(),
            required_fields: value
                .required_fields
                .into_iter()
                .map(String::from)
                .collect(),
        })
    }
}
