//! The per-field dictionary store.

use std::fs;
use std::path::{Path, PathBuf};

use hearth_core::{CaseError, FieldKind, IllegalMutation, Value};
use indexmap::IndexMap;
use tracing::debug;

use crate::parse::{self, Literal};
use crate::variant::BoundaryVariant;
use crate::{patch, template};

/// One field's boundary dictionary file at the current timestep.
///
/// The store keeps the parsed internal field and the ordered name to
/// variant map in sync with the on-disk text. Every mutation patches the
/// file with a targeted splice; unrelated text is never rewritten.
#[derive(Debug)]
pub struct BoundaryFile {
    case_dir: PathBuf,
    region: Option<String>,
    field: FieldKind,
    time: String,
    internal: Option<Internal>,
    boundaries: IndexMap<String, BoundaryVariant>,
}

#[derive(Debug)]
struct Internal {
    value: Value,
    uniform: bool,
}

impl BoundaryFile {
    /// Open the field's file at time `0`, creating it from the template
    /// when it does not exist yet.
    pub fn open(
        case_dir: &Path,
        field: FieldKind,
        region: Option<&str>,
    ) -> Result<Self, CaseError> {
        let mut file = Self {
            case_dir: case_dir.to_path_buf(),
            region: region.map(str::to_string),
            field,
            time: "0".to_string(),
            internal: None,
            boundaries: IndexMap::new(),
        };
        if file.path().exists() {
            debug!(field = field.name(), region, "found boundary file");
            file.reparse()?;
        } else {
            debug!(field = field.name(), region, "creating boundary file");
            fs::write(
                file.path(),
                template::boundary_file(field.class(), field.name(), field.dimensions()),
            )?;
        }
        Ok(file)
    }

    /// Path of the dictionary file at the current timestep.
    pub fn path(&self) -> PathBuf {
        let mut path = self.case_dir.join(&self.time);
        if let Some(region) = &self.region {
            path.push(region);
        }
        path.push(self.field.name());
        path
    }

    /// The field this store manages.
    pub fn field(&self) -> FieldKind {
        self.field
    }

    /// The mesh region, if the case is multi-region.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// The timestep the store currently points at.
    pub fn time(&self) -> &str {
        &self.time
    }

    /// Repoint the store at another timestep's file and reparse it.
    pub fn retime(&mut self, time: &str) -> Result<(), CaseError> {
        if self.time != time {
            self.time = time.to_string();
            self.reparse()?;
        }
        Ok(())
    }

    /// The internal field value and its uniform flag, if present.
    pub fn internal(&self) -> Option<(&Value, bool)> {
        self.internal.as_ref().map(|i| (&i.value, i.uniform))
    }

    /// Set the internal field, adding the clause when the file lacks one.
    pub fn set_internal(&mut self, value: impl Into<Value>, uniform: bool) -> Result<(), CaseError> {
        let value = value.into();
        let path = self.path();
        let text = fs::read_to_string(&path)?;
        let text = if self.internal.is_none() {
            patch::add_internal_field(&text, &path, &value, uniform)?
        } else {
            patch::update_internal_field(&text, &path, &value, uniform)?
        };
        fs::write(&path, text)?;
        self.internal = Some(Internal { value, uniform });
        Ok(())
    }

    /// The named boundary, if present.
    pub fn boundary(&self, name: &str) -> Option<&BoundaryVariant> {
        self.boundaries.get(name)
    }

    /// Mutable access to the named boundary. Value changes made through
    /// it are flushed by the next [`BoundaryFile::save`].
    pub fn boundary_mut(&mut self, name: &str) -> Option<&mut BoundaryVariant> {
        self.boundaries.get_mut(name)
    }

    /// All boundaries in file order.
    pub fn boundaries(&self) -> impl Iterator<Item = (&str, &BoundaryVariant)> {
        self.boundaries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Install a boundary under `name`.
    ///
    /// If a boundary of the same kind already exists its values are
    /// updated in memory and flushed on the next save. A different kind
    /// replaces the block in the file immediately. A new name is only
    /// accepted at time `0`.
    pub fn set_boundary(&mut self, name: &str, variant: BoundaryVariant) -> Result<(), CaseError> {
        if let Some(existing) = self.boundaries.get_mut(name) {
            if existing.kind() == variant.kind() {
                existing.merge_from(&variant)?;
                return Ok(());
            }
            let path = self.path();
            let text = fs::read_to_string(&path)?;
            let text = patch::remove_boundary(&text, &path, name)?;
            let text = patch::add_boundary(&text, &path, name, &variant)?;
            fs::write(&path, text)?;
        } else {
            if self.time != "0" {
                return Err(IllegalMutation::NotTimeZero {
                    name: name.to_string(),
                    time: self.time.clone(),
                }
                .into());
            }
            let path = self.path();
            let text = fs::read_to_string(&path)?;
            let text = patch::add_boundary(&text, &path, name, &variant)?;
            fs::write(&path, text)?;
        }
        let mut variant = variant;
        variant.clear_dirty();
        self.boundaries.insert(name.to_string(), variant);
        Ok(())
    }

    /// Remove the named boundary from the file and the store.
    pub fn remove_boundary(&mut self, name: &str) -> Result<(), CaseError> {
        let path = self.path();
        let text = fs::read_to_string(&path)?;
        let text = patch::remove_boundary(&text, &path, name)?;
        fs::write(&path, text)?;
        self.boundaries.shift_remove(name);
        Ok(())
    }

    /// Flush every dirty boundary to the file in one write.
    pub fn save(&mut self) -> Result<(), CaseError> {
        let dirty: Vec<String> = self
            .boundaries
            .iter_mut()
            .filter_map(|(name, v)| v.take_dirty().then(|| name.clone()))
            .collect();
        if dirty.is_empty() {
            return Ok(());
        }
        let path = self.path();
        let mut text = fs::read_to_string(&path)?;
        for name in &dirty {
            let variant = &self.boundaries[name.as_str()];
            text = patch::update_boundary(&text, &path, name, variant)?;
        }
        fs::write(&path, text)?;
        Ok(())
    }

    fn reparse(&mut self) -> Result<(), CaseError> {
        let path = self.path();
        let text = fs::read_to_string(&path)?;
        let parsed = parse::parse(&text, &path)?;

        self.internal = parsed.internal.as_ref().map(|i| Internal {
            value: i.value.value().clone(),
            uniform: i.uniform.is_some(),
        });

        let mut boundaries = IndexMap::new();
        for (name, block) in &parsed.blocks {
            // Blocks without a type entry are left to the solver.
            let Some(kind) = &block.kind else {
                continue;
            };
            let mut variant = BoundaryVariant::new(kind)?;
            for (key, entry) in &block.entries {
                variant.set(key.as_str(), entry.value.value().clone())?;
                if matches!(entry.value, Literal::Token { .. }) && entry.uniform.is_some() {
                    variant.set_uniform(key, true)?;
                }
            }
            variant.clear_dirty();
            boundaries.insert(name.clone(), variant);
        }
        self.boundaries = boundaries;
        Ok(())
    }
}
