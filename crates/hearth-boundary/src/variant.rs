//! A single boundary condition instance bound to a kind schema.

use hearth_core::{BoundaryError, Value};
use indexmap::IndexMap;

use crate::families::{self, Family, KindSpec};

/// One boundary condition: a kind plus its currently set parameters.
///
/// The kind is fixed at construction. Parameters are validated against the
/// kind's schema; setting one the schema does not know fails with
/// [`BoundaryError::UnknownParameter`]. Mutations that change a value mark
/// the variant dirty; [`BoundaryVariant::take_dirty`] yields the flag
/// exactly once per transition, which is how the store finds the entries
/// it needs to flush.
#[derive(Debug)]
pub struct BoundaryVariant {
    family: Family,
    spec: &'static KindSpec,
    params: IndexMap<&'static str, Param>,
    dirty: bool,
}

#[derive(Debug, Default)]
struct Param {
    value: Option<Value>,
    uniform: bool,
}

impl BoundaryVariant {
    /// Construct an empty variant of the named kind.
    pub fn new(kind: &str) -> Result<Self, BoundaryError> {
        let (family, spec) = families::lookup(kind)?;
        Ok(Self {
            family,
            spec,
            params: IndexMap::new(),
            dirty: false,
        })
    }

    /// The kind name this variant was constructed with.
    pub fn kind(&self) -> &'static str {
        self.spec.name
    }

    /// The `type` token written to the dictionary.
    pub fn written_type(&self) -> &'static str {
        self.spec.written
    }

    /// The family the kind belongs to.
    pub fn family(&self) -> Family {
        self.family
    }

    /// Set a parameter value. Marks the variant dirty when the value
    /// actually changes.
    pub fn set(&mut self, param: &str, value: impl Into<Value>) -> Result<(), BoundaryError> {
        let spec = self.param_spec(param)?;
        let value = value.into();
        let slot = self.params.entry(spec.name).or_default();
        if slot.value.as_ref() != Some(&value) {
            slot.value = Some(value);
            self.dirty = true;
        }
        Ok(())
    }

    /// Toggle a parameter's `uniform` prefix. Only parameters whose schema
    /// carries the companion flag accept this.
    pub fn set_uniform(&mut self, param: &str, uniform: bool) -> Result<(), BoundaryError> {
        let spec = self.param_spec(param)?;
        if !spec.uniform {
            return Err(BoundaryError::UnknownParameter {
                kind: self.spec.name,
                param: format!("{param} (uniform)"),
            });
        }
        let slot = self.params.entry(spec.name).or_default();
        if slot.uniform != uniform {
            slot.uniform = uniform;
            self.dirty = true;
        }
        Ok(())
    }

    /// The currently set value of a parameter, if any.
    pub fn get(&self, param: &str) -> Option<&Value> {
        self.params.get(param).and_then(|p| p.value.as_ref())
    }

    /// Whether the parameter currently carries the `uniform` prefix.
    pub fn is_uniform(&self, param: &str) -> bool {
        self.params.get(param).is_some_and(|p| p.uniform)
    }

    /// Set parameters with a value, in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value, bool)> + '_ {
        self.spec.params.iter().filter_map(|spec| {
            let param = self.params.get(spec.name)?;
            let value = param.value.as_ref()?;
            Some((spec.name, value, param.uniform))
        })
    }

    /// Copy every set value (and uniform flag) from `other` into `self`.
    ///
    /// Used by the store's same-kind update path: unset parameters of
    /// `other` leave the current values alone.
    pub fn merge_from(&mut self, other: &BoundaryVariant) -> Result<(), BoundaryError> {
        for (name, value, _) in other.iter() {
            self.set(name, value.clone())?;
            if self.param_spec(name).is_ok_and(|s| s.uniform) && other.is_uniform(name) {
                self.set_uniform(name, true)?;
            }
        }
        Ok(())
    }

    /// Whether any parameter changed since the last flush.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Yield and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Render the dictionary block body, `indent` spaces deep.
    ///
    /// The `type` entry comes first, unset parameters are skipped, names
    /// are padded to the longest set name plus one, and values whose
    /// uniform flag is on get the `uniform ` prefix.
    pub fn render(&self, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let width = self
            .iter()
            .map(|(name, _, _)| name.len())
            .chain(std::iter::once("type".len()))
            .max()
            .unwrap_or(0)
            + 1;
        let mut out = format!("{pad}{{\n");
        out.push_str(&format!(
            "{pad}    type{:w$}{};\n",
            "",
            self.spec.written,
            w = width - "type".len()
        ));
        for (name, value, uniform) in self.iter() {
            let prefix = if uniform { "uniform " } else { "" };
            out.push_str(&format!(
                "{pad}    {name}{:w$}{prefix}{value};\n",
                "",
                w = width - name.len()
            ));
        }
        out.push_str(&format!("{pad}}}"));
        out
    }

    fn param_spec(&self, param: &str) -> Result<&'static crate::families::ParamSpec, BoundaryError> {
        self.spec.param(param).ok_or_else(|| BoundaryError::UnknownParameter {
            kind: self.spec.name,
            param: param.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_parameter_is_rejected() {
        let mut v = BoundaryVariant::new("fixedValue").unwrap();
        assert!(matches!(
            v.set("gradient", 1.0),
            Err(BoundaryError::UnknownParameter { .. })
        ));
    }

    #[test]
    fn dirty_flag_is_single_shot() {
        let mut v = BoundaryVariant::new("fixedValue").unwrap();
        assert!(!v.take_dirty());
        v.set("value", 293.15).unwrap();
        assert!(v.take_dirty());
        assert!(!v.take_dirty());
        // Re-setting the same value is not a change.
        v.set("value", 293.15).unwrap();
        assert!(!v.take_dirty());
    }

    #[test]
    fn render_pads_and_prefixes() {
        let mut v = BoundaryVariant::new("fixedValue").unwrap();
        v.set("value", 293.15).unwrap();
        v.set_uniform("value", true).unwrap();
        assert_eq!(
            v.render(0),
            "{\n    type  fixedValue;\n    value uniform 293.15;\n}"
        );
    }

    #[test]
    fn render_writes_fan_as_cyclic() {
        let v = BoundaryVariant::new("fan").unwrap();
        assert_eq!(v.render(0), "{\n    type cyclic;\n}");
    }

    #[test]
    fn uniform_needs_a_companion() {
        let mut v = BoundaryVariant::new("cyclic").unwrap();
        v.set("neighbourPatch", "other").unwrap();
        assert!(v.set_uniform("neighbourPatch", true).is_err());
    }
}
