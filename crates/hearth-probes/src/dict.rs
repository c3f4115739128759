//! Line-based reader and rewriter for `<case>/system/probes`.
//!
//! The dictionary is edited as a union: fields and locations are only
//! ever appended or pruned, and every line the editor does not understand
//! (includes, function object settings) is written back verbatim.

use std::fs;
use std::io;
use std::path::Path;

use hearth_core::FieldKind;

use crate::probe::close;

/// Render a fresh probes dictionary with one field and one location.
pub(crate) fn template(field: FieldKind, region: &str, location: [f64; 3]) -> String {
    format!(
        r#"/*--------------------------------*- C++ -*----------------------------------*\
  =========                 |
  \\      /  F ield         | OpenFOAM: The Open Source CFD Toolbox
   \\    /   O peration     | Website:  https://openfoam.org
    \\  /    A nd           | Version:  7
     \\/     M anipulation  |
-------------------------------------------------------------------------------
Description
    Writes out values of fields from cells nearest to specified locations.

\*---------------------------------------------------------------------------*/

#includeEtc "caseDicts/postProcessing/probes/probes.cfg"

fields ({field});
region {region};
functionObjectLibs ("libsampling.so");
probeLocations
(
    ({x} {y} {z})
);
"#,
        field = field.name(),
        x = location[0],
        y = location[1],
        z = location[2],
    )
}

/// The probes dictionary held as lines, with the interesting ones indexed.
#[derive(Debug)]
pub(crate) struct ProbesDict {
    lines: Vec<String>,
    fields_idx: Option<usize>,
    fields: Vec<String>,
    locations: Vec<(usize, [f64; 3])>,
    /// Index of the `);` closing the location list.
    end_idx: Option<usize>,
}

impl ProbesDict {
    pub(crate) fn load(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        let mut dict = Self {
            lines,
            fields_idx: None,
            fields: Vec::new(),
            locations: Vec::new(),
            end_idx: None,
        };
        for (idx, line) in dict.lines.iter().enumerate() {
            if line.starts_with("//") {
                continue;
            }
            let trimmed = line.trim();
            if let Some(rest) = trimmed.strip_prefix("fields") {
                if let Some(inner) = rest
                    .trim()
                    .strip_prefix('(')
                    .and_then(|s| s.strip_suffix(");"))
                {
                    dict.fields_idx = Some(idx);
                    dict.fields = inner.split_whitespace().map(str::to_string).collect();
                }
            } else if trimmed == ");" {
                dict.end_idx = Some(idx);
            } else if let Some(loc) = parse_location(trimmed) {
                dict.locations.push((idx, loc));
            }
        }
        Ok(dict)
    }

    pub(crate) fn save(&self, path: &Path) -> io::Result<()> {
        let mut text = self.lines.join("\n");
        text.push('\n');
        fs::write(path, text)
    }

    pub(crate) fn fields(&self) -> &[String] {
        &self.fields
    }

    pub(crate) fn locations(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        self.locations.iter().map(|(_, loc)| *loc)
    }

    /// Add a field to the `fields (...)` list if it is not there yet.
    pub(crate) fn add_field(&mut self, field: FieldKind) {
        let name = field.name();
        if self.fields.iter().any(|f| f == name) {
            return;
        }
        self.fields.push(name.to_string());
        self.rewrite_fields_line();
    }

    /// Keep only the given fields in the `fields (...)` list.
    pub(crate) fn retain_fields(&mut self, keep: &[FieldKind]) {
        self.fields = keep.iter().map(|f| f.name().to_string()).collect();
        self.rewrite_fields_line();
    }

    /// The existing location matching `location` within tolerance, if any.
    pub(crate) fn matching_location(&self, location: [f64; 3]) -> Option<[f64; 3]> {
        self.locations
            .iter()
            .map(|(_, loc)| *loc)
            .find(|loc| close(*loc, location))
    }

    /// Append a location just before the closing `);`.
    pub(crate) fn push_location(&mut self, location: [f64; 3]) {
        let line = format!("    ({} {} {})", location[0], location[1], location[2]);
        let at = self.end_idx.unwrap_or(self.lines.len());
        self.lines.insert(at, line);
        self.locations.push((at, location));
        self.end_idx = self.end_idx.map(|idx| idx + 1);
    }

    /// Drop every location line not close to one of `keep`.
    pub(crate) fn retain_locations(&mut self, keep: &[[f64; 3]]) {
        let dead: Vec<usize> = self
            .locations
            .iter()
            .filter(|(_, loc)| !keep.iter().any(|k| close(*k, *loc)))
            .map(|(idx, _)| *idx)
            .collect();
        for idx in dead.iter().rev() {
            self.lines.remove(*idx);
        }
        // Reindex the survivors.
        let kept: Vec<[f64; 3]> = self
            .locations
            .iter()
            .filter(|(idx, _)| !dead.contains(idx))
            .map(|(_, loc)| *loc)
            .collect();
        self.locations = self
            .lines
            .iter()
            .enumerate()
            .filter_map(|(idx, line)| parse_location(line.trim()).map(|loc| (idx, loc)))
            .collect();
        debug_assert_eq!(self.locations.len(), kept.len());
        self.end_idx = self.lines.iter().position(|l| l.trim() == ");");
    }

    fn rewrite_fields_line(&mut self) {
        if let Some(idx) = self.fields_idx {
            self.lines[idx] = format!("fields ({});", self.fields.join(" "));
        }
    }
}

/// Parse a bare `(x y z)` line.
fn parse_location(line: &str) -> Option<[f64; 3]> {
    let inner = line.strip_prefix('(')?.strip_suffix(')')?;
    let mut out = [0.0f64; 3];
    let mut parts = inner.split_whitespace();
    for slot in &mut out {
        *slot = parts.next()?.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}
