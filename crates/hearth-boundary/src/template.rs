//! FoamFile header template for newly created dictionary files.

/// Render an empty boundary dictionary file for a field.
///
/// The `boundaryField` block starts out with only the constraint-types
/// include, the way the solver's own case generators write it.
pub(crate) fn boundary_file(class: &str, object: &str, dimensions: &str) -> String {
    format!(
        r#"/*--------------------------------*- C++ -*----------------------------------*\
  =========                 |
  \\      /  F ield         | OpenFOAM: The Open Source CFD Toolbox
   \\    /   O peration     | Website:  https://openfoam.org
    \\  /    A nd           | Version:  7
     \\/     M anipulation  |
\*---------------------------------------------------------------------------*/
FoamFile
{{
    version     2.0;
    format      ascii;
    class       {class};
    object      {object};
}}
// * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * //

dimensions      {dimensions};

boundaryField
{{
    #includeEtc "caseDicts/setConstraintTypes"
}}

// ************************************************************************* //
"#
    )
}
