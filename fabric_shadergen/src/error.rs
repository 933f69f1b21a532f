use snafu::Snafu;
use std::fmt::{Display, Formatter};

pub type Result<T, E = FabricError> = std::result::Result<T, E>;

/// A template does not have the shape of a Fabric description.
#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)), visibility(pub))]
pub enum SchemaError {
    #[snafu(display("fabric: cannot have source and components in the same template"))]
    SourceAndComponents,

    #[snafu(display("fabric: `{property}` is not a valid property, it should be one of {expected}"))]
    InvalidProperty { property: String, expected: String },

    #[snafu(display("fabric: uniforms and materials cannot share the same property `{name}`"))]
    DuplicateName { name: String },

    #[snafu(display("fabric: {what} must be an object"))]
    NotAnObject { what: String },

    #[snafu(display("fabric: {what} must be a string"))]
    NotAString { what: String },

    #[snafu(display("fabric: material type `{kind}` is not registered"))]
    UnknownType { kind: String },

    #[snafu(display("fabric: material type `{kind}` contains itself as a sub-material"))]
    RecursiveType { kind: String },

    #[snafu(display("fabric: template is not valid JSON: {source}"))]
    Json { source: serde_json::Error },
}

/// Which kind of declared name was never referenced by the shader text.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UsageKind {
    Uniform,
    Channels,
    Material,
}

impl Display for UsageKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            UsageKind::Uniform => "uniform",
            UsageKind::Channels => "channels",
            UsageKind::Material => "material",
        };
        f.write_str(kind)
    }
}

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)), visibility(pub))]
pub enum FabricError {
    #[snafu(transparent)]
    Schema { source: SchemaError },

    #[snafu(display("fabric: uniform `{name}` has an invalid type"))]
    InvalidUniformType { name: String },

    #[snafu(display("fabric: uniform `{name}` was assigned a value of a different type"))]
    InvalidUniformValue { name: String },

    #[snafu(display("fabric: strict mode, shader source does not use {usage} `{name}`"))]
    StrictUsage { usage: UsageKind, name: String },
}
