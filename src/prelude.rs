pub use crate::galaxy::{
    ColorField, GalaxyParameters, GenerateGalaxy, GenerationTrigger, ParameterField,
};
