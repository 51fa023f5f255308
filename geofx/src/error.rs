use crate::joint::HumanBone;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Skeleton has no shader assigned")]
    MissingShader,

    #[error("Shader '{name}' is not available")]
    UnknownShader { name: String },

    #[error("Joint {joint:?} is not bound to a transform")]
    UnboundJoint { joint: HumanBone },
}
