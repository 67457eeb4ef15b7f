/// Convenience result type used across reelfx.
pub type ReelfxResult<T> = Result<T, ReelfxError>;

/// Shader pipeline stage, used in compile diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderStage {
    /// Vertex stage.
    Vertex,
    /// Fragment stage.
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum ReelfxError {
    /// Invalid user-provided layer, keyframe, or settings data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while resolving animated property values.
    #[error("animation error: {0}")]
    Animation(String),

    /// Errors while evaluating or rendering a frame.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// The GPU context is unavailable or refused to allocate a resource.
    #[error("gpu error: {0}")]
    Gpu(String),

    /// A shader stage failed to compile.
    #[error("{stage} shader '{label}' failed to compile: {log}")]
    ShaderCompile {
        /// Stage that failed.
        stage: ShaderStage,
        /// Program label (effect id or blend mode name).
        label: String,
        /// Driver info log.
        log: String,
    },

    /// A program failed to link.
    #[error("shader program '{label}' failed to link: {log}")]
    ShaderLink {
        /// Program label (effect id or blend mode name).
        label: String,
        /// Driver info log.
        log: String,
    },

    /// Framebuffer completeness check failed at creation.
    #[error("framebuffer incomplete: {status:?}")]
    IncompleteFramebuffer {
        /// Status reported by the context.
        status: crate::gpu::FramebufferStatus,
    },

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelfxError {
    /// Build a [`ReelfxError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelfxError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`ReelfxError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`ReelfxError::Gpu`] value.
    pub fn gpu(msg: impl Into<String>) -> Self {
        Self::Gpu(msg.into())
    }

    /// Build a [`ReelfxError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for shader compile/link failures, which callers treat as "effect absent".
    pub fn is_shader_failure(&self) -> bool {
        matches!(self, Self::ShaderCompile { .. } | Self::ShaderLink { .. })
    }
}

impl From<serde_json::Error> for ReelfxError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
