//! Model generation parameters.

use schematic::Config;

/// Generation parameters.
#[derive(Debug, Clone, Config)]
#[config(rename_all = "snake_case")]
pub struct ParametersConfig {
    /// Sampling temperature.
    #[setting(default = 0.7)]
    pub temperature: f32,

    /// Control the randomness and diversity of the generated text. Also
    /// known as *nucleus sampling*.
    ///
    /// As opposed to `top_k`, this is a dynamic approach that considers tokens
    /// until their cumulative probability reaches a threshold P.
    #[setting(default = 0.95)]
    pub top_p: f32,

    /// Only sample from the K most probable tokens.
    #[setting(default = 40)]
    pub top_k: u32,

    /// Maximum number of tokens to generate.
    #[setting(default = 8192)]
    pub max_output_tokens: u32,
}
