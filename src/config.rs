//! Compiler configuration.

/// Options for one [`Compiler`](crate::Compiler).
///
/// ```
/// use micro::CompilerConfig;
///
/// let config = CompilerConfig::new()
///     .source_name("hello.micro")
///     .gate_codegen_on_errors(true);
/// assert_eq!(config.get_source_name(), "hello.micro");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    source_name: String,
    gate_codegen_on_errors: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            source_name: "<input>".to_string(),
            gate_codegen_on_errors: false,
        }
    }
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name recorded as the generated unit's source.
    pub fn source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    /// Skip code generation when analysis reported any error.
    ///
    /// Off by default: code is generated regardless and the result carries
    /// the errors.
    pub fn gate_codegen_on_errors(mut self, gate: bool) -> Self {
        self.gate_codegen_on_errors = gate;
        self
    }

    pub fn get_source_name(&self) -> &str {
        &self.source_name
    }

    pub fn gates_codegen(&self) -> bool {
        self.gate_codegen_on_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_generate_regardless_of_errors() {
        let config = CompilerConfig::default();
        assert!(!config.gates_codegen());
        assert_eq!(config.get_source_name(), "<input>");
    }
}
