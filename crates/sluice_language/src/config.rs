//! Configuration for the virtual machine.

/// Configuration for a [`Vm`](crate::vm::Vm).
///
/// Controls preallocation and instruction-level tracing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VmConfig {
    /// Initial operand stack capacity.
    pub stack_capacity: usize,

    /// Emit a `trace!` event for every executed instruction.
    pub trace_instructions: bool,

    /// Initial capacity of the binding frame stack.
    pub frame_capacity: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            stack_capacity: 256,
            trace_instructions: false,
            frame_capacity: 8,
        }
    }
}

impl VmConfig {
    /// Creates a configuration for debugging with instruction tracing on.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            trace_instructions: true,
            ..Self::default()
        }
    }

    /// Builder method to set the initial stack capacity.
    #[must_use]
    pub fn with_stack_capacity(mut self, capacity: usize) -> Self {
        self.stack_capacity = capacity;
        self
    }

    /// Builder method to toggle instruction tracing.
    #[must_use]
    pub fn with_trace_instructions(mut self, enabled: bool) -> Self {
        self.trace_instructions = enabled;
        self
    }

    /// Builder method to set the initial binding frame capacity.
    #[must_use]
    pub fn with_frame_capacity(mut self, capacity: usize) -> Self {
        self.frame_capacity = capacity;
        self
    }
}
