/// Parameters that scope a single accepted connection.
///
/// Constructed from the CLI surface described in spec.md §6.2; kept
/// separate from the CLI parser itself so the core never depends on
/// `clap`. `-q`/`queue_size` is mandatory for this limited-queue variant,
/// so there is no default to fall back to (see DESIGN.md).
#[derive(Debug, Clone, Copy)]
pub struct ConnectionParams {
    pub queue_size: usize,
}

impl ConnectionParams {
    pub fn new(queue_size: usize) -> Self {
        Self { queue_size }
    }
}
