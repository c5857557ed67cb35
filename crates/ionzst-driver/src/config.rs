/// Configuration for one run of the dump pipeline.
///
/// ```text
/// ┌──────────────────┬──────────────────────────────────────────────────┐
/// │ Field            │ Purpose                                          │
/// ├──────────────────┼──────────────────────────────────────────────────┤
/// │ handoff_capacity │ Chunks buffered between stages; 0 = rendezvous   │
/// │ style            │ Ion text layout of the rendered output           │
/// └──────────────────┴──────────────────────────────────────────────────┘
/// ```
///
/// With a capacity of 0 every chunk handed from one stage to the next
/// waits until the receiving stage takes it, like an unbuffered pipe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    pub handoff_capacity: usize,
    pub style: TextStyle,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            handoff_capacity: 0,
            style: TextStyle::default(),
        }
    }
}

/// Layout of the Ion text output. Both layouts put each top-level value
/// on its own line(s), in input order.
///
/// ```text
/// ┌────────┬──────────────────────────────────────────────┐
/// │ Style  │ Output for {a: [1, 2]}                       │
/// ├────────┼──────────────────────────────────────────────┤
/// │ Lines  │ {a: [1, 2]}                                  │
/// │ Pretty │ {\n  a: [\n    1,\n    2\n  ]\n}              │
/// └────────┴──────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextStyle {
    #[default]
    Lines,
    Pretty,
}
